//! CLI 交互循环测试：内存输入输出

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use gymini::cli::{run_repl, FAREWELL};
    use gymini::config::AppConfig;
    use gymini::core::{AgentBuilder, Orchestrator};
    use gymini::llm::MockLlmClient;
    use gymini::store::InMemoryStore;
    use gymini::tools::{SearchError, TipHit, TipSource};

    struct NoTips;

    #[async_trait]
    impl TipSource for NoTips {
        async fn search(&self, _query: &str) -> Result<Vec<TipHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn agent(mock: &Arc<MockLlmClient>) -> Orchestrator {
        AgentBuilder::new(AppConfig::default())
            .with_llm(mock.clone())
            .with_store(Arc::new(InMemoryStore::new()))
            .with_tip_source(Arc::new(NoTips))
            .build()
            .expect("build agent")
    }

    async fn run(input: &str, mock: &Arc<MockLlmClient>) -> String {
        let mut agent = agent(mock);
        let mut output = Vec::new();
        run_repl(&mut agent, "Gymini", input.as_bytes(), &mut output)
            .await
            .expect("repl");
        String::from_utf8(output).expect("utf8")
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let mock = Arc::new(MockLlmClient::new());
        let output = run("\n   \nhello\n  QUIT \nignored\n", &mock).await;

        assert!(output.contains("Gymini: Echo from Mock: hello\n"));
        assert!(output.ends_with(&format!("Gymini: {FAREWELL}\n")));
        assert!(!output.contains("ignored"));
        // 空行不触发后端调用
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let mock = Arc::new(MockLlmClient::with_replies(["Great session!"]));
        let output = run("I trained legs", &mock).await;

        assert!(output.contains("Gymini: Great session!\n"));
        assert!(output.ends_with(&format!("Gymini: {FAREWELL}\n")));
    }
}
