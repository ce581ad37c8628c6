//! Agent 构建器：统一的组件初始化逻辑
//!
//! CLI 与测试共用同一条装配路径；未显式注入的组件按配置与环境凭据创建。

use std::sync::Arc;

use crate::config::{AppConfig, Credentials};
use crate::core::orchestrator::{create_llm_from_config, Orchestrator};
use crate::core::AgentError;
use crate::dispatch::ToolRouter;
use crate::llm::{BackendClient, LlmClient};
use crate::observability::{TraceEmitter, TraceSink, TracingSink};
use crate::store::{create_store_from_config, SessionStore};
use crate::tools::{GoogleTipSource, TipSource};

/// 首次需要时读取环境凭据，之后复用
fn load_credentials<'a>(
    slot: &'a mut Option<Credentials>,
    cfg: &AppConfig,
) -> Result<&'a Credentials, AgentError> {
    let creds = match slot.take() {
        Some(creds) => creds,
        None => Credentials::from_env(cfg)?,
    };
    Ok(slot.insert(creds))
}

/// Agent 构建器：配置 + 可选的注入组件
pub struct AgentBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    store: Option<Arc<dyn SessionStore>>,
    tips: Option<Arc<dyn TipSource>>,
    sink: Option<Arc<dyn TraceSink>>,
}

impl AgentBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            store: None,
            tips: None,
            sink: None,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_tip_source(mut self, tips: Arc<dyn TipSource>) -> Self {
        self.tips = Some(tips);
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 组装 Orchestrator；LLM 与 Tip Source 都已注入时不读取环境凭据
    pub fn build(self) -> Result<Orchestrator, AgentError> {
        let cfg = self.config;
        let retry = cfg.llm.retry.to_retry_config()?;

        let mut creds = None;
        let llm = match self.llm {
            Some(llm) => llm,
            None => create_llm_from_config(&cfg, load_credentials(&mut creds, &cfg)?)?,
        };
        let tips: Arc<dyn TipSource> = match self.tips {
            Some(tips) => tips,
            None => {
                let creds = load_credentials(&mut creds, &cfg)?;
                Arc::new(GoogleTipSource::new(
                    &cfg.search,
                    creds.search_api_key.clone(),
                    creds.search_engine_id.clone(),
                ))
            }
        };
        let store = match self.store {
            Some(store) => store,
            None => create_store_from_config(&cfg.store)?,
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let backend = Arc::new(BackendClient::with_persona(llm, retry, &cfg.app.name));
        let router = ToolRouter::new(
            backend.clone(),
            store,
            tips,
            cfg.search.max_tips,
            TraceEmitter::new(sink),
        )
        .with_creator(cfg.app.creator.clone());

        tracing::info!(
            provider = %cfg.llm.provider,
            store = ?cfg.store.backend,
            "agent assembled"
        );
        Ok(Orchestrator::new(backend, router))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::store::InMemoryStore;
    use crate::tools::{SearchError, TipHit};
    use async_trait::async_trait;

    struct NoTips;

    #[async_trait]
    impl TipSource for NoTips {
        async fn search(&self, _query: &str) -> Result<Vec<TipHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_build_with_injected_components() {
        let mock = Arc::new(MockLlmClient::with_replies([r#"{"tool": "get_creator"}"#]));
        let mut agent = AgentBuilder::new(AppConfig::default())
            .with_llm(mock.clone())
            .with_store(Arc::new(InMemoryStore::new()))
            .with_tip_source(Arc::new(NoTips))
            .build()
            .expect("build");
        let reply = agent.handle_turn("who made you?").await;
        assert_eq!(reply, AppConfig::default().app.creator);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_invalid_retry_fails_build() {
        let mut cfg = AppConfig::default();
        cfg.llm.retry.max_attempts = 0;
        let result = AgentBuilder::new(cfg)
            .with_llm(Arc::new(MockLlmClient::new()))
            .with_tip_source(Arc::new(NoTips))
            .build();
        assert!(matches!(result, Err(AgentError::ConfigError(_))));
    }
}
