//! 后端客户端：组合 prompt + 有界指数退避重试
//!
//! 组合 prompt = 指令块 + "Conversation History:"（可选）+ "User: <输入>"。
//! 瞬时错误（限流 / 内部错误 / 不可用 / 超时）按 RetryConfig 重试，每次重试前 sleep，
//! 之后 delay *= backoff；Fatal 立即返回 Err。重试耗尽返回 BackendReply::Exhausted（非错误）。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::{prompts, LlmClient, LlmError};
use crate::memory::{render_history, Message};

/// 重试耗尽时展示给用户的固定文案
pub const EXHAUSTED_REPLY: &str =
    "Gymini couldn't respond after multiple attempts. Please try again later.";

/// 退避参数（默认：5 次，初始 1s，倍数 2 => 等待 1,2,4,8s）
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

impl RetryConfig {
    /// 第 retry 次重试前的等待（retry 从 1 开始）：initial_delay * backoff^(retry-1)，上限 MAX_RETRY_DELAY
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let exp = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff.powi(exp);
        Duration::try_from_secs_f64(secs).map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
    }
}

/// 单次重试等待的上限
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// 后端回复：文本或「重试耗尽」哨兵
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    Text(String),
    /// 不可解析为意图；展示为 EXHAUSTED_REPLY
    Exhausted,
}

impl BackendReply {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, BackendReply::Exhausted)
    }

    pub fn as_text(&self) -> &str {
        match self {
            BackendReply::Text(t) => t,
            BackendReply::Exhausted => EXHAUSTED_REPLY,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            BackendReply::Text(t) => t,
            BackendReply::Exhausted => EXHAUSTED_REPLY.to_string(),
        }
    }
}

impl fmt::Display for BackendReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// 拼接组合 prompt
pub fn build_prompt(instructions: &str, history: &[Message], input: &str) -> String {
    let mut prompt = String::with_capacity(instructions.len() + input.len() + 64);
    prompt.push_str(instructions.trim_end());
    prompt.push_str("\n\n");
    if !history.is_empty() {
        prompt.push_str("Conversation History:\n");
        prompt.push_str(&render_history(history));
        prompt.push_str("\n\n");
    }
    prompt.push_str("User: ");
    prompt.push_str(input);
    prompt
}

/// 后端客户端：持有 LLM、退避参数、主指令块与人设名
pub struct BackendClient {
    llm: Arc<dyn LlmClient>,
    retry: RetryConfig,
    persona: String,
    instructions: String,
}

impl BackendClient {
    pub fn new(llm: Arc<dyn LlmClient>, retry: RetryConfig) -> Self {
        Self::with_persona(llm, retry, "Gymini")
    }

    pub fn with_persona(llm: Arc<dyn LlmClient>, retry: RetryConfig, persona: &str) -> Self {
        Self {
            llm,
            retry,
            persona: persona.to_string(),
            instructions: prompts::main_instructions(persona),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// 主助手调用：主指令块 + 历史 + 用户输入
    pub async fn ask(&self, input: &str, history: &[Message]) -> Result<BackendReply, LlmError> {
        self.ask_with(&self.instructions, input, history).await
    }

    /// 子代理调用：自定义指令块
    pub async fn ask_with(
        &self,
        instructions: &str,
        input: &str,
        history: &[Message],
    ) -> Result<BackendReply, LlmError> {
        let prompt = build_prompt(instructions, history, input);
        self.generate(&prompt).await
    }

    /// 单条 prompt 的退避重试调用
    pub async fn generate(&self, prompt: &str) -> Result<BackendReply, LlmError> {
        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.llm.complete(prompt).await {
                Ok(text) => return Ok(BackendReply::Text(text)),
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, max_attempts, error = %e, "backend attempt failed");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry.delay_before_retry(attempt)).await;
                    }
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "backend failed with non-retryable error");
                    return Err(e);
                }
            }
        }
        tracing::warn!(max_attempts, "backend retries exhausted");
        Ok(BackendReply::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn client(mock: Arc<MockLlmClient>) -> BackendClient {
        BackendClient::new(mock, RetryConfig::default())
    }

    #[test]
    fn test_delay_schedule() {
        let retry = RetryConfig::default();
        let delays: Vec<u64> = (1..=4).map(|i| retry.delay_before_retry(i).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_delay_saturates_on_extreme_attempts() {
        let retry = RetryConfig {
            max_attempts: 5000,
            initial_delay: Duration::ZERO,
            backoff: 2.0,
        };
        assert_eq!(retry.delay_before_retry(2000), Duration::ZERO);

        let retry = RetryConfig {
            initial_delay: Duration::from_secs(1),
            ..retry
        };
        assert_eq!(retry.delay_before_retry(20), MAX_RETRY_DELAY);
        assert_eq!(retry.delay_before_retry(u32::MAX), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_build_prompt_with_history() {
        let history = vec![Message::user("4x5 squats at 30kg"), Message::model("Logged!")];
        let prompt = build_prompt("INSTRUCTIONS", &history, "tips for it?");
        assert_eq!(
            prompt,
            "INSTRUCTIONS\n\nConversation History:\nUser: 4x5 squats at 30kg\nModel: Logged!\n\nUser: tips for it?"
        );
        assert_eq!(build_prompt("I", &[], "hi"), "I\n\nUser: hi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let mock = Arc::new(MockLlmClient::new());
        mock.push_error(LlmError::RateLimited("429".into()));
        mock.push_error(LlmError::Unavailable("503".into()));
        mock.push_reply("ok");

        let start = tokio::time::Instant::now();
        let reply = client(mock.clone()).generate("p").await.unwrap();
        assert_eq!(reply, BackendReply::Text("ok".into()));
        assert_eq!(mock.call_count(), 3);
        // 1s + 2s
        assert_eq!(start.elapsed().as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_sentinel() {
        let mock = Arc::new(MockLlmClient::new());
        for _ in 0..5 {
            mock.push_error(LlmError::DeadlineExceeded("slow".into()));
        }
        mock.push_reply("never reached");

        let start = tokio::time::Instant::now();
        let reply = client(mock.clone()).generate("p").await.unwrap();
        assert!(reply.is_exhausted());
        assert_eq!(reply.as_text(), EXHAUSTED_REPLY);
        assert_eq!(mock.call_count(), 5);
        // 1 + 2 + 4 + 8，最后一次失败后不再等待
        assert_eq!(start.elapsed().as_secs(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_not_retried() {
        let mock = Arc::new(MockLlmClient::new());
        mock.push_error(LlmError::Internal("500".into()));
        mock.push_error(LlmError::Fatal("bad key".into()));
        mock.push_reply("never reached");

        let err = client(mock.clone()).generate("p").await.unwrap_err();
        assert_eq!(err, LlmError::Fatal("bad key".into()));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_ask_sends_instructions_and_input() {
        let mock = Arc::new(MockLlmClient::with_replies(["{\"tool\": \"help\"}"]));
        let backend = client(mock.clone());
        backend.ask("what can you do?", &[]).await.unwrap();

        let prompts = mock.prompts();
        assert!(prompts[0].starts_with("You are Gymini"));
        assert!(prompts[0].ends_with("User: what can you do?"));
    }
}
