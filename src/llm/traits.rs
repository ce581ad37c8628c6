//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：complete 发送一条组合 prompt 并返回原始文本。
//! 错误按是否可重试分类，由 BackendClient 的退避重试逻辑消费。

use async_trait::async_trait;
use thiserror::Error;

/// 后端调用错误：前四类为瞬时错误（可重试），Fatal 立即上抛
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Backend internal error: {0}")]
    Internal(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Backend error: {0}")]
    Fatal(String),
}

impl LlmError {
    /// 是否属于瞬时错误（限流 / 内部错误 / 不可用 / 超时）
    pub fn is_transient(&self) -> bool {
        !matches!(self, LlmError::Fatal(_))
    }

    /// 按 HTTP 状态码归类；未知状态视为 Fatal
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            429 => LlmError::RateLimited(detail),
            500 => LlmError::Internal(detail),
            502 | 503 => LlmError::Unavailable(detail),
            504 | 408 => LlmError::DeadlineExceeded(detail),
            _ => LlmError::Fatal(detail),
        }
    }
}

/// LLM 客户端 trait：一次调用，一条 prompt，一段文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
