//! 错误恢复：将路由边界捕获的 AgentError 映射为面向用户的自然语言
//!
//! 不重试、不上抛；交互循环永远只看到一段回复文本。

use crate::core::AgentError;

/// 语义化错误恢复：错误 -> 道歉文案（从不暴露错误码或堆栈）
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 根据错误类型返回给用户的回复，同时记录日志
    pub fn apology(&self, err: &AgentError) -> String {
        tracing::error!(error = %err, "turn failed, replying with apology");
        match err {
            AgentError::Store(_) => {
                "Sorry, I couldn't reach your workout log right now. Please try again in a moment."
                    .to_string()
            }
            AgentError::Search(_) => {
                "Sorry, I couldn't reach the tips service right now. Please try again later."
                    .to_string()
            }
            AgentError::JsonParseError(_) => {
                "Sorry, I couldn't work out what to search for. Could you rephrase that?".to_string()
            }
            AgentError::LlmError(_) => {
                "Sorry, something went wrong while I was thinking about that. Please try again."
                    .to_string()
            }
            AgentError::ConfigError(_) | AgentError::MissingCredential(_) => {
                "Sorry, I'm not set up correctly right now. Please check my configuration.".to_string()
            }
        }
    }
}
