//! Agent 错误类型
//!
//! 各层错误（后端 / 存储 / 搜索）在路由边界汇聚为 AgentError，再由 RecoveryEngine 转为面向用户的道歉文案。

use thiserror::Error;

use crate::llm::LlmError;
use crate::store::StoreError;
use crate::tools::SearchError;

/// 运行过程中可能出现的错误（后端、存储、搜索、配置、凭据）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Tip search failed: {0}")]
    Search(#[from] SearchError),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}
