//! 核心编排层：错误与恢复、会话上下文、组件装配、单轮主控流程

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod recovery;
pub mod state;

pub use builder::AgentBuilder;
pub use error::AgentError;
pub use orchestrator::{create_llm_from_config, Orchestrator};
pub use recovery::RecoveryEngine;
pub use state::SessionContext;
