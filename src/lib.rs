//! Gymini - 对话式健身助手
//!
//! 模块划分：
//! - **cli**: 交互式命令行循环
//! - **config**: 应用配置加载（TOML + 环境变量）与启动凭据
//! - **core**: 编排、会话上下文、错误恢复、组件装配
//! - **dispatch**: Tool Router、Coach 子代理、自检、个性化
//! - **intent**: 后端回复 -> Intent 解析与 Schema
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）、退避重试、prompt
//! - **memory**: 对话记录与用户身份
//! - **observability**: 日志初始化与意图级 trace
//! - **store**: 训练记录存储（内存 / SQLite）
//! - **tools**: 训练建议检索

pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod store;
pub mod tools;

pub use crate::core::{AgentBuilder, AgentError, Orchestrator};
