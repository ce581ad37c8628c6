//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）、退避重试的后端客户端、prompt 模板

pub mod backend;
pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod traits;

pub use backend::{
    build_prompt, BackendClient, BackendReply, RetryConfig, EXHAUSTED_REPLY, MAX_RETRY_DELAY,
};
pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::{LlmClient, LlmError};
