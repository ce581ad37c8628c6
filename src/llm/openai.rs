//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；支持 DeepSeek、OpenAI、自建代理等。
//! 组合 prompt 作为单条 user 消息发送；错误按 HTTP 状态与 API 错误类型映射为 LlmError。

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};

/// OpenAI 兼容客户端：持有 Client 与 model 名，complete 时取首条 choice 的 content
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = match base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_message(prompt: &str) -> Result<ChatCompletionRequestMessage, LlmError> {
        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| LlmError::Fatal(e.to_string()))?;
        Ok(ChatCompletionRequestMessage::User(msg))
    }
}

/// 将 async_openai 错误归类为瞬时 / 致命
fn classify_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::Reqwest(e) => {
            if e.is_timeout() {
                LlmError::DeadlineExceeded(e.to_string())
            } else if let Some(status) = e.status() {
                LlmError::from_status(status.as_u16(), e.to_string())
            } else if e.is_connect() {
                LlmError::Unavailable(e.to_string())
            } else {
                LlmError::Fatal(e.to_string())
            }
        }
        OpenAIError::ApiError(api) => {
            let kind = api
                .r#type
                .clone()
                .or_else(|| api.code.clone())
                .unwrap_or_default()
                .to_lowercase();
            if kind.contains("rate_limit") {
                LlmError::RateLimited(api.message)
            } else if kind.contains("server_error") || kind.contains("internal") {
                LlmError::Internal(api.message)
            } else if kind.contains("overloaded") || kind.contains("unavailable") {
                LlmError::Unavailable(api.message)
            } else if kind.contains("timeout") {
                LlmError::DeadlineExceeded(api.message)
            } else {
                LlmError::Fatal(api.message)
            }
        }
        other => LlmError::Fatal(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![Self::user_message(prompt)?])
            .build()
            .map_err(|e| LlmError::Fatal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "llm usage"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
