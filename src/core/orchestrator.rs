//! Gymini 编排器：单轮主控流程
//!
//! 每轮：预过滤决定是否携带历史 -> 后端（退避重试）-> 解析意图 -> 路由分发 -> 写回对话记录。
//! 所有失败都在本层之前被转为回复文本；交互循环只会因用户退出而结束。

use std::sync::Arc;

use crate::config::{llm_key_var, AppConfig, Credentials};
use crate::core::{AgentError, RecoveryEngine, SessionContext};
use crate::dispatch::{needs_history, ToolRouter};
use crate::intent::parse;
use crate::llm::{
    create_deepseek_client, BackendClient, BackendReply, LlmClient, MockLlmClient, OpenAiClient,
    EXHAUSTED_REPLY,
};
use crate::memory::Message;

/// 根据配置选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(
    cfg: &AppConfig,
    creds: &Credentials,
) -> Result<Arc<dyn LlmClient>, AgentError> {
    let provider = cfg.llm.provider.to_lowercase();
    let key = || {
        creds
            .llm_api_key
            .as_deref()
            .ok_or_else(|| {
                AgentError::MissingCredential(
                    llm_key_var(&provider).unwrap_or("LLM_API_KEY").to_string(),
                )
            })
    };
    match provider.as_str() {
        "deepseek" => {
            let client = create_deepseek_client(cfg.llm.model.as_deref(), key()?);
            tracing::info!("Using DeepSeek LLM ({})", client.model());
            Ok(Arc::new(client))
        }
        "openai" => {
            let model = cfg.llm.model.as_deref().unwrap_or("gpt-4o-mini");
            tracing::info!("Using OpenAI LLM ({})", model);
            Ok(Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                model,
                key()?,
            )))
        }
        "mock" => {
            tracing::warn!("Using Mock LLM");
            Ok(Arc::new(MockLlmClient::new()))
        }
        other => Err(AgentError::ConfigError(format!(
            "unknown llm provider: {other}"
        ))),
    }
}

pub struct Orchestrator {
    backend: Arc<BackendClient>,
    router: ToolRouter,
    recovery: RecoveryEngine,
    context: SessionContext,
}

impl Orchestrator {
    pub fn new(backend: Arc<BackendClient>, router: ToolRouter) -> Self {
        Self {
            backend,
            router,
            recovery: RecoveryEngine::new(),
            context: SessionContext::new(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// 处理一轮用户输入，返回回复；本轮的用户与助手消息随后追加进对话记录
    pub async fn handle_turn(&mut self, input: &str) -> String {
        let input = input.trim();
        let history: &[Message] = if needs_history(input) {
            self.context.conversation.messages()
        } else {
            tracing::debug!("prefilter: sending without history");
            &[]
        };

        let reply = match self.backend.ask(input, history).await {
            Ok(BackendReply::Text(raw)) => {
                let intent = parse(&raw);
                tracing::info!(tool = intent.tool_name(), "parsed intent");
                self.router.dispatch(intent, &mut self.context).await
            }
            Ok(BackendReply::Exhausted) => EXHAUSTED_REPLY.to_string(),
            Err(e) => self.recovery.apology(&AgentError::from(e)),
        };

        self.context.conversation.push(Message::user(input));
        self.context.conversation.push(Message::model(&reply));
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(key: Option<&str>) -> Credentials {
        Credentials {
            llm_api_key: key.map(str::to_string),
            search_api_key: "search".to_string(),
            search_engine_id: "cx".to_string(),
        }
    }

    #[test]
    fn test_mock_provider_needs_no_key() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".to_string();
        assert!(create_llm_from_config(&cfg, &creds(None)).is_ok());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "llama".to_string();
        let err = create_llm_from_config(&cfg, &creds(Some("k"))).err();
        assert!(matches!(err, Some(AgentError::ConfigError(_))));
    }

    #[test]
    fn test_deepseek_without_key_is_missing_credential() {
        let cfg = AppConfig::default();
        let err = create_llm_from_config(&cfg, &creds(None)).err();
        assert!(matches!(err, Some(AgentError::MissingCredential(_))));
    }
}
