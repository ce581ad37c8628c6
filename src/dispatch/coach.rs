//! Coach 子代理：两阶段训练建议
//!
//! 阶段一：让后端（仅允许 search_web）为动作生成搜索词；回复不是合法 search_web 调用时记录并返回 None。
//! 阶段二：调用 Tip Source，取前 max_tips 条格式化为 "- {snippet} ({link})"。
//! 结果的改写（restyle）由路由器负责。

use std::sync::Arc;

use crate::core::AgentError;
use crate::intent::parse_search_call;
use crate::llm::{prompts, BackendClient, BackendReply, LlmError};
use crate::tools::{format_tips, TipSource};

/// 阶段二结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoachTips {
    /// 已格式化的原始建议列表
    Found(String),
    /// Tip Source 返回空
    NoResults,
}

pub struct CoachAgent {
    backend: Arc<BackendClient>,
    tips: Arc<dyn TipSource>,
    max_tips: usize,
    instructions: String,
}

impl CoachAgent {
    pub fn new(backend: Arc<BackendClient>, tips: Arc<dyn TipSource>, max_tips: usize) -> Self {
        Self {
            backend,
            tips,
            max_tips,
            instructions: prompts::coach_instructions(),
        }
    }

    /// 阶段一原始回复（自检也会用到）
    pub async fn request_query(&self, exercise: &str) -> Result<BackendReply, LlmError> {
        self.backend.ask_with(&self.instructions, exercise, &[]).await
    }

    /// 阶段一：解析出搜索词；解码失败返回 None
    pub async fn search_query(&self, exercise: &str) -> Result<Option<String>, LlmError> {
        let reply = self.request_query(exercise).await?;
        if reply.is_exhausted() {
            tracing::warn!(exercise, "coach query request exhausted retries");
            return Ok(None);
        }
        let query = parse_search_call(reply.as_text());
        if query.is_none() {
            tracing::warn!(exercise, reply = %reply.as_text(), "coach reply is not a valid search_web call");
        }
        Ok(query)
    }

    /// 阶段二：搜索并格式化
    pub async fn fetch_tips(&self, exercise: &str, query: &str) -> Result<CoachTips, AgentError> {
        let hits = self.tips.search(query).await?;
        tracing::info!(exercise, hits = hits.len(), "tip search returned");
        Ok(match format_tips(exercise, &hits, self.max_tips) {
            Some(text) => CoachTips::Found(text),
            None => CoachTips::NoResults,
        })
    }
}
