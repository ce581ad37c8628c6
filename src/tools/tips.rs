//! Tip Source：关键词搜索，返回 (snippet, link) 列表
//!
//! 默认实现为 Google Custom Search JSON API（GET + 超时 + User-Agent）；
//! 结果可能为空，截断到前 N 条由调用方负责。

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::SearchSection;

/// 一条搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TipHit {
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

/// 搜索错误
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// 关键词搜索接口
#[async_trait]
pub trait TipSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<TipHit>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<TipHit>,
}

/// Google Custom Search 实现
pub struct GoogleTipSource {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    num_results: u32,
}

impl GoogleTipSource {
    pub fn new(cfg: &SearchSection, api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        const USER_AGENT: &str = concat!("gymini/", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            num_results: cfg.num_results,
        }
    }
}

#[async_trait]
impl TipSource for GoogleTipSource {
    async fn search(&self, query: &str) -> Result<Vec<TipHit>, SearchError> {
        tracing::info!(query = %query, "tip search");
        let num = self.num_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.without_url().to_string()))?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.without_url().to_string()))?;
        Ok(body.items)
    }
}

/// 格式化前 max 条结果："- {snippet} ({link})"，置于标题行之下；无结果时返回 None
pub fn format_tips(exercise: &str, hits: &[TipHit], max: usize) -> Option<String> {
    if hits.is_empty() {
        return None;
    }
    let mut formatted = format!("🏋️ Tips for {}:\n", exercise);
    for hit in hits.iter().take(max) {
        formatted.push_str(&format!("- {} ({})\n", hit.snippet.trim(), hit.link.trim()));
    }
    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(n: usize) -> TipHit {
        TipHit {
            snippet: format!("tip {n}"),
            link: format!("https://example.com/{n}"),
        }
    }

    #[test]
    fn test_format_truncates() {
        let hits: Vec<_> = (1..=5).map(hit).collect();
        let text = format_tips("squat", &hits, 3).unwrap();
        assert_eq!(
            text,
            "🏋️ Tips for squat:\n- tip 1 (https://example.com/1)\n- tip 2 (https://example.com/2)\n- tip 3 (https://example.com/3)\n"
        );
    }

    #[test]
    fn test_format_empty() {
        assert!(format_tips("squat", &[], 3).is_none());
    }

    #[test]
    fn test_response_without_items() {
        let body: SearchResponse = serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(body.items.is_empty());
        let body: SearchResponse =
            serde_json::from_str(r#"{"items": [{"snippet": "Keep your back straight", "link": "https://a.b", "title": "x"}]}"#)
                .unwrap();
        assert_eq!(body.items[0].snippet, "Keep your back straight");
    }
}
