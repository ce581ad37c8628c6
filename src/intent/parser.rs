//! 意图解析：后端回复 -> Intent
//!
//! 去掉 ``` 围栏与语言标签后按严格 JSON 对象解码；解码失败、tool 未知、字段缺失或不合法
//! 都归为 Intent::Unparsed（保留原文作为回复），从不 panic，也不返回错误。

use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::store::Weight;

/// 解析后的意图：每条回复恰好对应一个分支
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    LogSession {
        exercise: String,
        sets: u32,
        reps: u32,
        weight: Weight,
    },
    GetSummary,
    SetName {
        name: String,
    },
    GetName,
    CoachRequest {
        exercise: String,
    },
    EvaluateAgents,
    GetCreator,
    Help,
    /// 非结构化回复（散文、未知工具、字段不合法）
    Unparsed {
        raw_text: String,
    },
}

impl Intent {
    /// 线上 tool 名；Unparsed 返回 "unparsed"
    pub fn tool_name(&self) -> &'static str {
        match self {
            Intent::LogSession { .. } => "log_session",
            Intent::GetSummary => "get_summary",
            Intent::SetName { .. } => "set_name",
            Intent::GetName => "get_name",
            Intent::CoachRequest { .. } => "coach_agent",
            Intent::EvaluateAgents => "evaluate_agents",
            Intent::GetCreator => "get_creator",
            Intent::Help => "help",
            Intent::Unparsed { .. } => "unparsed",
        }
    }
}

/// 主助手允许输出的 tool call 格式（{"tool": "...", ...}）
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub(crate) enum ToolCall {
    /// 用户给出了动作、组数、次数与重量
    LogSession {
        exercise: String,
        sets: i64,
        reps: i64,
        /// 公斤，最多一位小数
        weight_kg: f64,
    },
    /// 查看最近一次训练总结
    GetSummary,
    /// 用户自我介绍
    SetName { name: String },
    /// 用户询问自己的名字
    GetName,
    /// 请求某个动作的训练建议
    CoachAgent { exercise: String },
    /// 运行自检
    EvaluateAgents,
    /// 询问作者
    GetCreator,
    /// 询问能做什么
    Help,
}

/// Coach 子代理第一阶段唯一允许的输出
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub(crate) enum SearchCall {
    SearchWeb { query: String },
}

fn fence_re() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| {
        Regex::new(r"(?s)\A`{3,}\s*(?:[A-Za-z][A-Za-z0-9_+-]*\s*)?([\{\[].*?)\s*(?:`{3,})?\z")
            .expect("fence regex")
    })
}

/// 去掉 ```json ... ``` 围栏及 JSON 之前的语言标记（可与反引号隔空格或换行）；
/// 未被围栏包裹或围栏内不是 JSON 时原样返回
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    fence_re()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed)
}

/// 解析后端回复为 Intent
pub fn parse(raw: &str) -> Intent {
    let trimmed = raw.trim();
    let unparsed = || Intent::Unparsed {
        raw_text: trimmed.to_string(),
    };

    let body = strip_code_fence(trimmed);
    let call: ToolCall = match serde_json::from_str(body) {
        Ok(call) => call,
        Err(e) => {
            tracing::debug!(error = %e, "backend reply is not a tool call");
            return unparsed();
        }
    };

    validate(call).unwrap_or_else(unparsed)
}

/// 字段校验：名字非空、组数次数为正整数、重量合法
fn validate(call: ToolCall) -> Option<Intent> {
    let intent = match call {
        ToolCall::LogSession {
            exercise,
            sets,
            reps,
            weight_kg,
        } => Intent::LogSession {
            exercise: non_empty(exercise)?,
            sets: positive(sets)?,
            reps: positive(reps)?,
            weight: Weight::from_kg(weight_kg)?,
        },
        ToolCall::GetSummary => Intent::GetSummary,
        ToolCall::SetName { name } => Intent::SetName {
            name: non_empty(name)?,
        },
        ToolCall::GetName => Intent::GetName,
        ToolCall::CoachAgent { exercise } => Intent::CoachRequest {
            exercise: non_empty(exercise)?,
        },
        ToolCall::EvaluateAgents => Intent::EvaluateAgents,
        ToolCall::GetCreator => Intent::GetCreator,
        ToolCall::Help => Intent::Help,
    };
    Some(intent)
}

/// 解析 Coach 第一阶段回复：仅接受 {"tool": "search_web", "query": "..."}
pub fn parse_search_call(raw: &str) -> Option<String> {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<SearchCall>(body) {
        Ok(SearchCall::SearchWeb { query }) => non_empty(query),
        Err(e) => {
            tracing::debug!(error = %e, "coach reply is not a search_web call");
            None
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn positive(n: i64) -> Option<u32> {
    u32::try_from(n).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unparsed(intent: &Intent) -> bool {
        matches!(intent, Intent::Unparsed { .. })
    }

    #[test]
    fn test_log_session() {
        let intent = parse(
            r#"{"tool": "log_session", "exercise": "Squat", "sets": 4, "reps": 5, "weight_kg": 30}"#,
        );
        assert_eq!(
            intent,
            Intent::LogSession {
                exercise: "Squat".into(),
                sets: 4,
                reps: 5,
                weight: Weight::from_kg(30.0).unwrap(),
            }
        );
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"tool\": \"get_summary\"}\n```";
        assert_eq!(parse(raw), Intent::GetSummary);
        let raw = "```\n{\"tool\": \"help\"}\n```";
        assert_eq!(parse(raw), Intent::Help);
        let raw = "```json{\"tool\": \"get_name\"}```";
        assert_eq!(parse(raw), Intent::GetName);
        let raw = "``` json\n{\"tool\": \"get_summary\"}\n```";
        assert_eq!(parse(raw), Intent::GetSummary);
        let raw = "```\njson\n{\"tool\": \"help\"}```";
        assert_eq!(parse(raw), Intent::Help);
        let raw = "```JSON \r\n {\"tool\": \"get_name\"} \n```";
        assert_eq!(parse(raw), Intent::GetName);
    }

    #[test]
    fn test_fenced_search_call_with_spaced_tag() {
        let raw = "``` json\n{\"tool\": \"search_web\", \"query\": \"squat tips\"}\n```";
        assert_eq!(parse_search_call(raw), Some("squat tips".to_string()));
        assert_eq!(strip_code_fence("```\nnot json\n```"), "```\nnot json\n```");
    }

    #[test]
    fn test_unit_tools() {
        assert_eq!(parse(r#"{"tool":"evaluate_agents"}"#), Intent::EvaluateAgents);
        assert_eq!(parse(r#"{"tool":"get_creator"}"#), Intent::GetCreator);
        assert_eq!(
            parse(r#"{"tool":"set_name","name":" Alex "}"#),
            Intent::SetName { name: "Alex".into() }
        );
        assert_eq!(
            parse(r#"{"tool":"coach_agent","exercise":"squat"}"#),
            Intent::CoachRequest { exercise: "squat".into() }
        );
    }

    #[test]
    fn test_unparsed_cases() {
        assert!(is_unparsed(&parse("")));
        assert!(is_unparsed(&parse("Hey there, great job!")));
        assert!(is_unparsed(&parse(r#"{"exercise": "Squat"}"#)));
        assert!(is_unparsed(&parse(r#"{"tool": "fly_to_moon"}"#)));
        assert!(is_unparsed(&parse("[1, 2, 3]")));
    }

    #[test]
    fn test_unparsed_keeps_trimmed_text() {
        let intent = parse("  Rest days matter too.  \n");
        assert_eq!(
            intent,
            Intent::Unparsed {
                raw_text: "Rest days matter too.".into()
            }
        );
    }

    #[test]
    fn test_invalid_fields_collapse() {
        for raw in [
            r#"{"tool":"log_session","exercise":"Squat","sets":0,"reps":5,"weight_kg":30}"#,
            r#"{"tool":"log_session","exercise":"Squat","sets":4,"reps":-1,"weight_kg":30}"#,
            r#"{"tool":"log_session","exercise":"Squat","sets":4,"reps":5,"weight_kg":-2.5}"#,
            r#"{"tool":"log_session","exercise":"Squat","sets":4,"reps":5,"weight_kg":22.55}"#,
            r#"{"tool":"log_session","exercise":"  ","sets":4,"reps":5,"weight_kg":30}"#,
            r#"{"tool":"log_session","exercise":"Squat","sets":4,"reps":5}"#,
            r#"{"tool":"log_session","exercise":"Squat","sets":4.5,"reps":5,"weight_kg":30}"#,
            r#"{"tool":"set_name","name":""}"#,
            r#"{"tool":"coach_agent"}"#,
        ] {
            assert!(is_unparsed(&parse(raw)), "expected Unparsed for {raw}");
        }
    }

    #[test]
    fn test_search_call() {
        assert_eq!(
            parse_search_call(r#"{"tool": "search_web", "query": "squat form tips"}"#),
            Some("squat form tips".into())
        );
        assert_eq!(
            parse_search_call("```json\n{\"tool\": \"search_web\", \"query\": \"squat\"}\n```"),
            Some("squat".into())
        );
        assert_eq!(parse_search_call(r#"{"tool": "log_session"}"#), None);
        assert_eq!(parse_search_call(r#"{"tool": "search_web", "query": ""}"#), None);
        assert_eq!(parse_search_call("Here are some tips..."), None);
    }
}
