//! 意图 JSON Schema 生成（schemars）
//!
//! 将合法 tool call 的 JSON 结构注入后端 prompt，减少输出格式错误。

use schemars::schema_for;

use super::parser::{SearchCall, ToolCall};

/// 主助手可输出的全部 tool call 的 JSON Schema
pub fn intent_schema_json() -> String {
    let schema = schema_for!(ToolCall);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Coach 第一阶段 search_web 调用的 JSON Schema
pub fn search_call_schema_json() -> String {
    let schema = schema_for!(SearchCall);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
