//! 意图层：后端回复解析（Intent）与 tool call Schema

pub mod parser;
pub mod schema;

pub use parser::{parse, parse_search_call, strip_code_fence, Intent};
pub use schema::{intent_schema_json, search_call_schema_json};
