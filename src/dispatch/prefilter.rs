//! 上下文预过滤：决定本轮是否携带对话历史
//!
//! 身份、作者、帮助类问题不带历史发送。
//! 纯关键词匹配（小写子串），不是分类器。

const HISTORY_FREE_PHRASES: &[&str] = &[
    "my name is",
    "what is my name",
    "what's my name",
    "do you know my name",
    "who made you",
    "who created you",
    "what can you do",
    "help",
];

/// 该输入是否需要附带对话历史
pub fn needs_history(input: &str) -> bool {
    let lowered = input.to_lowercase();
    !HISTORY_FREE_PHRASES.iter().any(|p| lowered.contains(p))
}
