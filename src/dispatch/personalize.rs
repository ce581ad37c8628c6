//! 个性化过滤：在后端生成的回复里带上已记住的用户名
//!
//! 刻意保持为窄的字面匹配启发式，不做模板或 NLU：
//! - 回复（trim 后，忽略大小写）恰好等于用户名 -> "I remember your name, {name}."
//! - 回复中问候词 "Hey" 恰好出现一次 -> 替换为 "Hey {name}"
//! - 未出现或出现多次 -> 原样返回

use crate::memory::StoredIdentity;

const GREETING: &str = "Hey";

pub fn personalize(text: &str, identity: &StoredIdentity) -> String {
    let Some(name) = identity.name() else {
        return text.to_string();
    };

    if text.trim().to_lowercase() == name.to_lowercase() {
        return format!("I remember your name, {}.", name);
    }

    let greeted = format!("{} {}", GREETING, name);
    if text.contains(&greeted) {
        return text.to_string();
    }
    if text.matches(GREETING).count() == 1 {
        return text.replacen(GREETING, &greeted, 1);
    }
    text.to_string()
}
