//! 会话上下文：对话记录 + 用户身份
//!
//! 由编排器独占持有，每轮以 &mut 传给路由器；不存在进程级全局状态。

use crate::memory::{ConversationMemory, StoredIdentity};

/// 单个交互会话的全部可变状态
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub conversation: ConversationMemory,
    pub identity: StoredIdentity,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.identity.name()
    }
}
