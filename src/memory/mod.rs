//! 记忆层：短期对话记录与用户身份

pub mod conversation;
pub mod identity;

pub use conversation::{render_history, ConversationMemory, Message, Role};
pub use identity::StoredIdentity;
