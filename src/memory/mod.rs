//! 记忆层：单次请求内的对话历史

pub mod conversation;

pub use conversation::{ConversationHistory, ConversationTurn, Role, HISTORY_WINDOW};
