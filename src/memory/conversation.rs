//! 对话历史
//!
//! 由调用方随请求带入，成功完成一轮后追加 user/assistant 两条；
//! 拼 prompt 时只取最近 N 条（滑动窗口，保持插入顺序）。

use serde::{Deserialize, Serialize};

/// 拼入 prompt 的最近条数
pub const HISTORY_WINDOW: usize = 5;

/// 消息角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// 单条对话
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 对话历史：有序列表，只追加
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// 追加一轮完整交互（user 在前，assistant 在后）
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.push(ConversationTurn::user(user));
        self.push(ConversationTurn::assistant(assistant));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// 最近 n 条
    pub fn window(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// 生成 prompt 中的历史段落；历史为空时返回空串
    pub fn to_prompt_section(&self, n: usize) -> String {
        let window = self.window(n);
        if window.is_empty() {
            return String::new();
        }
        let mut s = String::from("\nConversation History:\n");
        for turn in window {
            s.push_str(&format!("{}: {}\n", turn.role.label(), turn.content));
        }
        s
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_latest_in_order() {
        let mut history = ConversationHistory::new();
        for i in 0..4 {
            history.push_exchange(format!("q{i}"), format!("a{i}"));
        }
        let window = history.window(HISTORY_WINDOW);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0], ConversationTurn::assistant("a1"));
        assert_eq!(window[4], ConversationTurn::assistant("a3"));
    }

    #[test]
    fn test_prompt_section() {
        assert_eq!(ConversationHistory::new().to_prompt_section(HISTORY_WINDOW), "");

        let mut history = ConversationHistory::new();
        history.push_exchange("hi", "hello");
        assert_eq!(
            history.to_prompt_section(HISTORY_WINDOW),
            "\nConversation History:\nUser: hi\nAssistant: hello\n"
        );
    }

    #[test]
    fn test_deserialize_from_request_shape() {
        let json = r#"[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]"#;
        let history: ConversationHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[1].role, Role::Assistant);
    }
}
