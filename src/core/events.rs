//! 编排状态事件：用于流式（NDJSON）展示各 Agent 的进度与最终回复

use serde::{Deserialize, Serialize};

use crate::agents::AgentKind;
use crate::memory::ConversationHistory;

/// 入站请求：用户消息与调用方保存的对话历史
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: ConversationHistory,
}

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Status,
    Response,
    Error,
}

/// 最终回复附带的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMetadata {
    pub plan_steps: usize,
    pub executed_steps: usize,
    pub ethics_approved: bool,
}

/// 单条状态事件（每条序列化为一行 JSON）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    pub agent: String,
    pub message: String,
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl StatusEvent {
    /// 进度事件
    pub fn status(agent: AgentKind, message: impl Into<String>) -> Self {
        Self {
            kind: EventType::Status,
            agent: agent.display_name().to_string(),
            message: message.into(),
            is_final: false,
            metadata: None,
        }
    }

    /// 终止性回复（拒绝时 metadata 为空）
    pub fn response(agent: AgentKind, message: impl Into<String>, metadata: Option<ResponseMetadata>) -> Self {
        Self {
            kind: EventType::Response,
            agent: agent.display_name().to_string(),
            message: message.into(),
            is_final: true,
            metadata,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventType::Error,
            agent: AgentKind::Orchestrator.display_name().to_string(),
            message: message.into(),
            is_final: true,
            metadata: None,
        }
    }

    /// 序列化为一行 NDJSON（含换行）
    pub fn to_ndjson(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","agent":"Master Orchestrator","message":"event encoding failed: {e}","is_final":true}}"#)
        });
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_history_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(req.conversation_history.is_empty());

        let req: ChatRequest = serde_json::from_str(
            r#"{"message":"again","conversation_history":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#,
        )
        .unwrap();
        assert_eq!(req.conversation_history.len(), 2);
    }

    #[test]
    fn test_status_event_json_shape() {
        let e = StatusEvent::status(AgentKind::Planning, "Creating detailed step-by-step plan...");
        let v: serde_json::Value = serde_json::from_str(e.to_ndjson().trim_end()).unwrap();
        assert_eq!(v["type"], "status");
        assert_eq!(v["agent"], "Planning Agent");
        assert_eq!(v["is_final"], false);
        assert!(v.get("metadata").is_none());
    }

    #[test]
    fn test_response_with_metadata() {
        let e = StatusEvent::response(
            AgentKind::Orchestrator,
            "done",
            Some(ResponseMetadata {
                plan_steps: 2,
                executed_steps: 2,
                ethics_approved: true,
            }),
        );
        let line = e.to_ndjson();
        assert!(line.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(v["type"], "response");
        assert_eq!(v["is_final"], true);
        assert_eq!(v["metadata"]["plan_steps"], 2);
        assert_eq!(v["metadata"]["ethics_approved"], true);
    }
}
