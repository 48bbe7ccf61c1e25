//! 专职 Agent：规划、执行、伦理审查，以及统一的 Agent 名录
//!
//! 每个 Agent 持有共享的 LLM 客户端与模型名；模型调用失败在各自边界内转为结构化结果，不向上抛出。

pub mod ethics;
pub mod execution;
pub mod planning;
pub mod prompts;

pub use ethics::{ContentType, EthicsAgent};
pub use execution::ExecutionAgent;
pub use planning::PlanningAgent;
pub use prompts::{render, PromptTemplates};

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// 系统中的 Agent 种类；状态事件里的 agent 字段取其显示名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Orchestrator,
    Planning,
    Execution,
    Ethics,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Orchestrator,
        AgentKind::Planning,
        AgentKind::Execution,
        AgentKind::Ethics,
    ];

    /// 显示名（事件流、界面）
    pub fn display_name(self) -> &'static str {
        match self {
            AgentKind::Orchestrator => "Master Orchestrator",
            AgentKind::Planning => "Planning Agent",
            AgentKind::Execution => "Execution Agent",
            AgentKind::Ethics => "Ethics & Safety Review Agent",
        }
    }

    /// 机器可读键
    pub fn key(self) -> &'static str {
        match self {
            AgentKind::Orchestrator => "orchestrator",
            AgentKind::Planning => "planning",
            AgentKind::Execution => "execution",
            AgentKind::Ethics => "ethics",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgent;

    /// 接受键或显示名，大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AgentKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(wanted) || k.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}
