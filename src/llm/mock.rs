//! Mock / 脚本化 LLM 客户端（用于离线运行与测试，无需 API）
//!
//! - MockLlmClient：按 prompt 中的角色标记返回符合解析格式的固定回复，整条流水线可离线跑通
//! - ScriptedLlmClient：按标记路由到各自的回复队列，并记录收到的全部 prompt
//! - FailingLlmClient：每次调用都失败

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};

const PLANNING_MARKER: &str = "You are the Planning Agent";
const EXECUTION_MARKER: &str = "You are the Execution Agent";
const ETHICS_MARKER: &str = "You are the Ethics & Safety Review Agent";

/// Mock 客户端：根据角色标记给出固定格式的回复
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str, _model: &str) -> Result<String, LlmError> {
        let reply = if prompt.contains(PLANNING_MARKER) {
            "1. Understand what the user is asking for\n\
             2. Gather the relevant information\n\
             3. Compose a clear and helpful answer"
                .to_string()
        } else if prompt.contains(ETHICS_MARKER) {
            "Status: APPROVED\n\
             Reasoning: The content is helpful and respects the constitutional principles.\n\
             Concerns:\n\
             Suggestions:\n\
             Final recommendation: Proceed."
                .to_string()
        } else if prompt.contains(EXECUTION_MARKER) {
            let step = prompt
                .lines()
                .find_map(|l| l.trim().strip_prefix("Current Step to Execute:"))
                .map(str::trim)
                .unwrap_or("(unknown step)");
            format!(
                "Thought: This step can be completed with reasoning alone.\n\
                 Action: reasoning_only\n\
                 Tool: none\n\
                 Parameters: none\n\
                 Observation: Nothing external was needed.\n\
                 Result: Worked through \"{step}\" (mock)."
            )
        } else {
            "This is a mock response. Configure an API key to talk to a real model.".to_string()
        };
        Ok(reply)
    }
}

struct Route {
    marker: String,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
}

/// 脚本化客户端：prompt 含 marker 即命中该路由（按注册顺序匹配）；
/// 队列只剩一条时重复返回它，未命中任何路由时返回 fallback 文本
pub struct ScriptedLlmClient {
    routes: Vec<Route>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            fallback: String::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 为 marker 追加若干成功回复
    pub fn route<I, S>(self, marker: &str, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = replies.into_iter().map(|r| Ok(r.into())).collect();
        self.route_results(marker, replies)
    }

    /// 为 marker 追加若干回复（可含失败）
    pub fn route_results(mut self, marker: &str, replies: Vec<Result<String, LlmError>>) -> Self {
        match self.routes.iter().position(|r| r.marker == marker) {
            Some(i) => lock(&self.routes[i].replies).extend(replies),
            None => self.routes.push(Route {
                marker: marker.to_string(),
                replies: Mutex::new(replies.into()),
            }),
        }
        self
    }

    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// 收到过的全部 prompt（按调用顺序）
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// 命中 marker 的调用次数
    pub fn calls(&self, marker: &str) -> usize {
        lock(&self.prompts)
            .iter()
            .filter(|p| p.contains(marker))
            .count()
    }
}

impl Default for ScriptedLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate(&self, prompt: &str, _model: &str) -> Result<String, LlmError> {
        lock(&self.prompts).push(prompt.to_string());

        let Some(route) = self.routes.iter().find(|r| prompt.contains(&r.marker)) else {
            return Ok(self.fallback.clone());
        };
        let mut queue = lock(&route.replies);
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// 每次调用都返回 Request 错误
#[derive(Debug, Clone)]
pub struct FailingLlmClient {
    message: String,
}

impl FailingLlmClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingLlmClient {
    fn default() -> Self {
        Self::new("model unavailable")
    }
}

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, LlmError> {
        Err(LlmError::Request(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_routes_and_repeats_last() {
        let llm = ScriptedLlmClient::new()
            .route("alpha", ["first", "second"])
            .with_fallback("nothing");

        assert_eq!(llm.generate("alpha prompt", "m").await.unwrap(), "first");
        assert_eq!(llm.generate("alpha prompt", "m").await.unwrap(), "second");
        assert_eq!(llm.generate("alpha again", "m").await.unwrap(), "second");
        assert_eq!(llm.generate("beta", "m").await.unwrap(), "nothing");
        assert_eq!(llm.calls("alpha"), 3);
        assert_eq!(llm.prompts().len(), 4);
    }

    #[tokio::test]
    async fn test_scripted_error_reply() {
        let llm = ScriptedLlmClient::new()
            .route_results("x", vec![Err(LlmError::Request("boom".into()))]);
        assert!(llm.generate("x", "m").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_execution_echoes_step() {
        let prompt = "You are the Execution Agent\nCurrent Step to Execute: Say hi\n";
        let out = MockLlmClient.generate(prompt, "m").await.unwrap();
        assert!(out.contains("Result: Worked through \"Say hi\""));
    }
}
