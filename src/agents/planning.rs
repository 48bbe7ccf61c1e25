//! 规划 Agent：把目标拆成 1..=7 个有序步骤

use std::sync::Arc;

use crate::agents::prompts::render;
use crate::llm::LlmClient;
use crate::memory::{ConversationHistory, HISTORY_WINDOW};
use crate::parse::{parse_plan, Plan};

pub struct PlanningAgent {
    llm: Arc<dyn LlmClient>,
    model: String,
    template: String,
    history_window: usize,
}

impl PlanningAgent {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            template: template.into(),
            history_window: HISTORY_WINDOW,
        }
    }

    /// 拼入 prompt 的历史条数
    pub fn with_history_window(mut self, n: usize) -> Self {
        self.history_window = n;
        self
    }

    /// 生成计划；模型失败时返回只含错误描述的单步计划
    pub async fn plan(&self, goal: &str, context: &str, history: &ConversationHistory) -> Plan {
        let history_section = history.to_prompt_section(self.history_window);
        let prompt = render(
            &self.template,
            &[("goal", goal), ("context", context), ("history", &history_section)],
        );

        match self.llm.generate(&prompt, &self.model).await {
            Ok(text) => {
                let plan = parse_plan(&text);
                tracing::debug!(steps = plan.len(), "plan created");
                plan
            }
            Err(e) => {
                tracing::warn!("planning failed: {}", e);
                Plan::single(format!("Error creating plan: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::prompts::PLANNING_TEMPLATE;
    use crate::llm::{FailingLlmClient, ScriptedLlmClient};
    use crate::memory::ConversationTurn;

    #[tokio::test]
    async fn test_plan_from_numbered_list() {
        let llm = Arc::new(ScriptedLlmClient::new().route(
            "You are the Planning Agent",
            ["1. Pick a topic\n2. Write the joke"],
        ));
        let agent = PlanningAgent::new(llm.clone(), "m", PLANNING_TEMPLATE);
        let plan = agent.plan("Tell me a joke", "", &ConversationHistory::new()).await;
        assert_eq!(plan.steps(), ["Pick a topic", "Write the joke"]);

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Goal to plan for: Tell me a joke"));
        assert!(!prompt.contains("Conversation History:"));
    }

    #[tokio::test]
    async fn test_history_rendered_into_prompt() {
        let llm = Arc::new(ScriptedLlmClient::new().with_fallback("1. Answer"));
        let agent = PlanningAgent::new(llm.clone(), "m", PLANNING_TEMPLATE);
        let history = ConversationHistory::from(vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
        ]);
        agent.plan("again", "", &history).await;
        assert!(llm.prompts()[0].contains("Conversation History:\nUser: hi\nAssistant: hello\n"));
    }

    #[tokio::test]
    async fn test_model_failure_becomes_single_step() {
        let agent = PlanningAgent::new(Arc::new(FailingLlmClient::new("quota")), "m", PLANNING_TEMPLATE);
        let plan = agent.plan("goal", "", &ConversationHistory::new()).await;
        assert_eq!(plan.len(), 1);
        assert!(plan.steps()[0].starts_with("Error creating plan:"));
        assert!(plan.steps()[0].contains("quota"));
    }
}
