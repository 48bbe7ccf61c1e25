//! 执行 Agent：以 ReAct 格式执行单个计划步骤，必要时经工具网关调用工具

use std::sync::Arc;

use crate::agents::prompts::render;
use crate::llm::LlmClient;
use crate::parse::{parse_execution_result, ExecutionStepResult};
use crate::tools::ToolRegistry;

pub struct ExecutionAgent {
    llm: Arc<dyn LlmClient>,
    model: String,
    template: String,
    tools: Arc<ToolRegistry>,
}

impl ExecutionAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        template: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            template: template.into(),
            tools,
        }
    }

    /// 工具清单文本；allowed 为 None 时列出全部已注册工具
    fn tools_text(&self, allowed: Option<&[String]>) -> String {
        let mut out = String::new();
        for tool in self.tools.list_tools() {
            if allowed.is_some_and(|names| !names.contains(&tool.name)) {
                continue;
            }
            out.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }
        out
    }

    pub async fn execute_step(
        &self,
        step: &str,
        context: &str,
        allowed_tools: Option<&[String]>,
    ) -> ExecutionStepResult {
        let tools_text = self.tools_text(allowed_tools);
        let prompt = render(
            &self.template,
            &[("step", step), ("context", context), ("tools", &tools_text)],
        );

        match self.llm.generate(&prompt, &self.model).await {
            Ok(text) => {
                let result = parse_execution_result(&text, step, &self.tools);
                if let Some(tool) = &result.tool_used {
                    tracing::debug!(tool = %tool, "step used tool");
                }
                result
            }
            Err(e) => {
                tracing::warn!("step execution failed: {}", e);
                ExecutionStepResult::failed(step, &e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::prompts::EXECUTION_TEMPLATE;
    use crate::llm::{FailingLlmClient, ScriptedLlmClient};

    fn tools() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_builtin_tools())
    }

    #[tokio::test]
    async fn test_step_with_tool_call() {
        let llm = Arc::new(ScriptedLlmClient::new().with_fallback(
            "Thought: search it\nAction: use_tool\nTool: web_search\nParameters: weather in Oslo\nResult: Reported the weather",
        ));
        let agent = ExecutionAgent::new(llm.clone(), "m", EXECUTION_TEMPLATE, tools());
        let r = agent.execute_step("Check the weather", "", None).await;

        assert!(r.success);
        assert_eq!(r.tool_used.as_deref(), Some("web_search"));
        assert!(r.observation.starts_with("Tool web_search executed: Weather search results"));
        assert_eq!(r.result, "Reported the weather");

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Current Step to Execute: Check the weather"));
        assert!(prompt.contains("- code_interpreter: Execute and interpret code snippets\n"));
    }

    #[tokio::test]
    async fn test_allowed_tools_filter_listing() {
        let llm = Arc::new(ScriptedLlmClient::new().with_fallback("Result: ok"));
        let agent = ExecutionAgent::new(llm.clone(), "m", EXECUTION_TEMPLATE, tools());
        let allowed = vec!["web_search".to_string()];
        agent.execute_step("step", "ctx", Some(&allowed)).await;

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("- web_search:"));
        assert!(!prompt.contains("- code_interpreter:"));
    }

    #[tokio::test]
    async fn test_model_failure_is_unsuccessful_step() {
        let agent = ExecutionAgent::new(Arc::new(FailingLlmClient::new("down")), "m", EXECUTION_TEMPLATE, tools());
        let r = agent.execute_step("Do it", "", None).await;
        assert!(!r.success);
        assert_eq!(r.step, "Do it");
        assert!(r.result.starts_with("Error executing step:"));
    }
}
