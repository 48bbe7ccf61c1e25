//! Agent 构建器：统一的组件初始化逻辑
//!
//! CLI 与 HTTP 服务共用同一套 LLM、工具注册表与 prompt 模板；构建结果放进 Arc，供每个请求的
//! Orchestrator 只读共享。

use std::sync::Arc;
use std::time::Duration;

use crate::agents::{EthicsAgent, ExecutionAgent, PlanningAgent, PromptTemplates};
use crate::config::AppConfig;
use crate::llm::{ApiKeyStore, LlmClient, MockLlmClient, OpenAiClient, GEMINI_BASE_URL};
use crate::tools::ToolRegistry;

/// 预构建的 Agent 组件，可多请求共享
pub struct AgentComponents {
    pub planning: PlanningAgent,
    pub execution: ExecutionAgent,
    pub ethics: EthicsAgent,
    pub llm: Arc<dyn LlmClient>,
    pub model: String,
    pub tools: Arc<ToolRegistry>,
    pub synthesis_template: String,
    /// 执行步骤之间的停顿
    pub step_pause: Duration,
    pub history_window: usize,
}

/// 根据配置选择 LLM 后端（Gemini / OpenAI 兼容 / Mock）；凭据从 key 句柄按次读取
pub fn create_llm_from_config(cfg: &AppConfig, api_key: ApiKeyStore) -> Arc<dyn LlmClient> {
    match cfg.llm.provider.to_lowercase().as_str() {
        "mock" => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient)
        }
        "openai" => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(cfg.llm.base_url.as_deref(), api_key))
        }
        other => {
            if other != "gemini" {
                tracing::warn!("Unknown provider '{}', falling back to Gemini", other);
            }
            let base = cfg.llm.base_url.as_deref().unwrap_or(GEMINI_BASE_URL);
            tracing::info!("Using Gemini LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(Some(base), api_key))
        }
    }
}

/// Agent 构建器：统一配置并初始化各个组件
pub struct AgentBuilder {
    config: AppConfig,
    api_key: ApiKeyStore,
    llm: Option<Arc<dyn LlmClient>>,
    tools: Option<ToolRegistry>,
    templates: Option<PromptTemplates>,
}

impl AgentBuilder {
    pub fn new(config: AppConfig, api_key: ApiKeyStore) -> Self {
        Self {
            config,
            api_key,
            llm: None,
            tools: None,
            templates: None,
        }
    }

    /// 指定 LLM 客户端（测试注入脚本化客户端）；未指定时按配置创建
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 指定工具注册表；未指定时使用三个内置工具
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// 指定 prompt 模板；未指定时从 `[prompts].dir` 加载覆盖文件
    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn build(self) -> AgentComponents {
        let cfg = self.config;
        let llm = self
            .llm
            .unwrap_or_else(|| create_llm_from_config(&cfg, self.api_key.clone()));
        let tools = Arc::new(self.tools.unwrap_or_else(ToolRegistry::with_builtin_tools));
        let templates = self
            .templates
            .unwrap_or_else(|| PromptTemplates::load(&cfg.prompts.dir));
        let model = cfg.llm.model.clone();
        let window = cfg.orchestrator.history_window;

        tracing::debug!(tools = ?tools.tool_names(), "agent components ready");

        AgentComponents {
            planning: PlanningAgent::new(llm.clone(), &model, templates.planning)
                .with_history_window(window),
            execution: ExecutionAgent::new(llm.clone(), &model, templates.execution, tools.clone()),
            ethics: EthicsAgent::new(llm.clone(), &model, templates.ethics, tools.clone()),
            llm,
            model,
            tools,
            synthesis_template: templates.synthesis,
            step_pause: Duration::from_millis(cfg.orchestrator.step_pause_ms),
            history_window: window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[tokio::test]
    async fn test_gemini_without_key_reports_missing_key() {
        let llm = create_llm_from_config(&AppConfig::default(), ApiKeyStore::new(None));
        assert_eq!(llm.generate("hi", "gemini-pro").await, Err(LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_mock_provider_needs_no_key() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".to_string();
        let llm = create_llm_from_config(&cfg, ApiKeyStore::new(None));
        let reply = llm.generate("You are the Planning Agent", "m").await.unwrap();
        assert!(reply.starts_with("1. "));
    }

    #[test]
    fn test_build_uses_config_values() {
        let mut cfg = AppConfig::default();
        cfg.orchestrator.step_pause_ms = 0;
        cfg.llm.model = "custom-model".to_string();
        let components = AgentBuilder::new(cfg, ApiKeyStore::new(None))
            .with_llm(Arc::new(MockLlmClient))
            .with_templates(PromptTemplates::default())
            .build();
        assert_eq!(components.step_pause, Duration::ZERO);
        assert_eq!(components.model, "custom-model");
        assert_eq!(
            components.tools.tool_names(),
            ["web_search", "code_interpreter", "constitution_retriever"]
        );
    }
}
