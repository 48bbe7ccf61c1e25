//! 伦理审查 Agent：对照宪章审查计划或最终回复
//!
//! 相关条款经 constitution_retriever 工具检索后拼入 prompt。审查失败时给出 status=error 的结论，
//! 调用方必须按未通过处理。

use std::sync::Arc;

use serde_json::Value;

use crate::agents::prompts::render;
use crate::llm::LlmClient;
use crate::parse::{parse_ethics_review, EthicsVerdict};
use crate::tools::{ToolArgs, ToolRegistry, CONSTITUTION_RETRIEVER};

/// 被审查内容的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Plan,
    Response,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Plan => "plan",
            ContentType::Response => "response",
        }
    }
}

pub struct EthicsAgent {
    llm: Arc<dyn LlmClient>,
    model: String,
    template: String,
    tools: Arc<ToolRegistry>,
}

impl EthicsAgent {
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

    pub async fn review(&self, content: &str, content_type: ContentType) -> EthicsVerdict {
        let mut args = ToolArgs::new();
        args.insert("query".to_string(), Value::String(content.to_string()));
        let constitution = self.tools.invoke_text(CONSTITUTION_RETRIEVER, &args);

        let prompt = render(
            &self.template,
            &[
                ("content_type", content_type.as_str()),
                ("content", content),
                ("constitution", &constitution),
            ],
        );

        match self.llm.generate(&prompt, &self.model).await {
            Ok(text) => {
                let verdict = parse_ethics_review(&text);
                tracing::info!(
                    content_type = content_type.as_str(),
                    status = %verdict.status(),
                    "ethics review"
                );
                verdict
            }
            Err(e) => {
                tracing::warn!("ethics review failed: {}", e);
                EthicsVerdict::error(&e.to_string())
            }
        }
    }
}
