//! 模型调用抽象
//!
//! 所有后端（OpenAI 兼容 / Gemini / Mock）实现 LlmClient：单次调用，不重试、不设内部超时，
//! 取消由调用方丢弃 future 完成。失败以 LlmError 返回，由各阶段在边界处转为结构化兜底值。

use async_trait::async_trait;
use thiserror::Error;

/// 模型调用失败的类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Failed to build request: {0}")]
    Build(String),

    #[error("Model request failed: {0}")]
    Request(String),
}

/// 模型客户端 trait：给定 prompt 与模型标识，返回生成文本
///
/// 返回的文本本身也可能是一段人类可读的错误说明（代理层常以友好文本代替异常），
/// 下游解析器必须把它当作普通输出处理。
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, LlmError>;
}
