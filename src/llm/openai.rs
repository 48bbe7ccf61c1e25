//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点；默认指向 Gemini 的 OpenAI 兼容网关。
//! 每次调用前从 ApiKeyStore 读取 Key，因此运行时更换 Key 无需重建客户端。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{ApiKeyStore, LlmClient, LlmError};

/// Gemini OpenAI 兼容端点
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const GEMINI_PRO: &str = "gemini-pro";

/// OpenAI 兼容客户端：持有端点与凭据句柄，generate 时把 prompt 作为单条 user 消息发送并取首条 content
pub struct OpenAiClient {
    base_url: Option<String>,
    api_key: ApiKeyStore,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, api_key: ApiKeyStore) -> Self {
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            api_key,
        }
    }

    pub fn gemini(api_key: ApiKeyStore) -> Self {
        Self::new(Some(GEMINI_BASE_URL), api_key)
    }

    async fn client(&self) -> Result<Client<OpenAIConfig>, LlmError> {
        let key = self.api_key.get().await.ok_or(LlmError::MissingApiKey)?;
        let config = match &self.base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(key),
            None => OpenAIConfig::new().with_api_key(key),
        };
        Ok(Client::with_config(config))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        let client = self.client().await?;

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| LlmError::Build(e.to_string()))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .build()
            .map_err(|e| LlmError::Build(e.to_string()))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "llm usage"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
