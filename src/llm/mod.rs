//! LLM 层：模型调用抽象、凭据存储与实现（OpenAI 兼容 / Gemini / Mock）

pub mod credential;
pub mod mock;
pub mod openai;
pub mod traits;

pub use credential::ApiKeyStore;
pub use mock::{FailingLlmClient, MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, GEMINI_BASE_URL, GEMINI_PRO};
pub use traits::{LlmClient, LlmError};
