//! 核心编排层：组件构建、状态事件、错误类型、主控状态机

pub mod builder;
pub mod error;
pub mod events;
pub mod orchestrator;

pub use builder::{create_llm_from_config, AgentBuilder, AgentComponents};
pub use error::AgentError;
pub use events::{ChatRequest, EventType, ResponseMetadata, StatusEvent};
pub use orchestrator::Orchestrator;
