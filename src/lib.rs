//! Hive - 多 Agent 编排系统
//!
//! 模块划分：
//! - **agents**: 规划 / 执行 / 伦理审查 Agent 与 prompt 模板
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 组件构建、状态事件、主控状态机
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Gemini / Mock）与凭据存储
//! - **memory**: 对话历史
//! - **observability**: 日志初始化
//! - **parse**: 模型输出解析（计划、执行结果、伦理结论）
//! - **tools**: 工具注册表与模拟工具（web_search、code_interpreter、constitution_retriever）

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod parse;
pub mod tools;

pub use crate::core::{AgentBuilder, ChatRequest, Orchestrator, StatusEvent};
