//! 编排错误类型
//!
//! 各阶段内部的模型失败已就地转为结构化结果；这里只覆盖逃出阶段边界、需要以 error 事件收尾的情况。

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum AgentError {
    /// 阶段外的模型调用失败（如汇总阶段）
    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("plan invariant violated: {0}")]
    InvalidPlan(String),

    /// 事件消费者已断开，停止产出
    #[error("event consumer disconnected")]
    ConsumerGone,

    #[error("internal failure: {0}")]
    Internal(String),
}
