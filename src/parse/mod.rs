//! 模型输出解析：把自由文本转为结构化控制数据
//!
//! 三个解析器都是全函数：从不失败，格式偏离时给出尽力而为、偏保守的结果，
//! 上游阶段不会因为模型没按格式输出而中断。

pub mod ethics;
pub mod execution;
pub mod plan;

pub use ethics::{parse_ethics_review, EthicsStatus, EthicsVerdict, DEFAULT_REASONING};
pub use execution::{parse_execution_result, ExecutionStepResult};
pub use plan::{parse_plan, Plan, FALLBACK_STEP, MAX_PLAN_STEPS};
