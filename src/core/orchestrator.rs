//! 主控编排器：一次用户请求的完整状态机
//!
//! 规划 → 计划伦理审查（驳回即终止；需修改则重新规划一次，随后无论如何继续）→ 逐步执行 →
//! 汇总 → 最终回复伦理审查 → 写入历史并发出最终回复。
//!
//! 事件经容量为 1 的 mpsc 通道逐条交给消费者；消费者丢弃接收端后，运行在下一个挂起点被放弃，
//! 不再产生任何事件。运行中的任何未捕获失败（含 panic）都以一条 error 事件收尾。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::agents::{render, AgentKind, ContentType};
use crate::core::builder::AgentComponents;
use crate::core::error::AgentError;
use crate::core::events::{ResponseMetadata, StatusEvent};
use crate::memory::ConversationHistory;
use crate::parse::{EthicsStatus, ExecutionStepResult, Plan};

/// 通道容量：生产者最多领先消费者一个事件
const EVENT_BUFFER: usize = 1;

const PLANNING_CONTEXT: &str = "User request in multi-agent system";
const REVISION_GOAL: &str = "Revise the approach to address ethical concerns while still being helpful";

/// 单次请求的编排器：独占本轮的计划、执行记录与对话历史
pub struct Orchestrator {
    components: Arc<AgentComponents>,
    history: ConversationHistory,
}

impl Orchestrator {
    pub fn new(components: Arc<AgentComponents>, history: ConversationHistory) -> Self {
        Self {
            components,
            history,
        }
    }

    /// 后台运行一轮，返回事件接收端与结束后的对话历史
    ///
    /// 历史仅在成功完成时追加本轮；出错、驳回或消费者断开时原样返回。
    pub fn stream(
        self,
        message: impl Into<String>,
    ) -> (mpsc::Receiver<StatusEvent>, JoinHandle<ConversationHistory>) {
        let message = message.into();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let span = tracing::info_span!("turn", id = %uuid::Uuid::new_v4());

        let handle = tokio::spawn(async move {
            let before = self.history.clone();
            let run_tx = tx.clone();
            let run = tokio::spawn(
                async move {
                    let mut orchestrator = self;
                    let outcome = tokio::select! {
                        r = orchestrator.run(&message, &run_tx) => r,
                        _ = run_tx.closed() => Err(AgentError::ConsumerGone),
                    };
                    (orchestrator.history, outcome)
                }
                .in_current_span(),
            );

            let (history, failure) = match run.await {
                Ok((history, Ok(()))) => (history, None),
                Ok((history, Err(AgentError::ConsumerGone))) => {
                    tracing::info!("event consumer disconnected, run abandoned");
                    (history, None)
                }
                Ok((history, Err(e))) => (history, Some(e)),
                Err(join_err) => (before, Some(AgentError::Internal(join_err.to_string()))),
            };

            if let Some(e) = failure {
                tracing::error!("orchestration failed: {}", e);
                let event = StatusEvent::error(format!(
                    "An error occurred while processing your request: {e}"
                ));
                if tx.send(event).await.is_err() {
                    tracing::debug!("error event dropped, consumer gone");
                }
            }
            history
        }
        .instrument(span));

        (rx, handle)
    }

    /// 运行到结束并收集全部事件
    pub async fn run_to_end(self, message: impl Into<String>) -> (Vec<StatusEvent>, ConversationHistory) {
        let (mut rx, handle) = self.stream(message);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let history = match handle.await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("orchestrator task failed: {}", e);
                ConversationHistory::new()
            }
        };
        (events, history)
    }

    async fn emit(&self, tx: &mpsc::Sender<StatusEvent>, event: StatusEvent) -> Result<(), AgentError> {
        tx.send(event).await.map_err(|_| AgentError::ConsumerGone)
    }

    async fn run(&mut self, message: &str, tx: &mpsc::Sender<StatusEvent>) -> Result<(), AgentError> {
        let c = self.components.clone();

        self.emit(tx, StatusEvent::status(
            AgentKind::Orchestrator,
            "Analyzing request and coordinating agent workflow...",
        ))
        .await?;

        self.emit(tx, StatusEvent::status(AgentKind::Planning, "Creating detailed step-by-step plan..."))
            .await?;
        let mut plan = c.planning.plan(message, PLANNING_CONTEXT, &self.history).await;
        tracing::info!(steps = plan.len(), "plan created");

        self.emit(tx, StatusEvent::status(AgentKind::Ethics, "Reviewing plan for ethical compliance..."))
            .await?;
        let plan_review = c.ethics.review(&plan.joined(), ContentType::Plan).await;

        if !plan_review.approved() {
            if plan_review.status() == EthicsStatus::Rejected {
                tracing::info!("plan rejected on ethical grounds");
                let text = format!(
                    "I cannot fulfill this request due to ethical concerns: {}",
                    plan_review.reasoning
                );
                return self
                    .emit(tx, StatusEvent::response(AgentKind::Ethics, text, None))
                    .await;
            }

            self.emit(tx, StatusEvent::status(AgentKind::Planning, "Revising plan based on ethical feedback..."))
                .await?;
            let revision_context = format!(
                "Original request: {message}\nEthical concerns: {}\nSuggestions: {}",
                plan_review.concerns.join("; "),
                plan_review.suggestions.join("; ")
            );
            plan = c.planning.plan(REVISION_GOAL, &revision_context, &self.history).await;
            tracing::info!(steps = plan.len(), "plan revised");
        }

        if plan.is_empty() {
            return Err(AgentError::InvalidPlan("plan has no steps".to_string()));
        }

        let mut log: Vec<ExecutionStepResult> = Vec::with_capacity(plan.len());
        for (i, step) in plan.iter().enumerate() {
            let preview: String = step.chars().take(50).collect();
            self.emit(tx, StatusEvent::status(
                AgentKind::Execution,
                format!("Executing step {}/{}: {}...", i + 1, plan.len(), preview),
            ))
            .await?;

            let context = execution_context(&log);
            let result = c.execution.execute_step(step, &context, None).await;
            tracing::info!(step = i + 1, total = plan.len(), success = result.success, "step finished");
            log.push(result);

            if !c.step_pause.is_zero() {
                tokio::time::sleep(c.step_pause).await;
            }
        }

        self.emit(tx, StatusEvent::status(AgentKind::Orchestrator, "Synthesizing final response..."))
            .await?;
        let completed: Vec<&str> = log
            .iter()
            .filter(|r| r.success)
            .map(|r| r.result.as_str())
            .collect();
        let mut answer = match self.synthesize(message, &plan, &completed, plan_review.approved()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("synthesis failed: {}", e);
                synthesis_fallback(&completed)
            }
        };

        let final_review = c.ethics.review(&answer, ContentType::Response).await;
        if !final_review.approved() {
            tracing::info!(status = %final_review.status(), "final answer overridden after review");
            answer = format!(
                "I've prepared a response, but upon final review, I need to modify it for ethical compliance. {}",
                final_review.reasoning
            );
        }

        self.history.push_exchange(message, answer.clone());
        tracing::info!(history = self.history.len(), "turn committed");

        let metadata = ResponseMetadata {
            plan_steps: plan.len(),
            executed_steps: log.len(),
            ethics_approved: final_review.approved(),
        };
        self.emit(tx, StatusEvent::response(AgentKind::Orchestrator, answer, Some(metadata)))
            .await
    }

    async fn synthesize(
        &self,
        message: &str,
        plan: &Plan,
        completed: &[&str],
        plan_approved: bool,
    ) -> Result<String, AgentError> {
        let c = &self.components;
        let work = completed
            .iter()
            .map(|w| format!("- {w}"))
            .collect::<Vec<_>>()
            .join("\n");
        let ethics_status = if plan_approved { "Approved" } else { "Required revisions" };
        let history = self.history.to_prompt_section(c.history_window);
        let prompt = render(
            &c.synthesis_template,
            &[
                ("message", message),
                ("plan", &plan.numbered()),
                ("work", &work),
                ("ethics_status", ethics_status),
                ("history", &history),
            ],
        );
        let text = c.llm.generate(&prompt, &c.model).await?;
        Ok(text.trim().to_string())
    }
}

/// 已完成步骤的摘要，作为下一步的执行上下文
fn execution_context(log: &[ExecutionStepResult]) -> String {
    if log.is_empty() {
        return String::new();
    }
    let mut context = String::from("Previous steps completed:\n");
    for (i, r) in log.iter().enumerate() {
        context.push_str(&format!("{}. {}\n", i + 1, r.result));
    }
    context
}

fn synthesis_fallback(completed: &[&str]) -> String {
    let found = if completed.is_empty() {
        "I encountered some technical difficulties but did my best to address your request.".to_string()
    } else {
        completed.join("; ")
    };
    format!("I've completed the analysis and work on your request. Here's what I found: {found}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(result: &str, success: bool) -> ExecutionStepResult {
        ExecutionStepResult {
            step: "s".to_string(),
            success,
            result: result.to_string(),
            tool_used: None,
            observation: String::new(),
            thought: String::new(),
        }
    }

    #[test]
    fn test_execution_context() {
        assert_eq!(execution_context(&[]), "");
        assert_eq!(
            execution_context(&[step("found it", true), step("wrote it", false)]),
            "Previous steps completed:\n1. found it\n2. wrote it\n"
        );
    }

    #[test]
    fn test_synthesis_fallback() {
        assert_eq!(
            synthesis_fallback(&["a", "b"]),
            "I've completed the analysis and work on your request. Here's what I found: a; b"
        );
        assert!(synthesis_fallback(&[]).ends_with("did my best to address your request."));
    }
}
