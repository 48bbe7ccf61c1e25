//! ReAct 执行结果解析
//!
//! 逐行推进“当前段落”游标：`Thought:` / `Action:` / `Observation:` / `Result:` 切换段落，
//! `Tool:` 与 `Parameters:` 只记录值不移动游标。无前缀的续行追加到当前段落
//! （thought / result 空格连接，observation 换行连接）。
//! 同时出现非 none 的 Tool 与其后非 none 的 Parameters 时同步调用工具，结果写入 observation。

use serde::Serialize;
use serde_json::Value;

use crate::tools::{ToolArgs, ToolRegistry};

/// 单步执行结果；result 恒非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStepResult {
    pub step: String,
    pub success: bool,
    pub result: String,
    pub tool_used: Option<String>,
    pub observation: String,
    pub thought: String,
}

impl ExecutionStepResult {
    /// 模型调用失败时的结果：success=false，result / observation 描述技术错误
    pub fn failed(step: &str, error: &str) -> Self {
        Self {
            step: step.to_string(),
            success: false,
            result: format!("Error executing step: {error}"),
            tool_used: None,
            observation: format!("Technical error: {error}"),
            thought: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Thought,
    Action,
    Observation,
    Result,
}

fn push_spaced(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn is_none(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

/// 解析执行输出；可能经 ToolRegistry 调用一次或多次工具
pub fn parse_execution_result(
    text: &str,
    original_step: &str,
    tools: &ToolRegistry,
) -> ExecutionStepResult {
    let mut out = ExecutionStepResult {
        step: original_step.to_string(),
        success: true,
        result: String::new(),
        tool_used: None,
        observation: String::new(),
        thought: String::new(),
    };
    let mut section = Section::None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("Thought:") {
            section = Section::Thought;
            let value = value.trim();
            if !value.is_empty() {
                out.thought = value.to_string();
            }
        } else if line.starts_with("Action:") {
            section = Section::Action;
        } else if let Some(value) = line.strip_prefix("Tool:") {
            let value = value.trim();
            if !is_none(value) {
                out.tool_used = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("Parameters:") {
            let value = value.trim();
            if let Some(tool) = out.tool_used.as_deref() {
                if !is_none(value) {
                    let observed = run_tool(tools, tool, value);
                    out.observation.push_str(&observed);
                    out.observation.push('\n');
                }
            }
        } else if let Some(value) = line.strip_prefix("Observation:") {
            section = Section::Observation;
            let value = value.trim();
            if !value.is_empty() {
                out.observation.push_str(value);
                out.observation.push('\n');
            }
        } else if let Some(value) = line.strip_prefix("Result:") {
            section = Section::Result;
            let value = value.trim();
            if !value.is_empty() {
                out.result = value.to_string();
            }
        } else if !line.is_empty() {
            match section {
                Section::Thought => push_spaced(&mut out.thought, line),
                Section::Result => push_spaced(&mut out.result, line),
                Section::Observation => {
                    out.observation.push_str(line);
                    out.observation.push('\n');
                }
                Section::Action | Section::None => {}
            }
        }
    }

    if out.result.is_empty() {
        out.result = format!("Completed step: {original_step}");
    }
    out.observation = out.observation.trim().to_string();
    out
}

/// `{` 开头按 JSON 对象解析，否则整段作为 query 参数
fn parse_parameters(text: &str) -> Result<ToolArgs, String> {
    if !text.starts_with('{') {
        let mut args = ToolArgs::new();
        args.insert("query".to_string(), Value::String(text.to_string()));
        return Ok(args);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("parameters must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid parameters: {e}")),
    }
}

fn run_tool(tools: &ToolRegistry, tool: &str, params: &str) -> String {
    let args = match parse_parameters(params) {
        Ok(args) => args,
        Err(e) => return format!("Tool execution failed: {e}"),
    };
    match tools.invoke(tool, &args) {
        Ok(output) => format!("Tool {tool} executed: {output}"),
        Err(e) => format!("Tool {tool} failed: {e}"),
    }
}
