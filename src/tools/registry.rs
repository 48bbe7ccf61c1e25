//! 工具注册表（Tool Gateway）
//!
//! 所有工具实现 Tool trait（name / description / parameters / execute），由 ToolRegistry 按名注册与查找。
//! invoke 永不 panic：未知工具、多余参数、工具内部失败都转为 ToolError，其 Display 即给模型看的错误文本；
//! 每次调用输出一条结构化审计日志（JSON）。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// 工具参数：键值对，对应具名参数
pub type ToolArgs = Map<String, Value>;

/// 工具 trait：名称、描述（供 LLM 理解）、参数名列表、同步执行
pub trait Tool: Send + Sync {
    /// 工具名称（注册表中的唯一键）
    fn name(&self) -> &str;

    /// 工具描述（拼入执行 prompt）
    fn description(&self) -> &str;

    /// 接受的参数名（有序）；调用时出现列表外的键即报错
    fn parameters(&self) -> Vec<String>;

    /// 执行工具
    fn execute(&self, args: &ToolArgs) -> Result<String, String>;
}

/// 工具调用失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Error: Tool '{name}' not found. Available tools: [{}]", .available.join(", "))]
    NotFound { name: String, available: Vec<String> },

    #[error("Error executing tool '{tool}': unexpected argument '{arg}'")]
    UnexpectedArgument { tool: String, arg: String },

    #[error("Error executing tool '{tool}': {reason}")]
    Failed { tool: String, reason: String },
}

/// 工具描述符：供 prompt 构建与 `/api/status` 使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

/// 以闭包注册的工具
struct FnTool<F> {
    name: String,
    description: String,
    parameters: Vec<String>,
    func: F,
}

impl<F> Tool for FnTool<F>
where
    F: Fn(&ToolArgs) -> Result<String, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }

    fn execute(&self, args: &ToolArgs) -> Result<String, String> {
        (self.func)(args)
    }
}

/// 工具注册表：按名称存储 Arc<dyn Tool>，保留注册顺序；同名重复注册后者覆盖前者
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 web_search / code_interpreter / constitution_retriever
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(crate::tools::WebSearchTool);
        registry.register(crate::tools::CodeInterpreterTool);
        registry.register(crate::tools::ConstitutionRetrieverTool);
        registry
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::debug!(tool = %name, "tool re-registered, previous entry replaced");
        } else {
            self.order.push(name);
        }
    }

    /// 以闭包注册工具（运行期追加能力用）
    pub fn register_fn<F>(&mut self, name: &str, description: &str, parameters: &[&str], func: F)
    where
        F: Fn(&ToolArgs) -> Result<String, String> + Send + Sync + 'static,
    {
        self.register(FnTool {
            name: name.to_string(),
            description: description.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            func,
        });
    }

    /// 按注册顺序返回工具名
    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// 按注册顺序返回全部描述符
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// 生成 "Available Tools:" 文本清单
    pub fn format_listing(&self) -> String {
        let mut out = String::from("Available Tools:\n");
        for tool in self.list_tools() {
            out.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }
        out
    }

    /// 调用工具；参数按名展开，列表外的键视为错误
    pub fn invoke(&self, name: &str, args: &ToolArgs) -> Result<String, ToolError> {
        let start = Instant::now();
        let result = self.invoke_inner(name, args);

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ToolError::NotFound { .. }) => "not_found",
            Err(_) => "error",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": name,
            "ok": result.is_ok(),
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview(args),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }

    /// invoke 的文本形式：失败时返回错误描述
    pub fn invoke_text(&self, name: &str, args: &ToolArgs) -> String {
        self.invoke(name, args).unwrap_or_else(|e| e.to_string())
    }

    fn invoke_inner(&self, name: &str, args: &ToolArgs) -> Result<String, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
            available: self.tool_names(),
        })?;

        let accepted = tool.parameters();
        if let Some(arg) = args.keys().find(|k| !accepted.iter().any(|p| p == *k)) {
            return Err(ToolError::UnexpectedArgument {
                tool: name.to_string(),
                arg: arg.clone(),
            });
        }

        tool.execute(args).map_err(|reason| ToolError::Failed {
            tool: name.to_string(),
            reason,
        })
    }
}

/// 取字符串参数：字符串原样返回，数字 / 布尔转为文本，缺失返回 None
pub fn arg_str(args: &ToolArgs, key: &str) -> Result<Option<String>, String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(_) => Err(format!("argument '{key}' must be a string")),
    }
}

/// 必填字符串参数
pub fn required_str(args: &ToolArgs, key: &str) -> Result<String, String> {
    arg_str(args, key)?.ok_or_else(|| format!("missing required argument '{key}'"))
}

fn args_preview(args: &ToolArgs) -> String {
    let s = Value::Object(args.clone()).to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> ToolArgs {
        v.as_object().cloned().unwrap_or_default()
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "Echo text back", &["text"], |a| {
            required_str(a, "text")
        });
        registry
    }

    #[test]
    fn test_unknown_tool_lists_known_names() {
        let registry = echo_registry();
        let err = registry.invoke("nope", &ToolArgs::new()).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Error: Tool 'nope' not found. Available tools: [echo]"
        );
    }

    #[test]
    fn test_unexpected_argument_is_error() {
        let registry = echo_registry();
        let err = registry
            .invoke("echo", &args(json!({"text": "hi", "loud": true})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::UnexpectedArgument {
                tool: "echo".into(),
                arg: "loud".into()
            }
        );
    }

    #[test]
    fn test_missing_argument_wrapped() {
        let registry = echo_registry();
        let text = registry.invoke_text("echo", &ToolArgs::new());
        assert_eq!(text, "Error executing tool 'echo': missing required argument 'text'");
    }

    #[test]
    fn test_reregister_overwrites_keeps_position() {
        let mut registry = echo_registry();
        registry.register_fn("other", "Other", &[], |_| Ok("o".into()));
        registry.register_fn("echo", "Shout text back", &["text"], |a| {
            Ok(required_str(a, "text")?.to_uppercase())
        });

        assert_eq!(registry.tool_names(), vec!["echo", "other"]);
        assert_eq!(registry.list_tools()[0].description, "Shout text back");
        assert_eq!(
            registry.invoke("echo", &args(json!({"text": "hi"}))).unwrap(),
            "HI"
        );
    }

    #[test]
    fn test_builtin_listing() {
        let registry = ToolRegistry::with_builtin_tools();
        assert_eq!(
            registry.tool_names(),
            vec!["web_search", "code_interpreter", "constitution_retriever"]
        );
        let listing = registry.format_listing();
        assert!(listing.starts_with("Available Tools:\n- web_search: "));
        assert_eq!(registry.list_tools()[1].parameters, vec!["code", "language"]);
    }

    #[test]
    fn test_arg_str_scalars() {
        let a = args(json!({"n": 3, "s": "x", "o": {"k": 1}}));
        assert_eq!(arg_str(&a, "n").unwrap().as_deref(), Some("3"));
        assert_eq!(arg_str(&a, "s").unwrap().as_deref(), Some("x"));
        assert!(arg_str(&a, "o").is_err());
        assert_eq!(arg_str(&a, "missing").unwrap(), None);
    }
}
