//! 代码解释工具（模拟）
//!
//! 不执行任何代码：按语言族用正则抽取 print / console.log / 函数名等，拼出模拟输出。

use std::sync::OnceLock;

use regex::Regex;

use crate::tools::registry::{arg_str, required_str};
use crate::tools::{Tool, ToolArgs};

pub const CODE_INTERPRETER: &str = "code_interpreter";

static PRINT_RE: OnceLock<Regex> = OnceLock::new();
static PY_DEF_RE: OnceLock<Regex> = OnceLock::new();
static CONSOLE_LOG_RE: OnceLock<Regex> = OnceLock::new();
static JS_FN_RE: OnceLock<Regex> = OnceLock::new();

/// 模拟执行；language 大小写不敏感
pub fn simulate_execution(code: &str, language: &str) -> String {
    let language = language.to_lowercase();
    let code = code.trim();
    match language.as_str() {
        "python" | "py" => simulate_python(code),
        "javascript" | "js" | "node" => simulate_javascript(code),
        "bash" | "shell" | "sh" => simulate_shell(code),
        "sql" => simulate_sql(code),
        other => format!(
            "Code interpretation for {other}:\n{code}\n\nOutput: [Simulated execution - language '{other}' processed successfully]"
        ),
    }
}

/// 字面量原样输出（去引号），其余表达式写成 [Result of ...]
fn render_printed(arg: &str, allow_numbers: bool) -> String {
    let arg = arg.trim();
    if arg.starts_with('"') || arg.starts_with('\'') {
        arg.trim_matches(|c| c == '"' || c == '\'').to_string()
    } else if allow_numbers && !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        arg.to_string()
    } else {
        format!("[Result of {arg}]")
    }
}

fn simulate_python(code: &str) -> String {
    if code.contains("print(") {
        let re = PRINT_RE.get_or_init(|| Regex::new(r"print\((.*?)\)").unwrap());
        let mut out = String::from("Python execution output:\n");
        for cap in re.captures_iter(code) {
            out.push_str(&render_printed(&cap[1], true));
            out.push('\n');
        }
        return out;
    }
    if code.contains("def ") {
        let re = PY_DEF_RE.get_or_init(|| Regex::new(r"def\s+(\w+)").unwrap());
        let name = re
            .captures(code)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "function".to_string());
        return format!("Python execution output:\nFunction '{name}' defined successfully.");
    }
    if code.contains("import ") || code.contains("from ") {
        return "Python execution output:\nModules imported successfully.".to_string();
    }
    if ["+", "-", "*", "/"].iter().any(|op| code.contains(op)) {
        return "Python execution output:\nMathematical operation completed successfully.".to_string();
    }
    format!("Python execution output:\nCode executed successfully:\n{code}")
}

fn simulate_javascript(code: &str) -> String {
    if code.contains("console.log(") {
        let re = CONSOLE_LOG_RE.get_or_init(|| Regex::new(r"console\.log\((.*?)\)").unwrap());
        let mut out = String::from("JavaScript execution output:\n");
        for cap in re.captures_iter(code) {
            out.push_str(&render_printed(&cap[1], false));
            out.push('\n');
        }
        return out;
    }
    if code.contains("function ") {
        let re = JS_FN_RE.get_or_init(|| Regex::new(r"function\s+(\w+)").unwrap());
        let name = re
            .captures(code)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "function".to_string());
        return format!("JavaScript execution output:\nFunction '{name}' defined successfully.");
    }
    format!("JavaScript execution output:\nCode executed successfully:\n{code}")
}

fn simulate_shell(code: &str) -> String {
    let mut out = String::from("Shell execution output:\n");
    for cmd in code.lines().map(str::trim).filter(|c| !c.is_empty()) {
        let line = if cmd.starts_with("ls") {
            "file1.txt  file2.py  directory/".to_string()
        } else if cmd.starts_with("pwd") {
            "/current/working/directory".to_string()
        } else if let Some(text) = cmd.strip_prefix("echo ") {
            text.to_string()
        } else if let Some(dir) = cmd.strip_prefix("mkdir ") {
            format!("Directory '{dir}' created.")
        } else {
            format!("Command '{cmd}' executed successfully.")
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn simulate_sql(code: &str) -> String {
    let upper = code.to_uppercase();
    let body = if upper.contains("SELECT") {
        "Query executed successfully. Sample results:\nRow 1: [data]\nRow 2: [data]\n3 rows returned.".to_string()
    } else if upper.contains("INSERT") {
        "INSERT statement executed successfully. 1 row affected.".to_string()
    } else if upper.contains("UPDATE") {
        "UPDATE statement executed successfully. Rows affected: 2.".to_string()
    } else if upper.contains("DELETE") {
        "DELETE statement executed successfully. Rows affected: 1.".to_string()
    } else if upper.contains("CREATE") {
        "Table/structure created successfully.".to_string()
    } else {
        format!("Query executed successfully:\n{code}")
    };
    format!("SQL execution output:\n{body}")
}

pub struct CodeInterpreterTool;

impl Tool for CodeInterpreterTool {
    fn name(&self) -> &str {
        CODE_INTERPRETER
    }

    fn description(&self) -> &str {
        "Execute and interpret code snippets"
    }

    fn parameters(&self) -> Vec<String> {
        vec!["code".to_string(), "language".to_string()]
    }

    fn execute(&self, args: &ToolArgs) -> Result<String, String> {
        let code = required_str(args, "code")?;
        let language = arg_str(args, "language")?.unwrap_or_else(|| "python".to_string());
        Ok(simulate_execution(&code, &language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_python_prints() {
        let out = simulate_execution("print('hi')\nprint(42)\nprint(x + 1)", "Python");
        assert_eq!(out, "Python execution output:\nhi\n42\n[Result of x + 1]\n");
    }

    #[test]
    fn test_python_def_and_math() {
        assert!(simulate_execution("def greet(name):\n    pass", "py").contains("Function 'greet' defined"));
        assert!(simulate_execution("2 * 3", "python").contains("Mathematical operation"));
    }

    #[test]
    fn test_shell_commands() {
        let out = simulate_execution("pwd\necho hello\nmkdir data\nuname", "bash");
        assert_eq!(
            out,
            "Shell execution output:\n/current/working/directory\nhello\nDirectory 'data' created.\nCommand 'uname' executed successfully.\n"
        );
    }

    #[test]
    fn test_sql_and_unknown_language() {
        assert!(simulate_execution("select * from t", "sql").contains("3 rows returned."));
        assert!(simulate_execution("main = 1", "haskell").contains("language 'haskell' processed"));
    }

    #[test]
    fn test_tool_defaults_to_python() {
        let args = json!({"code": "import os"}).as_object().cloned().unwrap();
        let out = CodeInterpreterTool.execute(&args).unwrap();
        assert_eq!(out, "Python execution output:\nModules imported successfully.");
    }
}
