//! 计划解析
//!
//! 行首为数字、`-` 或 `•` 的行视为步骤，只去掉 `N. ` / `N) ` / `- ` / `• ` 形式的标记，
//! 其余内容（如 `1.5 cups`、`-5 degrees`）原样保留；
//! 没有这样的行时取 `Plan:` 标记之后的所有非空行；仍为空则给出单条兜底步骤。
//! 最多保留前 7 步（与给模型的指令一致，不算解析失败）。

use serde::Serialize;

/// 计划步数上限
pub const MAX_PLAN_STEPS: usize = 7;
/// 解析不出任何步骤时的兜底步骤
pub const FALLBACK_STEP: &str = "Analyze the request and determine the appropriate response";

/// 有序步骤列表，长度恒为 1..=7；创建后不可修改，修订会生成新的 Plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<String>,
}

impl Plan {
    /// 由步骤构造：截断到上限，空列表替换为兜底步骤
    pub fn new(mut steps: Vec<String>) -> Self {
        steps.retain(|s| !s.trim().is_empty());
        if steps.is_empty() {
            steps.push(FALLBACK_STEP.to_string());
        }
        steps.truncate(MAX_PLAN_STEPS);
        Self { steps }
    }

    pub fn single(step: impl Into<String>) -> Self {
        Self::new(vec![step.into()])
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// 恒为 false，保留以配合 len
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.steps.iter()
    }

    /// 换行拼接（送伦理审查用）
    pub fn joined(&self) -> String {
        self.steps.join("\n")
    }

    /// "1. ...\n2. ..." 形式
    pub fn numbered(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// 解析模型给出的计划文本
pub fn parse_plan(text: &str) -> Plan {
    let mut steps: Vec<String> = text.lines().filter_map(candidate_step).collect();

    if steps.is_empty() {
        steps = lines_after_plan_marker(text);
        if !steps.is_empty() {
            tracing::debug!(count = steps.len(), "plan parsed from Plan: section");
        }
    }
    if steps.is_empty() {
        tracing::debug!("no plan steps recognised, using fallback step");
    }

    Plan::new(steps)
}

fn candidate_step(line: &str) -> Option<String> {
    let line = line.trim();
    let first = line.chars().next()?;
    let body = if first.is_ascii_digit() {
        strip_number(line)
    } else if first == '-' || first == '•' {
        strip_bullet(line, first)
    } else {
        return None;
    };
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// "12. text" / "3) text" 去掉编号；标记后必须跟空格（或行尾），否则整行保留
fn strip_number(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    match rest.strip_prefix(&['.', ')'][..]) {
        Some("") => "",
        Some(body) if body.starts_with(' ') => body,
        _ => line,
    }
}

/// "- text" / "• text" 去掉列表符号；单独的符号视为空行
fn strip_bullet(line: &str, bullet: char) -> &str {
    let rest = &line[bullet.len_utf8()..];
    if rest.is_empty() {
        ""
    } else if rest.starts_with(' ') {
        rest
    } else {
        line
    }
}

fn lines_after_plan_marker(text: &str) -> Vec<String> {
    let mut in_plan = false;
    let mut steps = Vec::new();
    for line in text.lines() {
        if line.contains("Plan:") {
            in_plan = true;
            continue;
        }
        let line = line.trim();
        if in_plan && !line.is_empty() {
            steps.push(line.to_string());
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_and_bulleted_lines() {
        let text = "Here is my reasoning.\n\n1. Search for facts\n2) Summarize them\n- Review the summary\n• Deliver it\n";
        let plan = parse_plan(text);
        assert_eq!(
            plan.steps(),
            ["Search for facts", "Summarize them", "Review the summary", "Deliver it"]
        );
    }

    #[test]
    fn test_truncates_to_seven_in_order() {
        let text: String = (1..=10).map(|i| format!("{i}. step {i}\n")).collect();
        let plan = parse_plan(&text);
        assert_eq!(plan.len(), MAX_PLAN_STEPS);
        assert_eq!(plan.steps()[0], "step 1");
        assert_eq!(plan.steps()[6], "step 7");
    }

    #[test]
    fn test_marker_only_lines_discarded() {
        let plan = parse_plan("1.\n- \n•\n3)\n2. Real step");
        assert_eq!(plan.steps(), ["Real step"]);
    }

    #[test]
    fn test_decimal_and_negative_lines_kept_whole() {
        let plan = parse_plan("1.5 cups of flour are needed\n3.14 is pi\n-5 degrees outside\n---");
        assert_eq!(
            plan.steps(),
            ["1.5 cups of flour are needed", "3.14 is pi", "-5 degrees outside", "---"]
        );
    }

    #[test]
    fn test_only_first_marker_stripped() {
        let plan = parse_plan("1. - Mix 2. batches\n- - nested dash\n• • dot");
        assert_eq!(plan.steps(), ["- Mix 2. batches", "- nested dash", "• dot"]);
    }

    #[test]
    fn test_number_without_delimiter_kept_whole() {
        let plan = parse_plan("2024 was a busy year");
        assert_eq!(plan.steps(), ["2024 was a busy year"]);
    }

    #[test]
    fn test_plan_marker_fallback() {
        let text = "Thinking about it.\nPlan:\nGather requirements\n\nWrite the draft\n";
        let plan = parse_plan(text);
        assert_eq!(plan.steps(), ["Gather requirements", "Write the draft"]);
    }

    #[test]
    fn test_sentinel_when_nothing_recognised() {
        assert_eq!(parse_plan("Sure, I can help with that.").steps(), [FALLBACK_STEP]);
        assert_eq!(parse_plan("").steps(), [FALLBACK_STEP]);
    }

    #[test]
    fn test_numbered_rendering() {
        let plan = Plan::new(vec!["a".into(), "b".into()]);
        assert_eq!(plan.numbered(), "1. a\n2. b");
        assert_eq!(plan.joined(), "a\nb");
        assert!(!plan.is_empty());
    }
}
