//! 伦理审查结论解析
//!
//! 识别 `Status:`、`Reasoning:`、含 "Concerns" 与 `:` 的行、含 "Suggestions" 与 `:` 的行、
//! `Final recommendation:`。没有可识别的状态时默认 needs_revision（失败即关闭）。
//! concerns / suggestions 只收以 `-` `•` `*` 开头的条目，普通续行忽略。

use serde::Serialize;

/// reasoning 为空时的兜底说明
pub const DEFAULT_REASONING: &str = "Content reviewed against constitutional principles.";

/// 审查状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EthicsStatus {
    Approved,
    NeedsRevision,
    Rejected,
    Error,
}

impl EthicsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EthicsStatus::Approved => "approved",
            EthicsStatus::NeedsRevision => "needs_revision",
            EthicsStatus::Rejected => "rejected",
            EthicsStatus::Error => "error",
        }
    }

    /// Status 行的取值：大写后按子串匹配，REJECTED 优先
    fn from_status_text(text: &str) -> Self {
        let upper = text.to_uppercase();
        if upper.contains("REJECTED") {
            EthicsStatus::Rejected
        } else if upper.contains("APPROVED") {
            EthicsStatus::Approved
        } else {
            EthicsStatus::NeedsRevision
        }
    }
}

impl std::fmt::Display for EthicsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审查结论；approved 由 status 推出，二者不会不一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthicsVerdict {
    status: EthicsStatus,
    pub reasoning: String,
    pub concerns: Vec<String>,
    pub suggestions: Vec<String>,
}

impl EthicsVerdict {
    pub fn new(status: EthicsStatus, reasoning: impl Into<String>) -> Self {
        Self {
            status,
            reasoning: reasoning.into(),
            concerns: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// 审查本身失败：status=error，绝不当作通过
    pub fn error(detail: &str) -> Self {
        Self {
            status: EthicsStatus::Error,
            reasoning: format!("Error during ethical review: {detail}"),
            concerns: vec!["Technical error during review".to_string()],
            suggestions: vec!["Please try again with a different approach".to_string()],
        }
    }

    pub fn status(&self) -> EthicsStatus {
        self.status
    }

    pub fn approved(&self) -> bool {
        self.status == EthicsStatus::Approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Reasoning,
    Concerns,
    Suggestions,
    Recommendation,
}

fn bullet_item(line: &str) -> Option<String> {
    if !line.starts_with(&['-', '•', '*'][..]) {
        return None;
    }
    let item = line.trim_start_matches(&['-', '•', '*', ' '][..]);
    (!item.is_empty()).then(|| item.to_string())
}

/// 解析审查输出
pub fn parse_ethics_review(text: &str) -> EthicsVerdict {
    let mut verdict = EthicsVerdict::new(EthicsStatus::NeedsRevision, "");
    let mut section = Section::None;

    for line in text.lines() {
        let line = line.trim();

        if let Some((_, value)) = line.split_once("Status:") {
            verdict.status = EthicsStatus::from_status_text(value.trim());
        } else if let Some((_, value)) = line.split_once("Reasoning:") {
            section = Section::Reasoning;
            let value = value.trim();
            if !value.is_empty() {
                verdict.reasoning = value.to_string();
            }
        } else if line.contains("Concerns") && line.contains(':') {
            section = Section::Concerns;
        } else if line.contains("Suggestions") && line.contains(':') {
            section = Section::Suggestions;
        } else if line.contains("Final recommendation:") {
            section = Section::Recommendation;
        } else if !line.is_empty() {
            match section {
                Section::Reasoning => {
                    if !verdict.reasoning.is_empty() {
                        verdict.reasoning.push(' ');
                    }
                    verdict.reasoning.push_str(line);
                }
                Section::Concerns => verdict.concerns.extend(bullet_item(line)),
                Section::Suggestions => verdict.suggestions.extend(bullet_item(line)),
                Section::Recommendation | Section::None => {}
            }
        }
    }

    if verdict.reasoning.is_empty() {
        tracing::debug!("ethics review had no reasoning, using default");
        verdict.reasoning = DEFAULT_REASONING.to_string();
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "ETHICAL REVIEW ASSESSMENT:\n\n\
        Status: NEEDS_REVISION\n\n\
        Reasoning:\nThe plan mostly respects the principles\nbut touches on privacy.\n\n\
        Concerns (if any):\n- Collects personal data\n* Stores it indefinitely\nThis line is prose.\n\n\
        Suggestions for improvement (if applicable):\n• Anonymise the data\n- \n\n\
        Final recommendation:\nRevise and resubmit.";

    #[test]
    fn test_full_review() {
        let v = parse_ethics_review(FULL);
        assert_eq!(v.status(), EthicsStatus::NeedsRevision);
        assert!(!v.approved());
        assert_eq!(
            v.reasoning,
            "The plan mostly respects the principles but touches on privacy."
        );
        assert_eq!(v.concerns, vec!["Collects personal data", "Stores it indefinitely"]);
        assert_eq!(v.suggestions, vec!["Anonymise the data"]);
    }

    #[test]
    fn test_approved() {
        let v = parse_ethics_review("Status: Approved\nReasoning: Harmless joke.");
        assert_eq!(v.status(), EthicsStatus::Approved);
        assert!(v.approved());
        assert_eq!(v.reasoning, "Harmless joke.");
    }

    #[test]
    fn test_rejected_anywhere_on_status_line_wins() {
        let v = parse_ethics_review("Status: [APPROVED/NEEDS_REVISION/rejected]");
        assert_eq!(v.status(), EthicsStatus::Rejected);
        assert!(!v.approved());

        let v = parse_ethics_review("**Status:** Rejected - dangerous");
        assert_eq!(v.status(), EthicsStatus::Rejected);
    }

    #[test]
    fn test_missing_status_is_needs_revision() {
        let v = parse_ethics_review("Looks fine to me!");
        assert_eq!(v.status(), EthicsStatus::NeedsRevision);
        assert!(!v.approved());
        assert_eq!(v.reasoning, DEFAULT_REASONING);
    }

    #[test]
    fn test_unknown_status_value() {
        let v = parse_ethics_review("Status: maybe");
        assert_eq!(v.status(), EthicsStatus::NeedsRevision);
    }

    #[test]
    fn test_error_verdict_never_approved() {
        let v = EthicsVerdict::error("connection reset");
        assert_eq!(v.status(), EthicsStatus::Error);
        assert!(!v.approved());
        assert_eq!(v.concerns, vec!["Technical error during review"]);
        assert_eq!(v.status().to_string(), "error");
    }
}
