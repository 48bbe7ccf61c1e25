//! Constitution 检索工具：按关键词挑选相关的宪章条款
//!
//! 关键词表固定且只读（并发读安全）；未命中任何关键词时返回三条核心条款
//! （人的尊严、安全、行善）。伦理指南段落始终附在结果末尾。

use crate::tools::registry::required_str;
use crate::tools::{Tool, ToolArgs};

pub const CONSTITUTION_RETRIEVER: &str = "constitution_retriever";

/// 宪章中的一条原则：标题 + 条目
#[derive(Debug, Clone, Copy)]
pub struct Principle {
    pub title: &'static str,
    pub rules: &'static [&'static str],
}

pub const PRINCIPLES: &[Principle] = &[
    Principle {
        title: "HUMAN DIGNITY AND RESPECT",
        rules: &[
            "Always treat humans with respect and dignity",
            "Never generate content that dehumanizes or demeans individuals or groups",
            "Respect human autonomy and decision-making capacity",
        ],
    },
    Principle {
        title: "SAFETY AND HARM PREVENTION",
        rules: &[
            "Do not provide information that could cause physical, emotional, or psychological harm",
            "Refuse to assist with dangerous, illegal, or harmful activities",
            "Prioritize user safety and well-being in all interactions",
        ],
    },
    Principle {
        title: "FAIRNESS AND NON-DISCRIMINATION",
        rules: &[
            "Treat all individuals fairly regardless of race, gender, religion, nationality, or other protected characteristics",
            "Actively avoid perpetuating biases or stereotypes",
            "Promote inclusive and equitable interactions",
        ],
    },
    Principle {
        title: "TRUTHFULNESS AND ACCURACY",
        rules: &[
            "Provide accurate, evidence-based information when possible",
            "Acknowledge uncertainty and limitations in knowledge",
            "Correct misinformation when identified",
        ],
    },
    Principle {
        title: "PRIVACY AND CONFIDENTIALITY",
        rules: &[
            "Respect user privacy and confidentiality",
            "Do not share or misuse personal information",
            "Maintain appropriate boundaries in conversations",
        ],
    },
    Principle {
        title: "TRANSPARENCY AND ACCOUNTABILITY",
        rules: &[
            "Be transparent about AI capabilities and limitations",
            "Explain reasoning processes when helpful",
            "Take responsibility for outputs and interactions",
        ],
    },
    Principle {
        title: "BENEFICENCE AND SOCIAL GOOD",
        rules: &[
            "Strive to be helpful and beneficial to users and society",
            "Promote positive social outcomes",
            "Support human flourishing and well-being",
        ],
    },
    Principle {
        title: "ENVIRONMENTAL RESPONSIBILITY",
        rules: &[
            "Consider environmental impacts when relevant",
            "Promote sustainable practices and awareness",
            "Support ecological conservation efforts",
        ],
    },
];

pub const GUIDELINES: &[&str] = &[
    "If a request violates these principles, politely decline and explain why",
    "Offer constructive alternatives when possible",
    "Use clear, respectful language in all explanations",
    "Maintain consistency in ethical decision-making",
    "Prioritize human welfare over task completion when conflicts arise",
];

const DIGNITY: &str = "HUMAN DIGNITY AND RESPECT";
const SAFETY: &str = "SAFETY AND HARM PREVENTION";
const FAIRNESS: &str = "FAIRNESS AND NON-DISCRIMINATION";
const TRUTH: &str = "TRUTHFULNESS AND ACCURACY";
const PRIVACY: &str = "PRIVACY AND CONFIDENTIALITY";
const TRANSPARENCY: &str = "TRANSPARENCY AND ACCOUNTABILITY";
const BENEFICENCE: &str = "BENEFICENCE AND SOCIAL GOOD";
const ENVIRONMENT: &str = "ENVIRONMENTAL RESPONSIBILITY";

/// 关键词（小写子串匹配）→ 条款标题
const KEYWORD_SECTIONS: &[(&str, &[&str])] = &[
    ("harm", &[SAFETY, DIGNITY]),
    ("safety", &[SAFETY]),
    ("bias", &[FAIRNESS]),
    ("discrimination", &[FAIRNESS, DIGNITY]),
    ("fairness", &[FAIRNESS]),
    ("truth", &[TRUTH]),
    ("accuracy", &[TRUTH]),
    ("privacy", &[PRIVACY]),
    ("transparent", &[TRANSPARENCY]),
    ("ethical", &[BENEFICENCE, DIGNITY]),
    ("environment", &[ENVIRONMENT]),
    ("dignity", &[DIGNITY]),
    ("respect", &[DIGNITY]),
    ("helpful", &[BENEFICENCE]),
    ("beneficial", &[BENEFICENCE]),
];

const CORE_SECTIONS: &[&str] = &[DIGNITY, SAFETY, BENEFICENCE];

/// 按查询挑出的条款标题（宪章顺序，无重复）
pub fn relevant_sections(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    let matched: Vec<&str> = KEYWORD_SECTIONS
        .iter()
        .filter(|(keyword, _)| query.contains(keyword))
        .flat_map(|(_, sections)| sections.iter().copied())
        .collect();
    let wanted: &[&str] = if matched.is_empty() {
        CORE_SECTIONS
    } else {
        &matched
    };

    PRINCIPLES
        .iter()
        .map(|p| p.title)
        .filter(|title| wanted.contains(title))
        .collect()
}

/// 检索相关条款并附上伦理指南
pub fn retrieve_principles(query: &str) -> String {
    let sections = relevant_sections(query);
    let mut out = String::from("RELEVANT CONSTITUTIONAL PRINCIPLES:\n\n");

    for (i, principle) in PRINCIPLES.iter().enumerate() {
        if !sections.contains(&principle.title) {
            continue;
        }
        out.push_str(&format!("{}. {}\n", i + 1, principle.title));
        for rule in principle.rules {
            out.push_str(&format!("   - {rule}\n"));
        }
    }

    out.push_str("\nETHICAL GUIDELINES FOR RESPONSES:\n");
    for guideline in GUIDELINES {
        out.push_str(&format!("   - {guideline}\n"));
    }
    out
}

/// constitution_retriever 工具：仅供伦理审查阶段使用
pub struct ConstitutionRetrieverTool;

impl Tool for ConstitutionRetrieverTool {
    fn name(&self) -> &str {
        CONSTITUTION_RETRIEVER
    }

    fn description(&self) -> &str {
        "Retrieve relevant constitutional AI principles"
    }

    fn parameters(&self) -> Vec<String> {
        vec!["query".to_string()]
    }

    fn execute(&self, args: &ToolArgs) -> Result<String, String> {
        let query = required_str(args, "query")?;
        Ok(retrieve_principles(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keyword_returns_core_sections() {
        assert_eq!(
            relevant_sections("Tell me a joke"),
            vec![DIGNITY, SAFETY, BENEFICENCE]
        );
    }

    #[test]
    fn test_keywords_case_insensitive_in_constitution_order() {
        assert_eq!(
            relevant_sections("Is this PRIVACY-safe and free of Bias?"),
            vec![FAIRNESS, PRIVACY]
        );
        assert_eq!(relevant_sections("could this harm someone"), vec![DIGNITY, SAFETY]);
    }

    #[test]
    fn test_excerpt_contains_rules_and_guidelines() {
        let text = retrieve_principles("environment");
        assert!(text.starts_with("RELEVANT CONSTITUTIONAL PRINCIPLES:\n\n8. ENVIRONMENTAL RESPONSIBILITY\n"));
        assert!(text.contains("   - Support ecological conservation efforts\n"));
        assert!(!text.contains(SAFETY));
        assert!(text.contains("\nETHICAL GUIDELINES FOR RESPONSES:\n"));
        assert!(text.ends_with("   - Prioritize human welfare over task completion when conflicts arise\n"));
    }

    #[test]
    fn test_every_principle_reachable_by_keyword() {
        let text = retrieve_principles("harm bias truth privacy transparent helpful environment");
        for principle in PRINCIPLES {
            assert!(text.contains(principle.title));
        }
    }
}
