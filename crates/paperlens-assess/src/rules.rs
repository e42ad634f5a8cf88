//! Expected-topic rule table.
//!
//! Each rule names a section, a topic the section is expected to cover, and
//! the phrases whose presence (case-insensitive substring) counts as
//! coverage. Rules without a field apply to every paper; the rest apply only
//! when the paper's research field matches. The table is loaded once and
//! shared read-only.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use paperlens_common::entities::SectionName;
use paperlens_common::error::{PaperlensError, Result};
use paperlens_common::report::Importance;

use crate::field::same_field;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRule {
    /// Research field this rule is specific to; `None` applies everywhere.
    #[serde(default)]
    pub field: Option<String>,
    pub section: SectionName,
    pub category: String,
    pub topic: String,
    pub importance: Importance,
    pub phrases: Vec<String>,
    pub description: String,
    pub suggestion: String,
    #[serde(default)]
    pub related_sections: Vec<SectionName>,
}

impl TopicRule {
    pub fn applies_to(&self, research_field: &str) -> bool {
        self.field.as_deref().map_or(true, |f| same_field(f, research_field))
    }

    /// `lower_text` must already be lowercased.
    pub fn is_covered_by(&self, lower_text: &str) -> bool {
        self.phrases.iter().any(|p| lower_text.contains(p.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<TopicRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<TopicRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleTable {
    pub fn new(rules: Vec<TopicRule>) -> Result<Self> {
        let mut rules = rules;
        for rule in &mut rules {
            rule.phrases = rule
                .phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect();
            if rule.phrases.is_empty() {
                return Err(PaperlensError::Config(format!(
                    "rule '{}' for section '{}' has no phrases",
                    rule.topic,
                    rule.section.as_str()
                )));
            }
            if rule.related_sections.is_empty() {
                rule.related_sections.push(rule.section);
            }
        }
        Ok(Self { rules })
    }

    /// Parse a `[[rules]]` TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: RuleFile =
            toml::from_str(source).map_err(|e| PaperlensError::Config(format!("rule table: {e}")))?;
        let table = Self::new(file.rules)?;
        debug!(rules = table.rules.len(), "rule table parsed");
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            PaperlensError::Config(format!("cannot read rule table {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    pub fn builtin() -> Self {
        let rules = BUILTIN
            .iter()
            .map(|b| TopicRule {
                field: b.field.map(str::to_string),
                section: b.section,
                category: b.category.to_string(),
                topic: b.topic.to_string(),
                importance: b.importance,
                phrases: b.phrases.iter().map(|p| p.to_string()).collect(),
                description: b.description.to_string(),
                suggestion: b.suggestion.to_string(),
                related_sections: b.related.to_vec(),
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[TopicRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules that apply to `research_field`, in table order.
    pub fn for_field<'a>(&'a self, research_field: &'a str) -> impl Iterator<Item = &'a TopicRule> + 'a {
        self.rules.iter().filter(move |r| r.applies_to(research_field))
    }
}

// ── Built-in table ───────────────────────────────────────────────────────────

struct BuiltinRule {
    field: Option<&'static str>,
    section: SectionName,
    category: &'static str,
    topic: &'static str,
    importance: Importance,
    phrases: &'static [&'static str],
    description: &'static str,
    suggestion: &'static str,
    related: &'static [SectionName],
}

use Importance::{Beneficial, Critical, Important};
use SectionName::{Abstract, Conclusion, Discussion, Introduction, Methodology, Results};

const BUILTIN: &[BuiltinRule] = &[
    // general
    BuiltinRule {
        field: None,
        section: Abstract,
        category: "Abstract",
        topic: "Research objective",
        importance: Important,
        phrases: &["objective", "aim", "we propose", "this paper", "this study", "purpose", "we present"],
        description: "The abstract does not state the research objective",
        suggestion: "Open the abstract with a sentence stating what the paper sets out to do",
        related: &[Abstract, Introduction],
    },
    BuiltinRule {
        field: None,
        section: Abstract,
        category: "Abstract",
        topic: "Key findings",
        importance: Important,
        phrases: &["results show", "we find", "we show", "demonstrate", "findings", "we found"],
        description: "The abstract does not summarise the main findings",
        suggestion: "Add one or two sentences reporting the key results in the abstract",
        related: &[Abstract, Results],
    },
    BuiltinRule {
        field: None,
        section: Introduction,
        category: "Introduction",
        topic: "Problem statement",
        importance: Critical,
        phrases: &["problem", "challenge", "gap", "limitation", "question"],
        description: "The introduction does not state the problem being addressed",
        suggestion: "State the research problem or gap explicitly in the introduction",
        related: &[Introduction],
    },
    BuiltinRule {
        field: None,
        section: Introduction,
        category: "Introduction",
        topic: "Contributions",
        importance: Important,
        phrases: &["contribution", "we propose", "this paper", "our work", "we present", "we introduce"],
        description: "The introduction does not list the paper's contributions",
        suggestion: "Summarise the contributions of the paper at the end of the introduction",
        related: &[Introduction, Conclusion],
    },
    BuiltinRule {
        field: None,
        section: Introduction,
        category: "Introduction",
        topic: "Motivation",
        importance: Beneficial,
        phrases: &["motivat", "important", "need for", "crucial", "essential"],
        description: "The introduction does not explain why the problem matters",
        suggestion: "Explain the practical or scientific motivation for the work",
        related: &[Introduction],
    },
    BuiltinRule {
        field: None,
        section: Methodology,
        category: "Methodology",
        topic: "Data description",
        importance: Critical,
        phrases: &["dataset", "data", "sample", "participants", "corpus", "subjects"],
        description: "The methodology does not describe the data or sample used",
        suggestion: "Describe the data sources, sample size and how the data were collected",
        related: &[Methodology],
    },
    BuiltinRule {
        field: None,
        section: Methodology,
        category: "Methodology",
        topic: "Procedure",
        importance: Important,
        phrases: &["procedure", "algorithm", "we train", "protocol", "implementation", "step", "pipeline"],
        description: "The methodology does not describe the procedure followed",
        suggestion: "Describe the procedure step by step so that it can be reproduced",
        related: &[Methodology],
    },
    BuiltinRule {
        field: None,
        section: Methodology,
        category: "Methodology",
        topic: "Evaluation metrics",
        importance: Important,
        phrases: &["metric", "accuracy", "precision", "recall", "f1", "error", "measure"],
        description: "The methodology does not say how results are measured",
        suggestion: "Name the evaluation metrics and justify their choice",
        related: &[Methodology, Results],
    },
    BuiltinRule {
        field: None,
        section: Results,
        category: "Results",
        topic: "Quantitative results",
        importance: Critical,
        phrases: &["%", "accuracy", "outperform", "improve", "significant", "increase", "decrease"],
        description: "The results section reports no quantitative outcomes",
        suggestion: "Report the main outcomes with concrete numbers",
        related: &[Results],
    },
    BuiltinRule {
        field: None,
        section: Results,
        category: "Results",
        topic: "Baseline comparison",
        importance: Important,
        phrases: &["baseline", "compared", "comparison", "state-of-the-art", "state of the art", "prior work"],
        description: "The results are not compared against baselines or prior work",
        suggestion: "Compare the results with established baselines or previous studies",
        related: &[Results, Discussion],
    },
    BuiltinRule {
        field: None,
        section: Results,
        category: "Results",
        topic: "Statistical significance",
        importance: Beneficial,
        phrases: &["p <", "p<", "p =", "significan", "confidence interval", "standard deviation", "variance"],
        description: "The results give no measure of statistical significance or variance",
        suggestion: "Report significance tests, confidence intervals or standard deviations",
        related: &[Results],
    },
    BuiltinRule {
        field: None,
        section: Discussion,
        category: "Discussion",
        topic: "Interpretation",
        importance: Important,
        phrases: &["suggest", "indicate", "interpret", "implication", "explain"],
        description: "The discussion does not interpret the results",
        suggestion: "Explain what the results mean and how they answer the research question",
        related: &[Discussion, Results],
    },
    BuiltinRule {
        field: None,
        section: Discussion,
        category: "Discussion",
        topic: "Limitations",
        importance: Important,
        phrases: &["limitation", "limited", "drawback", "weakness", "threats to validity", "caveat"],
        description: "The discussion does not acknowledge limitations",
        suggestion: "Add a paragraph on the limitations of the study and their impact",
        related: &[Discussion],
    },
    BuiltinRule {
        field: None,
        section: Conclusion,
        category: "Conclusion",
        topic: "Summary of contributions",
        importance: Important,
        phrases: &["in summary", "we presented", "we proposed", "we have shown", "this paper", "we introduced", "in conclusion"],
        description: "The conclusion does not summarise what the paper achieved",
        suggestion: "Restate the main contributions and findings in the conclusion",
        related: &[Conclusion],
    },
    BuiltinRule {
        field: None,
        section: Conclusion,
        category: "Conclusion",
        topic: "Future work",
        importance: Beneficial,
        phrases: &["future work", "future research", "future direction", "further research", "further work", "next step"],
        description: "The conclusion does not outline future work",
        suggestion: "Outline open questions and directions for future work",
        related: &[Conclusion],
    },
    // Computer Science
    BuiltinRule {
        field: Some("Computer Science"),
        section: Methodology,
        category: "Reproducibility",
        topic: "Reproducibility details",
        importance: Beneficial,
        phrases: &["hyperparameter", "source code", "code is available", "implementation details", "github", "random seed"],
        description: "The methodology gives no reproducibility details",
        suggestion: "List hyperparameters, hardware and where the code can be obtained",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Computer Science"),
        section: Results,
        category: "Results",
        topic: "Ablation study",
        importance: Beneficial,
        phrases: &["ablation", "removing", "without the"],
        description: "The results include no ablation of the proposed components",
        suggestion: "Add an ablation study showing the contribution of each component",
        related: &[Results],
    },
    // Medicine
    BuiltinRule {
        field: Some("Medicine"),
        section: Methodology,
        category: "Ethics",
        topic: "Ethics approval",
        importance: Critical,
        phrases: &["ethics", "ethical", "irb", "institutional review board", "informed consent"],
        description: "The methodology does not mention ethics approval or consent",
        suggestion: "State the ethics committee approval and how informed consent was obtained",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Medicine"),
        section: Methodology,
        category: "Methodology",
        topic: "Study population",
        importance: Critical,
        phrases: &["participants", "patients", "cohort", "inclusion criteria", "exclusion criteria"],
        description: "The methodology does not define the study population",
        suggestion: "Describe the study population with inclusion and exclusion criteria",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Medicine"),
        section: Results,
        category: "Results",
        topic: "Statistical analysis",
        importance: Important,
        phrases: &["p <", "p<", "confidence interval", "odds ratio", "hazard ratio", "relative risk"],
        description: "The results lack the statistical analysis expected in clinical studies",
        suggestion: "Report effect sizes with confidence intervals and p-values",
        related: &[Results],
    },
    // Biology
    BuiltinRule {
        field: Some("Biology"),
        section: Methodology,
        category: "Methodology",
        topic: "Organisms and materials",
        importance: Important,
        phrases: &["species", "strain", "cell line", "organism", "specimen", "reagent"],
        description: "The methodology does not identify the organisms or materials used",
        suggestion: "Identify species, strains, cell lines and reagents with their sources",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Biology"),
        section: Methodology,
        category: "Methodology",
        topic: "Replication",
        importance: Important,
        phrases: &["replicate", "replicates", "n =", "independent experiments", "triplicate"],
        description: "The methodology does not state how experiments were replicated",
        suggestion: "State the number of biological and technical replicates",
        related: &[Methodology, Results],
    },
    // Physics
    BuiltinRule {
        field: Some("Physics"),
        section: Methodology,
        category: "Methodology",
        topic: "Apparatus or theoretical framework",
        importance: Important,
        phrases: &["apparatus", "detector", "hamiltonian", "simulation", "theoretical framework", "setup"],
        description: "The methodology does not describe the apparatus or theoretical framework",
        suggestion: "Describe the experimental apparatus or the theoretical model in detail",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Physics"),
        section: Results,
        category: "Results",
        topic: "Uncertainty",
        importance: Important,
        phrases: &["uncertainty", "error bar", "systematic error", "±", "+/-"],
        description: "The results do not quantify measurement uncertainty",
        suggestion: "Report statistical and systematic uncertainties for each measurement",
        related: &[Results],
    },
    // Mathematics
    BuiltinRule {
        field: Some("Mathematics"),
        section: Methodology,
        category: "Methodology",
        topic: "Definitions",
        importance: Important,
        phrases: &["definition", "we define", "let ", "denote"],
        description: "The paper does not define its objects and notation",
        suggestion: "Introduce definitions and notation before they are used",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Mathematics"),
        section: Results,
        category: "Results",
        topic: "Proofs",
        importance: Critical,
        phrases: &["proof", "theorem", "lemma", "q.e.d", "corollary"],
        description: "The results state no theorems or proofs",
        suggestion: "State the main results as theorems and give complete proofs",
        related: &[Results],
    },
    // Engineering
    BuiltinRule {
        field: Some("Engineering"),
        section: Methodology,
        category: "Methodology",
        topic: "Design specification",
        importance: Important,
        phrases: &["design", "specification", "requirement", "prototype"],
        description: "The methodology does not give the design specification",
        suggestion: "Describe the design requirements and the specification that meets them",
        related: &[Methodology],
    },
    BuiltinRule {
        field: Some("Engineering"),
        section: Results,
        category: "Results",
        topic: "Performance evaluation",
        importance: Important,
        phrases: &["performance", "efficiency", "throughput", "latency", "tolerance"],
        description: "The results do not evaluate performance against the specification",
        suggestion: "Evaluate performance against the stated requirements",
        related: &[Results],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_rules_are_well_formed() {
        let table = RuleTable::builtin();
        assert!(!table.is_empty());
        for rule in table.rules() {
            assert!(!rule.phrases.is_empty(), "{} has no phrases", rule.topic);
            assert!(rule.phrases.iter().all(|p| *p == p.to_lowercase()));
            assert!(!rule.related_sections.is_empty());
        }
    }

    #[test]
    fn test_field_rules_only_apply_to_their_field() {
        let table = RuleTable::builtin();
        let general = table.rules().iter().filter(|r| r.field.is_none()).count();
        assert!(table.for_field("Medicine").any(|r| r.topic == "Ethics approval"));
        assert!(!table.for_field("Physics").any(|r| r.topic == "Ethics approval"));
        assert_eq!(table.for_field("Astrology").count(), general);
        assert!(table.for_field("ML").any(|r| r.topic == "Ablation study"));
    }

    #[test]
    fn test_coverage_is_substring_match() {
        let table = RuleTable::builtin();
        let rule = table.rules().iter().find(|r| r.topic == "Future work").unwrap();
        assert!(rule.is_covered_by("we leave this to future work."));
        assert!(!rule.is_covered_by("we are done."));
    }

    #[test]
    fn test_toml_rules_are_normalised() {
        let table = RuleTable::from_toml_str(
            r#"
            [[rules]]
            section = "methodology"
            category = "Methodology"
            topic = "Sampling"
            importance = "Critical"
            phrases = ["  Random Sample ", ""]
            description = "No sampling strategy"
            suggestion = "Describe the sampling strategy"
            "#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        let rule = &table.rules()[0];
        assert_eq!(rule.phrases, vec!["random sample".to_string()]);
        assert_eq!(rule.related_sections, vec![SectionName::Methodology]);
        assert_eq!(rule.importance, Importance::Critical);
        assert!(rule.field.is_none());
    }

    #[test]
    fn test_rule_without_phrases_is_rejected() {
        let err = RuleTable::from_toml_str(
            r#"
            [[rules]]
            section = "results"
            category = "Results"
            topic = "Empty"
            importance = "Beneficial"
            phrases = []
            description = "d"
            suggestion = "s"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PaperlensError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = RuleTable::from_toml_str("[[rules]]\nsection = 3").unwrap_err();
        assert!(matches!(err, PaperlensError::Config(_)));
    }
}
