//! Assessment report types.
//!
//! One report shape serves both modes: quick-mode reports leave the
//! non-structural sub-scores and the qualitative `details` empty, and carry
//! the mode tag so callers never have to sniff the shape.

use serde::{Deserialize, Serialize};

use crate::entities::SectionName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Importance {
    Critical,
    Important,
    Beneficial,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Critical   => "Critical",
            Importance::Important  => "Important",
            Importance::Beneficial => "Beneficial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentMode {
    Quick,
    #[default]
    Comprehensive,
}

impl std::str::FromStr for AssessmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick"         => Ok(AssessmentMode::Quick),
            "comprehensive" => Ok(AssessmentMode::Comprehensive),
            other           => Err(format!("unknown assessment mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingContentItem {
    pub category: String,
    pub topic: String,
    pub importance: Importance,
    pub description: String,
    pub suggestion: String,
    pub related_sections: Vec<SectionName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    /// Unweighted score, 0–100.
    pub raw: f64,
    pub weight: f64,
    /// `raw * weight`; contributes directly to the overall score.
    pub weighted: f64,
}

impl SubScore {
    pub fn new(raw: f64, weight: f64) -> Self {
        let raw = raw.clamp(0.0, 100.0);
        Self { raw, weight, weighted: raw * weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub structural: Option<SubScore>,
    pub content_quality: Option<SubScore>,
    pub citation_adequacy: Option<SubScore>,
    pub missing_content: Option<SubScore>,
    pub overall: f64,
}

impl ScoreBreakdown {
    /// Sum the present weighted sub-scores into `overall`.
    pub fn from_parts(
        structural: Option<SubScore>,
        content_quality: Option<SubScore>,
        citation_adequacy: Option<SubScore>,
        missing_content: Option<SubScore>,
    ) -> Self {
        let overall = [structural, content_quality, citation_adequacy, missing_content]
            .iter()
            .flatten()
            .map(|s| s.weighted)
            .sum::<f64>()
            .clamp(0.0, 100.0);
        Self { structural, content_quality, citation_adequacy, missing_content, overall }
    }

    pub fn weighted_sum(&self) -> f64 {
        [self.structural, self.content_quality, self.citation_adequacy, self.missing_content]
            .iter()
            .flatten()
            .map(|s| s.weighted)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub total_missing_items: usize,
    pub critical_items: usize,
    pub important_items: usize,
    pub beneficial_items: usize,
}

impl AssessmentSummary {
    pub fn from_items(items: &[MissingContentItem]) -> Self {
        let count = |tier: Importance| items.iter().filter(|i| i.importance == tier).count();
        Self {
            total_missing_items: items.len(),
            critical_items: count(Importance::Critical),
            important_items: count(Importance::Important),
            beneficial_items: count(Importance::Beneficial),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub section: SectionName,
    pub present: bool,
    pub char_count: usize,
    pub quality_score: f64,
    pub markers_found: Vec<String>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Comprehensive-mode derivations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualitativeAssessment {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub section_analyses: Vec<SectionAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub mode: AssessmentMode,
    pub paper_title: Option<String>,
    pub research_field: String,
    /// Sum of the weighted sub-scores present. Quick mode only carries the
    /// structural term, so its value tops out at `weights.structural * 100`
    /// (25 with default weights) rather than 100.
    pub overall_completeness_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub missing_content: Vec<MissingContentItem>,
    pub assessment_summary: AssessmentSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<QualitativeAssessment>,
}

impl AssessmentReport {
    pub fn critical_items(&self) -> impl Iterator<Item = &MissingContentItem> {
        self.missing_content
            .iter()
            .filter(|i| i.importance == Importance::Critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_is_sum_of_present_parts() {
        let b = ScoreBreakdown::from_parts(
            Some(SubScore::new(100.0, 0.25)),
            None,
            Some(SubScore::new(50.0, 0.15)),
            None,
        );
        assert!((b.overall - 32.5).abs() < 1e-9);
        assert!((b.weighted_sum() - b.overall).abs() < 1e-9);
    }

    #[test]
    fn test_sub_score_clamps_raw() {
        let s = SubScore::new(-20.0, 0.35);
        assert_eq!(s.raw, 0.0);
        assert_eq!(s.weighted, 0.0);
        assert_eq!(SubScore::new(140.0, 0.5).raw, 100.0);
    }

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("Quick".parse::<AssessmentMode>(), Ok(AssessmentMode::Quick));
        assert!("fast".parse::<AssessmentMode>().is_err());
    }

    #[test]
    fn test_summary_counts_tiers() {
        let item = |importance| MissingContentItem {
            category: "methodology".into(),
            topic: "t".into(),
            importance,
            description: String::new(),
            suggestion: String::new(),
            related_sections: vec![],
        };
        let items = vec![item(Importance::Critical), item(Importance::Beneficial), item(Importance::Critical)];
        let summary = AssessmentSummary::from_items(&items);
        assert_eq!(summary.total_missing_items, 3);
        assert_eq!(summary.critical_items, 2);
        assert_eq!(summary.important_items, 0);
        assert_eq!(summary.beneficial_items, 1);
    }
}
