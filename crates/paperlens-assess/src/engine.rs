//! Completeness assessment.
//!
//! overall = w_s·structural + w_q·content_quality + w_c·citation_adequacy + w_m·missing_content
//!
//! Quick mode computes only the structural term and the Critical-tier
//! missing-content items; comprehensive mode computes all four terms plus
//! strengths, weaknesses, recommendations and per-section analyses.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use paperlens_common::entities::{AnalysisRecord, SectionName};
use paperlens_common::error::{PaperlensError, Result};
use paperlens_common::report::{
    AssessmentMode, AssessmentReport, AssessmentSummary, Importance, MissingContentItem,
    QualitativeAssessment, ScoreBreakdown, SectionAnalysis, SubScore,
};

use crate::config::ScoringConfig;
use crate::field::infer_field;
use crate::quality::{analyse_section, is_present};
use crate::rules::RuleTable;

pub const EXTRACTION_FAILURE_TOPIC: &str = "Text extraction failure";

/// Immutable scoring engine. Cheap to clone; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Assessor {
    rules: Arc<RuleTable>,
    config: ScoringConfig,
}

impl Default for Assessor {
    fn default() -> Self {
        Self {
            rules: Arc::new(RuleTable::builtin()),
            config: ScoringConfig::default(),
        }
    }
}

impl Assessor {
    /// Build an engine, renormalising weights that do not sum to 1.
    pub fn new(rules: Arc<RuleTable>, config: ScoringConfig) -> Result<Self> {
        let mut config = config;
        if !config.weights.validate() {
            let original = config.weights;
            if !config.weights.normalise() {
                return Err(PaperlensError::Config(format!(
                    "score weights must be non-negative with a positive sum, got {:?}",
                    original.as_array()
                )));
            }
            warn!(
                original = ?original.as_array(),
                normalised = ?config.weights.as_array(),
                "score weights did not sum to 1.0; renormalised"
            );
        }
        Ok(Self { rules, config })
    }

    /// Build from configuration, loading `rules_path` when set.
    pub fn from_config(config: ScoringConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => {
                let table = RuleTable::from_path(path)?;
                info!(path = %path.display(), rules = table.len(), "loaded rule table");
                table
            }
            None => RuleTable::builtin(),
        };
        Self::new(Arc::new(rules), config)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn assess(&self, record: &AnalysisRecord, mode: AssessmentMode) -> AssessmentReport {
        let research_field = record
            .research_field
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| infer_field(record).to_string());

        if record.sections.is_empty() {
            return self.extraction_failure(record, research_field, mode);
        }

        let weights = &self.config.weights;
        let thresholds = &self.config.quality;
        let analyses: Vec<SectionAnalysis> = SectionName::ESSENTIAL
            .iter()
            .map(|&name| analyse_section(name, record.sections.get(name), thresholds))
            .collect();

        let present = analyses.iter().filter(|a| a.present).count();
        let structural = SubScore::new(
            present as f64 / SectionName::ESSENTIAL.len() as f64 * 100.0,
            weights.structural,
        );
        let items = self.missing_content(record, &research_field);

        let report = match mode {
            AssessmentMode::Quick => {
                let critical: Vec<MissingContentItem> = items
                    .into_iter()
                    .filter(|i| i.importance == Importance::Critical)
                    .collect();
                let breakdown = ScoreBreakdown::from_parts(Some(structural), None, None, None);
                self.report(record, research_field, mode, breakdown, critical, None)
            }
            AssessmentMode::Comprehensive => {
                let present_scores: Vec<f64> =
                    analyses.iter().filter(|a| a.present).map(|a| a.quality_score).collect();
                let quality_raw = if present_scores.is_empty() {
                    0.0
                } else {
                    present_scores.iter().sum::<f64>() / present_scores.len() as f64
                };
                let citation_raw = self.citation_adequacy(record.citations.len());
                let summary = AssessmentSummary::from_items(&items);
                let missing_raw = self.config.deductions.score(
                    summary.critical_items,
                    summary.important_items,
                    summary.beneficial_items,
                );
                let breakdown = ScoreBreakdown::from_parts(
                    Some(structural),
                    Some(SubScore::new(quality_raw, weights.content_quality)),
                    Some(SubScore::new(citation_raw, weights.citation_adequacy)),
                    Some(SubScore::new(missing_raw, weights.missing_content)),
                );
                let details = self.qualitative(record, analyses, &items);
                self.report(record, research_field, mode, breakdown, items, Some(details))
            }
        };

        info!(
            mode = ?report.mode,
            field = %report.research_field,
            overall = report.overall_completeness_score,
            missing = report.assessment_summary.total_missing_items,
            critical = report.assessment_summary.critical_items,
            "assessment complete"
        );
        report
    }

    fn report(
        &self,
        record: &AnalysisRecord,
        research_field: String,
        mode: AssessmentMode,
        score_breakdown: ScoreBreakdown,
        missing_content: Vec<MissingContentItem>,
        details: Option<QualitativeAssessment>,
    ) -> AssessmentReport {
        AssessmentReport {
            mode,
            paper_title: record.title.clone(),
            research_field,
            overall_completeness_score: score_breakdown.overall,
            score_breakdown,
            assessment_summary: AssessmentSummary::from_items(&missing_content),
            missing_content,
            details,
        }
    }

    /// `min(count / expected, 1) × 100`.
    pub fn citation_adequacy(&self, citations: usize) -> f64 {
        let expected = self.config.expected_citations;
        if expected == 0 {
            return 100.0;
        }
        (citations as f64 / expected as f64).min(1.0) * 100.0
    }

    /// Section-level items for absent essential sections, then one item per
    /// applicable rule whose section covers none of its phrases.
    fn missing_content(&self, record: &AnalysisRecord, research_field: &str) -> Vec<MissingContentItem> {
        let thresholds = &self.config.quality;
        let mut lowered: BTreeMap<SectionName, String> = BTreeMap::new();
        for (name, section) in &record.sections.sections {
            if is_present(Some(section), thresholds) {
                lowered.insert(*name, section.text.to_lowercase());
            }
        }

        let mut items = Vec::new();
        for name in SectionName::ESSENTIAL {
            if lowered.contains_key(&name) {
                continue;
            }
            let display = name.display_name();
            items.push(MissingContentItem {
                category: "Structure".to_string(),
                topic: format!("{display} section"),
                importance: match name {
                    SectionName::Discussion => Importance::Important,
                    _ => Importance::Critical,
                },
                description: format!("The paper has no recognisable {} section", display.to_lowercase()),
                suggestion: format!("Add a {display} section"),
                related_sections: vec![name],
            });
        }

        for rule in self.rules.for_field(research_field) {
            let text = lowered.get(&rule.section).map(String::as_str).unwrap_or("");
            if rule.is_covered_by(text) {
                continue;
            }
            debug!(section = rule.section.as_str(), topic = %rule.topic, "expected topic not covered");
            items.push(MissingContentItem {
                category: rule.category.clone(),
                topic: rule.topic.clone(),
                importance: rule.importance,
                description: rule.description.clone(),
                suggestion: rule.suggestion.clone(),
                related_sections: rule.related_sections.clone(),
            });
        }
        items
    }

    fn qualitative(
        &self,
        record: &AnalysisRecord,
        section_analyses: Vec<SectionAnalysis>,
        items: &[MissingContentItem],
    ) -> QualitativeAssessment {
        let cfg = &self.config;
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        if section_analyses.iter().all(|a| a.present) {
            strengths.push("All essential sections are present".to_string());
        }
        for a in &section_analyses {
            let display = a.section.display_name();
            if !a.present {
                weaknesses.push(format!("Missing {display} section"));
            } else if a.quality_score >= cfg.strength_threshold {
                strengths.push(format!("Well-developed {display} section ({:.0}/100)", a.quality_score));
            } else if a.quality_score < cfg.weakness_threshold {
                weaknesses.push(format!("Underdeveloped {display} section ({:.0}/100)", a.quality_score));
            }
        }

        let citations = record.citations.len();
        if citations >= cfg.expected_citations {
            strengths.push(format!("Well supported by citations ({citations} found)"));
        } else {
            weaknesses.push(format!(
                "Limited citation support ({citations} found, {} expected)",
                cfg.expected_citations
            ));
        }
        if !record.figures_tables.is_empty() {
            strengths.push(format!("Includes {} figures and tables", record.figures_tables.len()));
        }
        if !record.equations.is_empty() {
            strengths.push(format!("Presents formal content ({} equations)", record.equations.len()));
        }

        QualitativeAssessment {
            strengths,
            weaknesses,
            recommendations: recommendations(items, cfg.max_recommendations),
            section_analyses,
        }
    }

    fn extraction_failure(
        &self,
        record: &AnalysisRecord,
        research_field: String,
        mode: AssessmentMode,
    ) -> AssessmentReport {
        warn!("no usable section text; reporting extraction failure");
        let weights = &self.config.weights;
        let item = MissingContentItem {
            category: "Extraction".to_string(),
            topic: EXTRACTION_FAILURE_TOPIC.to_string(),
            importance: Importance::Critical,
            description: "No usable section text could be extracted from the document".to_string(),
            suggestion: "Check that the document contains selectable text, or run OCR before analysis"
                .to_string(),
            related_sections: Vec::new(),
        };
        let zero = |weight| Some(SubScore::new(0.0, weight));
        let (breakdown, details) = match mode {
            AssessmentMode::Quick => (ScoreBreakdown::from_parts(zero(weights.structural), None, None, None), None),
            AssessmentMode::Comprehensive => (
                ScoreBreakdown::from_parts(
                    zero(weights.structural),
                    zero(weights.content_quality),
                    zero(weights.citation_adequacy),
                    zero(weights.missing_content),
                ),
                Some(QualitativeAssessment {
                    weaknesses: vec!["No usable text could be extracted".to_string()],
                    recommendations: vec![item.suggestion.clone()],
                    ..Default::default()
                }),
            ),
        };
        self.report(record, research_field, mode, breakdown, vec![item], details)
    }
}

/// Suggestions ordered Critical → Important → Beneficial, deduplicated, capped.
pub fn recommendations(items: &[MissingContentItem], limit: usize) -> Vec<String> {
    let mut ordered: Vec<&MissingContentItem> = items.iter().collect();
    ordered.sort_by_key(|i| i.importance);
    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|i| seen.insert(i.suggestion.as_str()))
        .map(|i| i.suggestion.clone())
        .take(limit)
        .collect()
}
