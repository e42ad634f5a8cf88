//! Per-section quality heuristics.
//!
//! A section scores up to 60 points for length (tiered) and up to 40 for
//! section-specific markers, i.e. phrases a well-formed section of that kind
//! usually contains.

use paperlens_common::entities::{Section, SectionName};
use paperlens_common::report::SectionAnalysis;

use crate::config::QualityThresholds;

const LENGTH_POINTS: f64 = 60.0;
const MARKER_POINTS: f64 = 40.0;

pub fn section_markers(name: SectionName) -> &'static [&'static str] {
    match name {
        SectionName::Abstract     => &["objective", "propose", "method", "result", "show", "conclu"],
        SectionName::Introduction => &["problem", "motivat", "contribution", "background", "challenge", "gap", "prior work"],
        SectionName::Methodology  => &["dataset", "data", "procedure", "algorithm", "participants", "experiment", "parameter", "model"],
        SectionName::Results      => &["table", "figure", "%", "accuracy", "significan", "outperform", "compared"],
        SectionName::Discussion   => &["limitation", "implication", "suggest", "compared", "future", "interpret"],
        SectionName::Conclusion   => &["in summary", "contribution", "future", "we presented", "conclude", "findings"],
        SectionName::MainBody     => &[],
    }
}

/// A section counts as present once it carries enough text to assess.
pub fn is_present(section: Option<&Section>, thresholds: &QualityThresholds) -> bool {
    section.is_some_and(|s| s.char_len() >= thresholds.present_min_chars)
}

pub fn length_points(chars: usize, thresholds: &QualityThresholds) -> f64 {
    let fraction = if chars > thresholds.substantial_chars {
        1.0
    } else if chars > thresholds.adequate_chars {
        0.7
    } else if chars > thresholds.short_chars {
        0.4
    } else {
        0.2
    };
    LENGTH_POINTS * fraction
}

pub fn marker_points(found: usize, thresholds: &QualityThresholds) -> f64 {
    if thresholds.marker_target == 0 {
        return MARKER_POINTS;
    }
    MARKER_POINTS * found.min(thresholds.marker_target) as f64 / thresholds.marker_target as f64
}

pub fn analyse_section(
    name: SectionName,
    section: Option<&Section>,
    thresholds: &QualityThresholds,
) -> SectionAnalysis {
    let char_count = section.map(Section::char_len).unwrap_or(0);
    let display = name.display_name();

    if !is_present(section, thresholds) {
        let issue = match section {
            Some(_) => format!("Section is too short to assess ({char_count} characters)"),
            None => "Section not found".to_string(),
        };
        return SectionAnalysis {
            section: name,
            present: false,
            char_count,
            quality_score: 0.0,
            markers_found: Vec::new(),
            issues: vec![issue],
            suggestions: vec![format!("Add a {display} section")],
        };
    }

    let lower = section.map(|s| s.text.to_lowercase()).unwrap_or_default();
    let markers = section_markers(name);
    let (found, missing): (Vec<&str>, Vec<&str>) = markers.iter().partition(|m| lower.contains(**m));

    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    if char_count <= thresholds.adequate_chars {
        issues.push(format!("Section is brief ({char_count} characters)"));
        suggestions.push(format!("Expand the {display} section with more detail"));
    }
    if found.len() < thresholds.marker_target && !missing.is_empty() {
        issues.push(format!(
            "Only {} of {} expected elements found",
            found.len(),
            thresholds.marker_target
        ));
        let hint: Vec<&str> = missing.iter().take(3).copied().collect();
        suggestions.push(format!("Consider covering: {}", hint.join(", ")));
    }

    SectionAnalysis {
        section: name,
        present: true,
        char_count,
        quality_score: length_points(char_count, thresholds) + marker_points(found.len(), thresholds),
        markers_found: found.into_iter().map(str::to_string).collect(),
        issues,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(name: SectionName, text: &str) -> Section {
        Section {
            name,
            heading: None,
            text: text.to_string(),
            start: 0,
            end: text.chars().count(),
        }
    }

    #[test]
    fn test_length_tiers() {
        let q = QualityThresholds::default();
        assert_eq!(length_points(600, &q), 60.0);
        assert_eq!(length_points(300, &q), 42.0);
        assert_eq!(length_points(150, &q), 24.0);
        assert_eq!(length_points(60, &q), 12.0);
    }

    #[test]
    fn test_rich_section_scores_full_marks() {
        let text = format!("We describe the dataset and the procedure. {}", "Details follow. ".repeat(40));
        let s = section(SectionName::Methodology, &text);
        let a = analyse_section(SectionName::Methodology, Some(&s), &QualityThresholds::default());
        assert!(a.present);
        assert_eq!(a.quality_score, 100.0);
        assert!(a.markers_found.contains(&"dataset".to_string()));
        assert!(a.issues.is_empty());
    }

    #[test]
    fn test_short_section_is_absent() {
        let s = section(SectionName::Results, "It worked.");
        let a = analyse_section(SectionName::Results, Some(&s), &QualityThresholds::default());
        assert!(!a.present);
        assert_eq!(a.quality_score, 0.0);
        assert_eq!(a.suggestions, vec!["Add a Results section".to_string()]);
    }

    #[test]
    fn test_brief_section_without_markers_is_flagged() {
        let s = section(SectionName::Discussion, "We talk about the numbers at some length in this paragraph here.");
        let a = analyse_section(SectionName::Discussion, Some(&s), &QualityThresholds::default());
        assert!(a.present);
        assert_eq!(a.quality_score, 12.0);
        assert_eq!(a.issues.len(), 2);
    }

    #[test]
    fn test_missing_section_analysis() {
        let a = analyse_section(SectionName::Abstract, None, &QualityThresholds::default());
        assert!(!a.present);
        assert_eq!(a.issues, vec!["Section not found".to_string()]);
    }
}
