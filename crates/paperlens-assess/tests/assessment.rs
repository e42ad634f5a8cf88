//! End-to-end checks: raw text → analysis record → assessment report.

use paperlens_assess::engine::EXTRACTION_FAILURE_TOPIC;
use paperlens_assess::{Assessor, RuleTable, ScoringConfig};
use paperlens_common::config::{AnalysisConfig, LimitsConfig};
use paperlens_common::document::RawDocument;
use paperlens_common::entities::{CitationKind, ContentType, SectionName};
use paperlens_common::error::PaperlensError;
use paperlens_common::report::{AssessmentMode, AssessmentReport, Importance};
use paperlens_ingestion::Analyzer;
use paperlens_test_utils::{assert_close, complete_paper, paper_without};
use pretty_assertions::assert_eq;

fn assess_text(text: &str, mode: AssessmentMode) -> AssessmentReport {
    let record = Analyzer::default()
        .analyze(&RawDocument::from_text(text), None)
        .unwrap();
    Assessor::default().assess(&record, mode)
}

#[test]
fn sub_scores_sum_to_overall() {
    for text in [complete_paper(), paper_without("Methodology"), "Just one line of text.".to_string()] {
        for mode in [AssessmentMode::Quick, AssessmentMode::Comprehensive] {
            let report = assess_text(&text, mode);
            let b = &report.score_breakdown;
            assert_close(b.weighted_sum(), report.overall_completeness_score);
            assert!((0.0..=100.0).contains(&report.overall_completeness_score));
        }
    }
}

#[test]
fn complete_paper_scores_well_and_misses_nothing() {
    let report = assess_text(&complete_paper(), AssessmentMode::Comprehensive);
    assert_eq!(report.research_field, "Computer Science");
    assert_eq!(report.paper_title.as_deref(), Some("Graph Neural Networks for Molecular Property Prediction"));
    assert!(report.missing_content.is_empty(), "{:?}", report.missing_content);
    let structural = report.score_breakdown.structural.unwrap();
    assert_eq!(structural.raw, 100.0);
    let details = report.details.unwrap();
    assert!(details.strengths.iter().any(|s| s == "All essential sections are present"));
    assert_eq!(details.section_analyses.len(), SectionName::ESSENTIAL.len());
}

#[test]
fn ordered_headings_split_sections_cleanly() {
    let text = "Abstract\nalpha text\nIntroduction\nbeta text\nMethodology\ngamma text\n\
                Results\ndelta text\nDiscussion\nepsilon text\nConclusion\nzeta text";
    let record = Analyzer::default().analyze(&RawDocument::from_text(text), None).unwrap();
    let expected = [
        (SectionName::Abstract, "alpha text"),
        (SectionName::Introduction, "beta text"),
        (SectionName::Methodology, "gamma text"),
        (SectionName::Results, "delta text"),
        (SectionName::Discussion, "epsilon text"),
        (SectionName::Conclusion, "zeta text"),
    ];
    for (name, body) in expected {
        assert_eq!(record.sections.text(name), body);
    }
}

#[test]
fn mixed_citation_families_in_position_order() {
    let text = "Smith (2023) showed X. Later work [1, 2] confirmed this.^3";
    let record = Analyzer::default().analyze(&RawDocument::from_text(text), None).unwrap();
    let kinds: Vec<CitationKind> = record.citations.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![CitationKind::AuthorYear, CitationKind::Numbered, CitationKind::Footnote]);
    assert_eq!(record.citations[0].authors, vec!["Smith".to_string()]);
    assert_eq!(record.citations[0].year.as_deref(), Some("2023"));
    assert_eq!(record.citations[1].reference_numbers, vec![1, 2]);
    assert!(record.citations.windows(2).all(|w| w[0].position <= w[1].position));
}

#[test]
fn caption_on_third_page() {
    let doc = RawDocument::from_pages(&[
        "First page text.",
        "Second page text.",
        "Figure 1: Experimental setup for trial A.",
    ]);
    let record = Analyzer::default().analyze(&doc, None).unwrap();
    assert_eq!(record.figures_tables.len(), 1);
    let entry = &record.figures_tables[0];
    assert_eq!(entry.label, "Figure 1");
    assert_eq!(entry.content_type, ContentType::Figure);
    assert_eq!(entry.page_number, 3);
    assert!(entry.caption.starts_with("Experimental setup"));
}

#[test]
fn quick_overall_is_on_structural_weight_scale() {
    let report = assess_text(&complete_paper(), AssessmentMode::Quick);
    let structural = report.score_breakdown.structural.unwrap();
    assert_eq!(structural.raw, 100.0);
    assert_close(
        report.overall_completeness_score,
        ScoringConfig::default().weights.structural * 100.0,
    );
    assert_close(report.overall_completeness_score, 25.0);
    assert!(report.score_breakdown.content_quality.is_none());
}

#[test]
fn missing_methodology_scores_strictly_lower() {
    let complete = assess_text(&complete_paper(), AssessmentMode::Comprehensive);
    let without = assess_text(&paper_without("Methodology"), AssessmentMode::Comprehensive);
    assert!(without.overall_completeness_score < complete.overall_completeness_score);
    assert!(without
        .missing_content
        .iter()
        .any(|i| i.topic == "Methodology section" && i.importance == Importance::Critical));
}

#[test]
fn identical_input_gives_identical_json() {
    let first = serde_json::to_string(&assess_text(&complete_paper(), AssessmentMode::Comprehensive)).unwrap();
    let second = serde_json::to_string(&assess_text(&complete_paper(), AssessmentMode::Comprehensive)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn quick_critical_items_are_subset_of_comprehensive() {
    for text in [complete_paper(), paper_without("Methodology"), paper_without("Results")] {
        let quick = assess_text(&text, AssessmentMode::Quick);
        let full = assess_text(&text, AssessmentMode::Comprehensive);
        let full_critical: Vec<_> = full.critical_items().collect();
        for item in quick.critical_items() {
            assert!(full_critical.contains(&item), "{} missing from comprehensive", item.topic);
        }
        assert!(quick.details.is_none());
    }
}

#[test]
fn empty_text_yields_single_extraction_failure() {
    for mode in [AssessmentMode::Quick, AssessmentMode::Comprehensive] {
        let report = assess_text("", mode);
        assert_eq!(report.overall_completeness_score, 0.0);
        assert_eq!(report.missing_content.len(), 1);
        assert_eq!(report.missing_content[0].topic, EXTRACTION_FAILURE_TOPIC);
        assert_eq!(report.missing_content[0].importance, Importance::Critical);
    }
}

#[test]
fn oversize_input_is_rejected_before_analysis() {
    let config = AnalysisConfig {
        limits: LimitsConfig { max_document_chars: 100 },
        ..Default::default()
    };
    let err = Analyzer::new(&config)
        .analyze(&RawDocument::from_text(complete_paper()), None)
        .unwrap_err();
    assert!(matches!(err, PaperlensError::InputTooLarge { limit: 100, .. }));
}

#[test]
fn custom_rule_table_replaces_builtin() {
    let rules = RuleTable::from_toml_str(
        r#"
        [[rules]]
        section = "results"
        category = "Results"
        topic = "Cost analysis"
        importance = "Important"
        phrases = ["cost", "dollars"]
        description = "No cost analysis"
        suggestion = "Report what the method costs to run"
        "#,
    )
    .unwrap();
    let assessor = Assessor::new(std::sync::Arc::new(rules), ScoringConfig::default()).unwrap();
    let record = Analyzer::default()
        .analyze(&RawDocument::from_text(complete_paper()), None)
        .unwrap();
    let report = assessor.assess(&record, AssessmentMode::Comprehensive);
    let topics: Vec<&str> = report.missing_content.iter().map(|i| i.topic.as_str()).collect();
    assert_eq!(topics, vec!["Cost analysis"]);
}
