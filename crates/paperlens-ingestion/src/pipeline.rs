//! Analysis pipeline.
//!
//! One call per document:
//!   1. Reject documents above the configured size guard
//!   2. Segment into canonical sections and pick a title
//!   3. Parse the reference list found by the segmenter
//!   4. Run the four scanners (citations, figures/tables, math, keywords)
//!      in parallel; none of them sees another's output
//!   5. Attach each equation's enclosing heading as its topic
//!   6. Merge everything into one `AnalysisRecord`
//!
//! Compiled catalogues live in `Arc`s, so an `Analyzer` is cheap to clone
//! and safe to share across threads.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use paperlens_common::config::AnalysisConfig;
use paperlens_common::document::RawDocument;
use paperlens_common::entities::{AnalysisRecord, Diagnostic, DocumentStats};
use paperlens_common::error::{PaperlensError, Result};

use crate::citations::CitationExtractor;
use crate::figures::FigureLocator;
use crate::keywords::KeywordExtractor;
use crate::math::MathDetector;
use crate::references::Bibliography;
use crate::segmenter::{heading_before, SectionSegmenter};
use crate::title::extract_title;

#[derive(Clone)]
pub struct Analyzer {
    max_document_chars: usize,
    segmenter: Arc<SectionSegmenter>,
    citations: Arc<CitationExtractor>,
    figures: Arc<FigureLocator>,
    math: Arc<MathDetector>,
    keywords: Arc<KeywordExtractor>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_document_chars: config.limits.max_document_chars,
            segmenter: Arc::new(SectionSegmenter::default()),
            citations: Arc::new(CitationExtractor::new(&config.extraction)),
            figures: Arc::new(FigureLocator::new(&config.extraction)),
            math: Arc::new(MathDetector::default()),
            keywords: Arc::new(KeywordExtractor::new(&config.extraction)),
        }
    }

    /// Size guard, applied before any scanning.
    pub fn check_size(&self, doc: &RawDocument) -> Result<()> {
        if doc.char_count() > self.max_document_chars {
            warn!(
                chars = doc.char_count(),
                limit = self.max_document_chars,
                "document rejected by size guard"
            );
            return Err(PaperlensError::InputTooLarge {
                chars: doc.char_count(),
                limit: self.max_document_chars,
            });
        }
        Ok(())
    }

    #[instrument(skip_all, fields(chars = doc.char_count(), pages = doc.page_count()))]
    pub fn analyze(&self, doc: &RawDocument, research_field: Option<String>) -> Result<AnalysisRecord> {
        self.check_size(doc)?;
        let t0 = std::time::Instant::now();

        let segmentation = self.segmenter.segment(doc);
        let sections = segmentation.sections;
        let title = extract_title(doc.text());
        let bibliography = Bibliography::parse(
            sections.references.as_deref().unwrap_or(""),
            segmentation.references_span,
        );

        let ((citations, figures), (mut equations, keywords)) = rayon::join(
            || {
                rayon::join(
                    || self.citations.extract(doc, Some(&bibliography)),
                    || self.figures.locate(doc),
                )
            },
            || {
                rayon::join(
                    || self.math.detect(doc),
                    || self.keywords.extract(doc.text(), title.as_deref(), &sections),
                )
            },
        );

        for eq in &mut equations {
            eq.topic = heading_before(&segmentation.headings, eq.position).map(|h| h.text.clone());
        }

        let mut diagnostics = segmentation.diagnostics;
        diagnostics.extend(citations.diagnostics);
        diagnostics.extend(figures.diagnostics);
        if sections.is_empty() {
            warn!("no usable section text extracted");
            diagnostics.push(Diagnostic::ExtractionEmpty);
        }

        let record = AnalysisRecord {
            title,
            research_field,
            stats: DocumentStats {
                char_count: doc.char_count(),
                page_count: doc.page_count(),
            },
            sections,
            citations: citations.citations,
            references: bibliography.entries,
            figures_tables: figures.entries,
            equations,
            keywords,
            diagnostics,
        };

        info!(
            sections = record.sections.sections.len(),
            citations = record.citations.len(),
            figures_tables = record.figures_tables.len(),
            equations = record.equations.len(),
            keywords = record.keywords.len(),
            diagnostics = record.diagnostics.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(record)
    }
}

/// One-shot analysis with a freshly built `Analyzer`.
pub fn analyze_document(
    doc: &RawDocument,
    config: &AnalysisConfig,
    research_field: Option<String>,
) -> Result<AnalysisRecord> {
    Analyzer::new(config).analyze(doc, research_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_common::config::LimitsConfig;
    use paperlens_common::entities::{CitationKind, ResolvedReference, SectionName};
    use paperlens_test_utils::{complete_paper, paper_pages};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_paper_populates_every_collection() {
        let doc = RawDocument::from_text(complete_paper());
        let record = Analyzer::default().analyze(&doc, None).unwrap();

        for name in SectionName::ESSENTIAL {
            assert!(record.sections.get(name).is_some(), "missing {name:?}");
        }
        assert!(record.title.is_some());
        assert!(!record.citations.is_empty());
        assert!(!record.references.is_empty());
        assert!(!record.figures_tables.is_empty());
        assert!(!record.equations.is_empty());
        assert!(!record.keywords.is_empty());
        assert!(!record.diagnostics.contains(&Diagnostic::ExtractionEmpty));
    }

    #[test]
    fn test_numbered_citations_resolve_against_reference_list() {
        let doc = RawDocument::from_text(complete_paper());
        let record = Analyzer::default().analyze(&doc, None).unwrap();
        let numbered = record
            .citations
            .iter()
            .find(|c| c.kind == CitationKind::Numbered)
            .unwrap();
        assert!(numbered
            .resolved_references
            .iter()
            .all(|r| matches!(r, ResolvedReference::Resolved { .. })));
    }

    #[test]
    fn test_citation_positions_are_non_decreasing() {
        let doc = RawDocument::from_text(complete_paper());
        let record = Analyzer::default().analyze(&doc, None).unwrap();
        assert!(record.citations.windows(2).all(|w| w[0].position <= w[1].position));
    }

    #[test]
    fn test_equations_take_topic_from_enclosing_heading() {
        let doc = RawDocument::from_text(complete_paper());
        let record = Analyzer::default().analyze(&doc, None).unwrap();
        let loss = record
            .equations
            .iter()
            .find(|e| e.text.starts_with("L = mean"))
            .unwrap();
        assert_eq!(loss.topic.as_deref(), Some("2 Methodology"));
        assert!(record.equations.iter().all(|e| !e.meaning.is_empty() && !e.impact.is_empty()));
    }

    #[test]
    fn test_page_numbers_follow_page_map() {
        let doc = RawDocument::from_pages(&paper_pages());
        let record = Analyzer::default().analyze(&doc, None).unwrap();
        assert_eq!(record.stats.page_count, paper_pages().len());
        assert!(record.figures_tables.iter().all(|e| e.page_number >= 2));
    }

    #[test]
    fn test_size_guard_rejects_oversize_input() {
        let config = AnalysisConfig {
            limits: LimitsConfig { max_document_chars: 10 },
            ..Default::default()
        };
        let doc = RawDocument::from_text("This text is longer than ten characters.");
        let err = analyze_document(&doc, &config, None).unwrap_err();
        assert!(matches!(err, PaperlensError::InputTooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_empty_text_is_flagged_not_fatal() {
        let record = Analyzer::default().analyze(&RawDocument::from_text("   "), None).unwrap();
        assert!(record.sections.is_empty());
        assert_eq!(record.diagnostics, vec![Diagnostic::ExtractionEmpty]);
    }

    #[test]
    fn test_research_field_is_carried_through() {
        let record = Analyzer::default()
            .analyze(&RawDocument::from_text(complete_paper()), Some("Physics".into()))
            .unwrap();
        assert_eq!(record.research_field.as_deref(), Some("Physics"));
    }
}
