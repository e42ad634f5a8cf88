//! Structured entities produced by one analysis of one document.
//! All offsets are character offsets into the raw document text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Abstract,
    Introduction,
    Methodology,
    Results,
    Discussion,
    Conclusion,
    MainBody,
}

impl SectionName {
    /// The structural-completeness checklist, in document order.
    pub const ESSENTIAL: [SectionName; 6] = [
        SectionName::Abstract,
        SectionName::Introduction,
        SectionName::Methodology,
        SectionName::Results,
        SectionName::Discussion,
        SectionName::Conclusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Abstract     => "abstract",
            SectionName::Introduction => "introduction",
            SectionName::Methodology  => "methodology",
            SectionName::Results      => "results",
            SectionName::Discussion   => "discussion",
            SectionName::Conclusion   => "conclusion",
            SectionName::MainBody     => "main_body",
        }
    }

    /// Title-case label used in report prose.
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionName::Abstract     => "Abstract",
            SectionName::Introduction => "Introduction",
            SectionName::Methodology  => "Methodology",
            SectionName::Results      => "Results",
            SectionName::Discussion   => "Discussion",
            SectionName::Conclusion   => "Conclusion",
            SectionName::MainBody     => "Main body",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "abstract"                 => Some(SectionName::Abstract),
            "introduction"             => Some(SectionName::Introduction),
            "methodology" | "methods"  => Some(SectionName::Methodology),
            "results"                  => Some(SectionName::Results),
            "discussion"               => Some(SectionName::Discussion),
            "conclusion"               => Some(SectionName::Conclusion),
            "main_body" | "main body"  => Some(SectionName::MainBody),
            _                          => None,
        }
    }

    pub fn is_essential(&self) -> bool {
        !matches!(self, SectionName::MainBody)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: SectionName,
    /// Heading line that opened the section; absent for implicit main body.
    pub heading: Option<String>,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Section {
    pub fn char_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Canonical sections found in a document. Absent keys are valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMap {
    pub sections: BTreeMap<SectionName, Section>,
    /// Text before the first recognised heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    /// Body of the References / Bibliography heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl SectionMap {
    pub fn get(&self, name: SectionName) -> Option<&Section> {
        self.sections.get(&name)
    }

    /// Section text, or "" when absent.
    pub fn text(&self, name: SectionName) -> &str {
        self.sections.get(&name).map(|s| s.text.as_str()).unwrap_or("")
    }

    /// True when no section carries any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|s| s.text.trim().is_empty())
    }

    /// All section text joined in document order.
    pub fn full_text(&self) -> String {
        let mut ordered: Vec<&Section> = self.sections.values().collect();
        ordered.sort_by_key(|s| s.start);
        ordered
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// ---------------------------------------------------------------------------
// Citations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    AuthorYear,
    Numbered,
    Footnote,
}

impl CitationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationKind::AuthorYear => "author_year",
            CitationKind::Numbered   => "numbered",
            CitationKind::Footnote   => "footnote",
        }
    }
}

/// Outcome of looking a citation number up in the reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolvedReference {
    Resolved { number: u32, text: String },
    Unresolved { number: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: CitationKind,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub reference_numbers: Vec<u32>,
    /// Parallel to `reference_numbers`; empty when no reference list was available.
    pub resolved_references: Vec<ResolvedReference>,
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Figures and tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Figure,
    Table,
}

/// Image bytes attached by an upstream extractor. Never produced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub media_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTableEntry {
    pub label: String,
    pub content_type: ContentType,
    pub caption: String,
    pub page_number: u32,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
}

// ---------------------------------------------------------------------------
// Equations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationKind {
    Inline,
    Display,
    LatexBlock,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EquationKind,
    pub page_number: u32,
    pub position: usize,
    /// Nearest section heading before the equation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Short reading of what the relation expresses.
    #[serde(default)]
    pub meaning: String,
    /// Likely effect of the relation on the reported results.
    #[serde(default)]
    pub impact: String,
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub frequency: usize,
    pub score: f64,
    /// 1-based.
    pub rank: usize,
}

// ---------------------------------------------------------------------------
// Analysis record
// ---------------------------------------------------------------------------

/// Non-fatal conditions noted while analysing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    MalformedSection { section: String },
    UnresolvedCitationReference { number: u32 },
    ExtractionEmpty,
    DuplicateLabel { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub char_count: usize,
    pub page_count: usize,
}

/// Merged output of the segmenter and the four scanners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub title: Option<String>,
    pub research_field: Option<String>,
    pub stats: DocumentStats,
    pub sections: SectionMap,
    pub citations: Vec<Citation>,
    /// Parsed reference list, number → entry text.
    pub references: BTreeMap<u32, String>,
    pub figures_tables: Vec<FigureTableEntry>,
    pub equations: Vec<Equation>,
    pub keywords: Vec<Keyword>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationTotals {
    pub author_year: usize,
    pub numbered: usize,
    pub footnote: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationReport {
    pub total: usize,
    pub by_type: CitationTotals,
    pub citations: Vec<Citation>,
    pub references: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureReport {
    pub total: usize,
    pub figures: usize,
    pub tables: usize,
    pub entries: Vec<FigureTableEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationTotals {
    pub inline: usize,
    pub display: usize,
    pub latex_block: usize,
    pub plain: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathReport {
    pub total: usize,
    pub by_type: EquationTotals,
    pub equations: Vec<Equation>,
}

impl AnalysisRecord {
    pub fn citation_report(&self) -> CitationReport {
        let mut by_type = CitationTotals::default();
        for c in &self.citations {
            match c.kind {
                CitationKind::AuthorYear => by_type.author_year += 1,
                CitationKind::Numbered   => by_type.numbered += 1,
                CitationKind::Footnote   => by_type.footnote += 1,
            }
        }
        CitationReport {
            total: self.citations.len(),
            by_type,
            citations: self.citations.clone(),
            references: self.references.clone(),
        }
    }

    pub fn figure_report(&self) -> FigureReport {
        let figures = self
            .figures_tables
            .iter()
            .filter(|e| e.content_type == ContentType::Figure)
            .count();
        FigureReport {
            total: self.figures_tables.len(),
            figures,
            tables: self.figures_tables.len() - figures,
            entries: self.figures_tables.clone(),
        }
    }

    pub fn math_report(&self) -> MathReport {
        let mut by_type = EquationTotals::default();
        for eq in &self.equations {
            match eq.kind {
                EquationKind::Inline     => by_type.inline += 1,
                EquationKind::Display    => by_type.display += 1,
                EquationKind::LatexBlock => by_type.latex_block += 1,
                EquationKind::Plain      => by_type.plain += 1,
            }
        }
        MathReport {
            total: self.equations.len(),
            by_type,
            equations: self.equations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(name: SectionName, text: &str, start: usize) -> Section {
        Section {
            name,
            heading: None,
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
        }
    }

    fn empty_record() -> AnalysisRecord {
        AnalysisRecord {
            title: None,
            research_field: None,
            stats: DocumentStats::default(),
            sections: SectionMap::default(),
            citations: Vec::new(),
            references: BTreeMap::new(),
            figures_tables: Vec::new(),
            equations: Vec::new(),
            keywords: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_section_map_blank_sections_count_as_empty() {
        let mut map = SectionMap::default();
        assert!(map.is_empty());
        map.sections.insert(SectionName::Results, section(SectionName::Results, "  \n ", 0));
        assert!(map.is_empty());
        map.sections.insert(SectionName::Abstract, section(SectionName::Abstract, "We study x.", 0));
        assert!(!map.is_empty());
    }

    #[test]
    fn test_full_text_follows_document_order() {
        let mut map = SectionMap::default();
        map.sections.insert(SectionName::Abstract, section(SectionName::Abstract, "second", 40));
        map.sections.insert(SectionName::MainBody, section(SectionName::MainBody, "first", 0));
        assert_eq!(map.full_text(), "first\n\nsecond");
    }

    #[test]
    fn test_section_name_parse_accepts_aliases() {
        assert_eq!(SectionName::parse("Methods"), Some(SectionName::Methodology));
        assert_eq!(SectionName::parse("main body"), Some(SectionName::MainBody));
        assert_eq!(SectionName::parse("appendix"), None);
    }

    #[test]
    fn test_citation_serializes_type_tag() {
        let c = Citation {
            text: "[1]".into(),
            kind: CitationKind::Numbered,
            authors: vec![],
            year: None,
            reference_numbers: vec![1],
            resolved_references: vec![ResolvedReference::Unresolved { number: 1 }],
            position: 4,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "numbered");
        assert_eq!(json["resolved_references"][0]["status"], "unresolved");
    }

    #[test]
    fn test_projections_count_by_type() {
        let mut record = empty_record();
        record.figures_tables = vec![
            FigureTableEntry {
                label: "Figure 1".into(),
                content_type: ContentType::Figure,
                caption: String::new(),
                page_number: 1,
                position: 0,
                image: None,
            },
            FigureTableEntry {
                label: "Table 1".into(),
                content_type: ContentType::Table,
                caption: "Results.".into(),
                page_number: 2,
                position: 10,
                image: None,
            },
        ];
        record.equations = vec![Equation {
            text: "$x$".into(),
            kind: EquationKind::Inline,
            page_number: 1,
            position: 3,
            topic: None,
            meaning: String::new(),
            impact: String::new(),
        }];
        let figs = record.figure_report();
        assert_eq!((figs.total, figs.figures, figs.tables), (2, 1, 1));
        let math = record.math_report();
        assert_eq!(math.by_type, EquationTotals { inline: 1, ..Default::default() });
        assert_eq!(record.citation_report().total, 0);
    }
}
