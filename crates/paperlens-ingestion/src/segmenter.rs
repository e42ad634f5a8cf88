//! Section segmentation by heading detection.
//!
//! Lines are tested against an ordered heading catalogue. A line only counts
//! as a heading when it stands alone and looks like one: short, optional
//! leading numbering ("1.", "2.3", "IV.", "A."), capitalised, and no trailing
//! punctuation other than a single colon. Keyword presence mid-sentence or
//! inside quotes never opens a section.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use paperlens_common::document::RawDocument;
use paperlens_common::entities::{Diagnostic, Section, SectionMap, SectionName};

/// Where the text under a heading goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingTarget {
    Section(SectionName),
    /// Reference list; kept apart from the section map.
    References,
    /// Recognised but non-canonical (related work, appendix, ...); folded into main body.
    Other,
}

/// One catalogue rule: normalised heading phrases mapping to a target.
#[derive(Debug, Clone)]
pub struct HeadingRule {
    pub target: HeadingTarget,
    pub phrases: Vec<&'static str>,
}

/// Ordered heading rules. The first rule containing a phrase wins.
#[derive(Debug, Clone)]
pub struct HeadingCatalogue {
    rules: Vec<HeadingRule>,
}

impl Default for HeadingCatalogue {
    fn default() -> Self {
        let rule = |target, phrases: &[&'static str]| HeadingRule { target, phrases: phrases.to_vec() };
        Self {
            rules: vec![
                rule(HeadingTarget::Section(SectionName::Abstract), &["abstract"]),
                rule(HeadingTarget::Section(SectionName::Introduction), &["introduction", "introduction and motivation"]),
                rule(HeadingTarget::Section(SectionName::Methodology), &[
                    "methodology", "methods", "method", "approach", "our approach",
                    "proposed method", "proposed approach", "materials and methods",
                    "methods and materials", "experimental setup", "experimental design",
                    "research methodology", "study design",
                ]),
                rule(HeadingTarget::Section(SectionName::Results), &[
                    "results", "result", "experiments", "experiment", "experimental results",
                    "evaluation", "findings", "results and discussion", "results and analysis",
                ]),
                rule(HeadingTarget::Section(SectionName::Discussion), &["discussion", "analysis", "general discussion"]),
                rule(HeadingTarget::Section(SectionName::Conclusion), &[
                    "conclusion", "conclusions", "concluding remarks", "conclusion and future work",
                    "conclusions and future work", "summary and conclusions",
                ]),
                rule(HeadingTarget::References, &["references", "bibliography", "works cited", "literature cited", "reference list"]),
                rule(HeadingTarget::Other, &[
                    "related work", "related works", "literature review", "background",
                    "preliminaries", "acknowledgments", "acknowledgements", "acknowledgment",
                    "acknowledgement", "appendix", "appendices", "limitations", "future work",
                    "funding", "author contributions", "conflict of interest",
                    "conflicts of interest", "supplementary material", "data availability",
                    "ethics statement",
                ]),
            ],
        }
    }
}

impl HeadingCatalogue {
    pub fn new(rules: Vec<HeadingRule>) -> Self {
        Self { rules }
    }

    /// Target for an already-normalised heading phrase.
    pub fn lookup(&self, phrase: &str) -> Option<HeadingTarget> {
        if let Some(rule) = self.rules.iter().find(|r| r.phrases.iter().any(|p| *p == phrase)) {
            return Some(rule.target);
        }
        // "Appendix A", "Appendix B: Proofs"
        if phrase.starts_with("appendix ") && phrase.split_whitespace().count() <= 4 {
            return Some(HeadingTarget::Other);
        }
        None
    }
}

lazy_static! {
    static ref NUMBERING: Regex =
        Regex::new(r"^(?:\d+(?:\.\d+)*\.?|[IVX]+\.|[A-H]\.)\s*").unwrap();
    static ref RUN_IN_ABSTRACT: Regex =
        Regex::new(r"^(?:Abstract|ABSTRACT)\s*(?:[:.\u{2014}\u{2013}]|\s-)\s*(\S.*)$").unwrap();
}

const MAX_HEADING_CHARS: usize = 80;
const MAX_HEADING_WORDS: usize = 8;

/// A heading found on one line.
#[derive(Debug, Clone, PartialEq)]
struct HeadingLine {
    target: HeadingTarget,
    heading: String,
    line_start: usize,
    /// Where the body starts: end of line, or after "Abstract:" for run-in abstracts.
    body_start: usize,
}

/// Classify one line. Returns the target and, for run-in abstracts, the byte
/// offset within `line` where the body text starts.
pub fn classify_line(catalogue: &HeadingCatalogue, line: &str) -> Option<(HeadingTarget, Option<usize>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Run-in abstracts carry their body on the same line, so the
    // standalone-heading limits below do not apply to them.
    if let Some(caps) = RUN_IN_ABSTRACT.captures(trimmed) {
        if let Some(rest) = caps.get(1) {
            let lead = line.len() - line.trim_start().len();
            return Some((HeadingTarget::Section(SectionName::Abstract), Some(lead + rest.start())));
        }
    }
    if trimmed.chars().count() > MAX_HEADING_CHARS {
        return None;
    }
    if trimmed.starts_with(['"', '\'', '\u{201c}', '\u{2018}', '(', '[', '\u{ab}']) {
        return None;
    }

    let unnumbered = NUMBERING.replace(trimmed, "");
    let mut body = unnumbered.trim();
    if let Some(stripped) = body.strip_suffix(':') {
        body = stripped.trim_end();
    }
    if body.ends_with(['.', ',', ';', '?', '!', ':']) {
        return None;
    }
    if !body.chars().next().is_some_and(|c| c.is_uppercase()) {
        return None;
    }
    if body.split_whitespace().count() > MAX_HEADING_WORDS {
        return None;
    }
    catalogue.lookup(&normalise_heading(body)).map(|t| (t, None))
}

fn normalise_heading(heading: &str) -> String {
    heading
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A recognised heading line and where it starts (char offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMark {
    pub text: String,
    pub position: usize,
}

/// Result of segmenting one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    pub sections: SectionMap,
    /// Every recognised heading in document order.
    pub headings: Vec<HeadingMark>,
    /// Byte range of the reference list body, if a References heading was found.
    pub references_span: Option<Range<usize>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Last heading starting at or before `position`.
pub fn heading_before(headings: &[HeadingMark], position: usize) -> Option<&HeadingMark> {
    let idx = headings.partition_point(|h| h.position <= position);
    idx.checked_sub(1).map(|i| &headings[i])
}

/// Splits raw text into canonical sections.
#[derive(Debug, Clone, Default)]
pub struct SectionSegmenter {
    catalogue: HeadingCatalogue,
}

impl SectionSegmenter {
    pub fn new(catalogue: HeadingCatalogue) -> Self {
        Self { catalogue }
    }

    /// Segment `doc`. Never fails; unmatched sections are simply absent.
    pub fn segment(&self, doc: &RawDocument) -> Segmentation {
        let text = doc.text();
        let headings = self.find_headings(text);
        let mut out = Segmentation::default();
        out.headings = headings
            .iter()
            .map(|h| HeadingMark { text: h.heading.clone(), position: doc.char_offset(h.line_start) })
            .collect();

        if headings.is_empty() {
            let body = text.trim();
            if !body.is_empty() {
                out.sections.sections.insert(
                    SectionName::MainBody,
                    Section {
                        name: SectionName::MainBody,
                        heading: None,
                        text: body.to_string(),
                        start: 0,
                        end: doc.char_count(),
                    },
                );
            }
            debug!("no headings recognised; whole text assigned to main body");
            return out;
        }

        let preamble = text[..headings[0].line_start].trim();
        if !preamble.is_empty() {
            out.sections.preamble = Some(preamble.to_string());
        }

        for (i, h) in headings.iter().enumerate() {
            let body_end = headings.get(i + 1).map(|next| next.line_start).unwrap_or(text.len());
            let body_end = body_end.max(h.body_start);
            let body = text[h.body_start..body_end].trim();
            let start = doc.char_offset(h.body_start);
            let end = doc.char_offset(body_end);

            match h.target {
                HeadingTarget::Section(name) => {
                    if body.is_empty() {
                        out.diagnostics.push(Diagnostic::MalformedSection {
                            section: name.as_str().to_string(),
                        });
                    }
                    append_section(&mut out.sections, name, Some(&h.heading), body, start, end);
                }
                HeadingTarget::Other => {
                    append_section(&mut out.sections, SectionName::MainBody, None, body, start, end);
                }
                HeadingTarget::References => {
                    out.references_span = Some(match out.references_span.take() {
                        Some(span) => span.start..body_end,
                        None => h.body_start..body_end,
                    });
                    if !body.is_empty() {
                        match out.sections.references.as_mut() {
                            Some(existing) => {
                                existing.push_str("\n\n");
                                existing.push_str(body);
                            }
                            None => out.sections.references = Some(body.to_string()),
                        }
                    }
                }
            }
        }

        // A main body built only from empty "other" bodies carries nothing.
        if out
            .sections
            .get(SectionName::MainBody)
            .is_some_and(|s| s.text.is_empty())
        {
            out.sections.sections.remove(&SectionName::MainBody);
        }

        debug!(
            headings = headings.len(),
            sections = out.sections.sections.len(),
            "segmentation complete"
        );
        out
    }

    fn find_headings(&self, text: &str) -> Vec<HeadingLine> {
        let mut headings = Vec::new();
        let mut line_start = 0usize;
        for line in text.split('\n') {
            let line_end = line_start + line.len();
            if let Some((target, run_in)) = classify_line(&self.catalogue, line) {
                let body_start = match run_in {
                    Some(offset) => line_start + offset,
                    None => (line_end + 1).min(text.len()),
                };
                let heading = match run_in {
                    Some(offset) => line[..offset].trim().trim_end_matches([':', '.', '\u{2014}', '\u{2013}', '-']).trim().to_string(),
                    None => line.trim().to_string(),
                };
                headings.push(HeadingLine { target, heading, line_start, body_start });
            }
            line_start = line_end + 1;
        }
        headings
    }
}

fn append_section(
    map: &mut SectionMap,
    name: SectionName,
    heading: Option<&str>,
    body: &str,
    start: usize,
    end: usize,
) {
    match map.sections.get_mut(&name) {
        Some(existing) => {
            if !body.is_empty() {
                if !existing.text.is_empty() {
                    existing.text.push_str("\n\n");
                }
                existing.text.push_str(body);
            }
            existing.end = end;
        }
        None => {
            map.sections.insert(
                name,
                Section {
                    name,
                    heading: heading.map(str::to_string),
                    text: body.to_string(),
                    start,
                    end,
                },
            );
        }
    }
}
