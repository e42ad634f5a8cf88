//! In-text citation extraction.
//!
//! Three pattern families in priority order: author-year (narrative
//! `Smith et al. (2020)` and parenthetical `(Smith and Lee, 2020)`),
//! numbered (`[3]`, `[1, 4]`, `[2-5]`), and footnote markers (`^3`, `³`).
//! When spans overlap the higher family wins. A grouped parenthetical such
//! as `(Smith et al., 2019; Lee, 2020)` yields one citation per member.

use std::collections::BTreeSet;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use paperlens_common::config::ExtractionConfig;
use paperlens_common::document::RawDocument;
use paperlens_common::entities::{Citation, CitationKind, Diagnostic, ResolvedReference};

use crate::matcher::{scan, Matcher, RegexMatcher};
use crate::references::Bibliography;

const NAME: &str = r"(?:\p{Lu}['’])?\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)*";
const YEAR: &str = r"(?:19|20)\d{2}[a-z]?";

/// Capitalised words that precede a parenthesised year without being authors.
const NON_AUTHORS: &[&str] = &[
    "In", "The", "See", "As", "For", "From", "Since", "On", "At", "By", "Until",
    "Before", "After", "During", "Figure", "Fig", "Table", "Section", "Eq",
    "Equation", "Appendix", "Chapter", "Version", "January", "February", "March",
    "April", "June", "July", "August", "September", "October", "November", "December",
];

const SUPERSCRIPT_DIGITS: &str = "⁰¹²³⁴⁵⁶⁷⁸⁹";

lazy_static! {
    static ref NARRATIVE: Regex = Regex::new(&format!(
        r"\b({NAME})(?:\s+et\s+al\.?|\s+(?:and|&)\s+({NAME}))?\s*\(({YEAR})\)"
    ))
    .unwrap();
    static ref PARENTHETICAL: Regex = Regex::new(&format!(
        r"\(({NAME})(?:\s+et\s+al\.?|\s+(?:and|&)\s+({NAME}))?,\s*({YEAR})\)"
    ))
    .unwrap();
    static ref GROUPED: Regex = {
        let entry = format!(r"{NAME}(?:\s+et\s+al\.?|\s+(?:and|&)\s+{NAME})?,\s*{YEAR}");
        Regex::new(&format!(r"\(\s*({entry}(?:\s*;\s*{entry})+)\s*\)")).unwrap()
    };
    static ref GROUP_MEMBER: Regex = Regex::new(&format!(
        r"({NAME})(?:\s+et\s+al\.?|\s+(?:and|&)\s+({NAME}))?,\s*({YEAR})"
    ))
    .unwrap();
    static ref NUMBERED: Regex =
        Regex::new(r"\[(\d{1,3}(?:\s*[,;\-\u{2013}]\s*\d{1,3})*)\]").unwrap();
    static ref CARET_FOOTNOTE: Regex = Regex::new(r"\^\{?(\d{1,3})\}?").unwrap();
    static ref SUPERSCRIPT_FOOTNOTE: Regex = Regex::new(r"[⁰¹²³⁴⁵⁶⁷⁸⁹]+").unwrap();
}

/// What a matcher recognised, before positions and resolution are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationMatch {
    pub kind: CitationKind,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub reference_numbers: Vec<u32>,
    /// Members of a grouped author-year citation; empty otherwise.
    pub members: Vec<GroupMember>,
}

/// One author-year entry inside a grouped parenthetical.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    /// Byte span in the document text.
    pub span: Range<usize>,
    pub authors: Vec<String>,
    pub year: String,
}

/// Citations plus the non-fatal notes raised while resolving them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationScan {
    pub citations: Vec<Citation>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CitationExtractor {
    matchers: Vec<Box<dyn Matcher<CitationMatch>>>,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl CitationExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let max_span = config.max_citation_range_span;
        let matchers: Vec<Box<dyn Matcher<CitationMatch>>> = vec![
            Box::new(RegexMatcher::new("author_year_narrative", NARRATIVE.clone(), author_year)),
            Box::new(RegexMatcher::new("author_year_parenthetical", PARENTHETICAL.clone(), author_year)),
            Box::new(RegexMatcher::new("author_year_grouped", GROUPED.clone(), grouped)),
            Box::new(RegexMatcher::new("numbered", NUMBERED.clone(), move |caps: &Captures<'_>| {
                let numbers = expand_numbers(caps.get(1)?.as_str(), max_span)?;
                Some(CitationMatch {
                    kind: CitationKind::Numbered,
                    authors: Vec::new(),
                    year: None,
                    reference_numbers: numbers,
                    members: Vec::new(),
                })
            })),
            Box::new(RegexMatcher::new("footnote_caret", CARET_FOOTNOTE.clone(), footnote)),
            Box::new(RegexMatcher::new("footnote_superscript", SUPERSCRIPT_FOOTNOTE.clone(), footnote)),
        ];
        Self { matchers }
    }

    /// Extract citations ordered by position. Numbered citations are resolved
    /// against `bibliography` when it has entries; citations inside the
    /// bibliography's own span are skipped.
    pub fn extract(&self, doc: &RawDocument, bibliography: Option<&Bibliography>) -> CitationScan {
        let mut out = CitationScan::default();
        let mut unresolved = BTreeSet::new();
        let resolvable = bibliography.filter(|b| !b.is_empty());

        for candidate in scan(doc.text(), &self.matchers) {
            if bibliography.is_some_and(|b| b.contains(candidate.start)) {
                continue;
            }
            let m = candidate.value;
            if !m.members.is_empty() {
                for member in m.members {
                    out.citations.push(Citation {
                        text: doc.text()[member.span.clone()].to_string(),
                        kind: CitationKind::AuthorYear,
                        authors: member.authors,
                        year: Some(member.year),
                        reference_numbers: Vec::new(),
                        resolved_references: Vec::new(),
                        position: doc.char_offset(member.span.start),
                    });
                }
                continue;
            }
            let resolved_references = match (m.kind, resolvable) {
                (CitationKind::Numbered, Some(bib)) => m
                    .reference_numbers
                    .iter()
                    .map(|&number| match bib.entries.get(&number) {
                        Some(text) => ResolvedReference::Resolved { number, text: text.clone() },
                        None => {
                            unresolved.insert(number);
                            ResolvedReference::Unresolved { number }
                        }
                    })
                    .collect(),
                _ => Vec::new(),
            };
            out.citations.push(Citation {
                text: doc.text()[candidate.start..candidate.end].to_string(),
                kind: m.kind,
                authors: m.authors,
                year: m.year,
                reference_numbers: m.reference_numbers,
                resolved_references,
                position: doc.char_offset(candidate.start),
            });
        }

        for number in unresolved {
            debug!(number, "citation number has no reference list entry");
            out.diagnostics.push(Diagnostic::UnresolvedCitationReference { number });
        }
        debug!(citations = out.citations.len(), "citation extraction complete");
        out
    }
}

/// Extract with the default configuration.
pub fn extract_citations(doc: &RawDocument, bibliography: Option<&Bibliography>) -> CitationScan {
    lazy_static! {
        static ref DEFAULT: CitationExtractor = CitationExtractor::default();
    }
    DEFAULT.extract(doc, bibliography)
}

fn author_year(caps: &Captures<'_>) -> Option<CitationMatch> {
    let authors = authors(caps)?;
    Some(CitationMatch {
        kind: CitationKind::AuthorYear,
        authors,
        year: Some(caps.get(3)?.as_str().to_string()),
        reference_numbers: Vec::new(),
        members: Vec::new(),
    })
}

/// Author names from capture groups 1 and 2, rejecting function words.
fn authors(caps: &Captures<'_>) -> Option<Vec<String>> {
    let first = caps.get(1)?.as_str();
    if NON_AUTHORS.iter().any(|w| *w == first) {
        return None;
    }
    let mut authors = vec![first.to_string()];
    if let Some(second) = caps.get(2) {
        authors.push(second.as_str().to_string());
    }
    Some(authors)
}

fn grouped(caps: &Captures<'_>) -> Option<CitationMatch> {
    let inner = caps.get(1)?;
    let members: Vec<GroupMember> = GROUP_MEMBER
        .captures_iter(inner.as_str())
        .filter_map(|member| {
            let whole = member.get(0)?;
            Some(GroupMember {
                span: inner.start() + whole.start()..inner.start() + whole.end(),
                authors: authors(&member)?,
                year: member.get(3)?.as_str().to_string(),
            })
        })
        .collect();
    let first = members.first()?;
    Some(CitationMatch {
        kind: CitationKind::AuthorYear,
        authors: first.authors.clone(),
        year: Some(first.year.clone()),
        reference_numbers: Vec::new(),
        members,
    })
}

fn footnote(caps: &Captures<'_>) -> Option<CitationMatch> {
    let marker = caps.get(0)?.as_str();
    let digits: String = marker
        .chars()
        .filter_map(|c| match SUPERSCRIPT_DIGITS.chars().position(|s| s == c) {
            Some(d) => char::from_digit(d as u32, 10),
            None => c.is_ascii_digit().then_some(c),
        })
        .collect();
    if digits.is_empty() || digits.chars().all(|c| c == '0') {
        return None;
    }
    Some(CitationMatch {
        kind: CitationKind::Footnote,
        authors: Vec::new(),
        year: None,
        reference_numbers: Vec::new(),
        members: Vec::new(),
    })
}

/// Expand the inside of a numbered citation bracket.
///
/// `"1-3, 5"` → `[1, 2, 3, 5]`. Reversed ranges are flipped, duplicates keep
/// their first occurrence, and a range wider than `max_span` keeps only its
/// endpoints. Any zero rejects the whole bracket.
pub fn expand_numbers(inner: &str, max_span: u32) -> Option<Vec<u32>> {
    let mut numbers = Vec::new();
    for part in inner.split([',', ';']) {
        let bounds: Vec<u32> = part
            .split(['-', '\u{2013}'])
            .map(|n| n.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .ok()?;
        if bounds.iter().any(|&n| n == 0) {
            return None;
        }
        match bounds.as_slice() {
            [single] => numbers.push(*single),
            [a, b] => {
                let (lo, hi) = if a <= b { (*a, *b) } else { (*b, *a) };
                if hi - lo > max_span {
                    numbers.push(lo);
                    numbers.push(hi);
                } else {
                    numbers.extend(lo..=hi);
                }
            }
            chain => numbers.extend_from_slice(chain),
        }
    }
    let mut seen = BTreeSet::new();
    numbers.retain(|n| seen.insert(*n));
    (!numbers.is_empty()).then_some(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Vec<Citation> {
        extract_citations(&RawDocument::from_text(text), None).citations
    }

    #[test]
    fn test_mixed_families_in_position_order() {
        let cites = extract("Smith (2023) showed X. Later work [1, 2] confirmed this.^3");
        assert_eq!(cites.len(), 3);
        assert_eq!(cites[0].kind, CitationKind::AuthorYear);
        assert_eq!(cites[0].authors, vec!["Smith".to_string()]);
        assert_eq!(cites[0].year.as_deref(), Some("2023"));
        assert_eq!(cites[0].text, "Smith (2023)");
        assert_eq!(cites[1].kind, CitationKind::Numbered);
        assert_eq!(cites[1].reference_numbers, vec![1, 2]);
        assert_eq!(cites[2].kind, CitationKind::Footnote);
        assert_eq!(cites[2].text, "^3");
        assert!(cites.windows(2).all(|w| w[0].position <= w[1].position));
    }

    #[test]
    fn test_author_year_variants() {
        let cites = extract("As Lee et al. (2019) and Kim & Park (2020b) argued (Brown, 2018), see (O'Neil and Wu, 2021).");
        let authors: Vec<Vec<String>> = cites.iter().map(|c| c.authors.clone()).collect();
        assert_eq!(
            authors,
            vec![
                vec!["Lee".to_string()],
                vec!["Kim".to_string(), "Park".to_string()],
                vec!["Brown".to_string()],
                vec!["O'Neil".to_string(), "Wu".to_string()],
            ]
        );
        assert_eq!(cites[1].year.as_deref(), Some("2020b"));
    }

    #[test]
    fn test_grouped_parenthetical_splits_into_members() {
        let text = "Earlier studies (Smith et al., 2019; Lee, 2020; Kim and Park, 2021a) disagree.";
        let cites = extract(text);
        assert_eq!(cites.len(), 3);
        assert!(cites.iter().all(|c| c.kind == CitationKind::AuthorYear));
        assert_eq!(cites[0].text, "Smith et al., 2019");
        assert_eq!(cites[0].position, text.find("Smith").unwrap());
        assert_eq!(cites[1].authors, vec!["Lee".to_string()]);
        assert_eq!(cites[1].year.as_deref(), Some("2020"));
        assert_eq!(cites[2].authors, vec!["Kim".to_string(), "Park".to_string()]);
        assert_eq!(cites[2].year.as_deref(), Some("2021a"));
    }

    #[test]
    fn test_function_words_are_not_authors() {
        assert!(extract("In (2020) the trend reversed.").is_empty());
    }

    #[test]
    fn test_mixed_range_expansion() {
        assert_eq!(expand_numbers("1-3, 5", 50), Some(vec![1, 2, 3, 5]));
        assert_eq!(expand_numbers("7–4", 50), Some(vec![4, 5, 6, 7]));
        assert_eq!(expand_numbers("2, 2; 3", 50), Some(vec![2, 3]));
        assert_eq!(expand_numbers("1-200", 50), Some(vec![1, 200]));
        assert_eq!(expand_numbers("0, 1", 50), None);
    }

    #[test]
    fn test_bracket_with_zero_is_rejected() {
        assert!(extract("see [0] and [12]").iter().all(|c| c.reference_numbers != vec![0]));
        assert_eq!(extract("see [0] and [12]").len(), 1);
    }

    #[test]
    fn test_superscript_footnotes() {
        let cites = extract("as shown¹² before");
        assert_eq!(cites.len(), 1);
        assert_eq!(cites[0].kind, CitationKind::Footnote);
        assert_eq!(cites[0].position, 8);
    }

    #[test]
    fn test_resolution_with_placeholders() {
        let text = "Prior work [1, 3] exists.\nReferences\n[1] First entry.\n[2] Second entry.";
        let span_start = text.find("[1] First").unwrap();
        let bib = Bibliography::parse(&text[span_start..], Some(span_start..text.len()));
        let scan = extract_citations(&RawDocument::from_text(text), Some(&bib));
        assert_eq!(scan.citations.len(), 1);
        assert_eq!(
            scan.citations[0].resolved_references,
            vec![
                ResolvedReference::Resolved { number: 1, text: "First entry.".into() },
                ResolvedReference::Unresolved { number: 3 },
            ]
        );
        assert_eq!(scan.diagnostics, vec![Diagnostic::UnresolvedCitationReference { number: 3 }]);
    }

    #[test]
    fn test_no_bibliography_leaves_resolution_empty() {
        let cites = extract("Result [4].");
        assert!(cites[0].resolved_references.is_empty());
    }
}
