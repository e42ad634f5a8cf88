//! Figure and table caption locator.
//!
//! Only labels that open a line count ("Figure 2: ...", "Tab. 3."), which
//! separates caption definitions from in-text references such as
//! "as shown in Figure 2". The caption runs to the first sentence end, a
//! blank line, the next label, or a numbered heading, whichever is first,
//! and is capped at `caption_max_chars`.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use paperlens_common::config::ExtractionConfig;
use paperlens_common::document::RawDocument;
use paperlens_common::entities::{ContentType, Diagnostic, FigureTableEntry};

use crate::matcher::{scan, Matcher, RegexMatcher};

lazy_static! {
    static ref FIGURE_LABEL: Regex = Regex::new(
        r"(?mi)^[ \t]*(figure|fig\.?)[ \t]*(\d+(?:\.\d+)*[a-z]?)[ \t]*(?:[:.|\u{2014}\u{2013}-]|$)"
    )
    .unwrap();
    static ref TABLE_LABEL: Regex = Regex::new(
        r"(?mi)^[ \t]*(table|tab\.?)[ \t]*(\d+(?:\.\d+)*[a-z]?)[ \t]*(?:[:.|\u{2014}\u{2013}-]|$)"
    )
    .unwrap();
    static ref ANY_LABEL: Regex =
        Regex::new(r"(?i)^\s*(?:figure|fig\.?|table|tab\.?)\s*\d").unwrap();
    static ref NUMBERED_HEADING: Regex =
        Regex::new(r"^\s*\d+(?:\.\d+)*\.?\s+\p{Lu}[^.!?]{0,78}$").unwrap();
}

/// Tokens whose trailing period does not end a caption sentence.
const ABBREVIATIONS: &[&str] = &[
    "fig", "figs", "e.g", "i.e", "al", "vs", "eq", "eqs", "eqn", "eqns", "no", "nos", "approx",
    "resp", "cf", "ref", "refs", "sec", "secs", "sect", "ch", "chap", "app", "tab", "alg", "def",
    "thm", "lem", "prop", "vol", "pp", "ca", "avg", "std", "est",
];

#[derive(Debug, Clone, PartialEq)]
struct LabelMatch {
    content_type: ContentType,
    number: String,
    /// Byte offset of the label keyword.
    keyword_start: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureScan {
    pub entries: Vec<FigureTableEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct FigureLocator {
    matchers: Vec<Box<dyn Matcher<LabelMatch>>>,
    caption_max_chars: usize,
}

impl Default for FigureLocator {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl FigureLocator {
    pub fn new(config: &ExtractionConfig) -> Self {
        let matchers: Vec<Box<dyn Matcher<LabelMatch>>> = vec![
            Box::new(RegexMatcher::new("figure_label", FIGURE_LABEL.clone(), |caps: &Captures<'_>| {
                label_match(caps, ContentType::Figure)
            })),
            Box::new(RegexMatcher::new("table_label", TABLE_LABEL.clone(), |caps: &Captures<'_>| {
                label_match(caps, ContentType::Table)
            })),
        ];
        Self { matchers, caption_max_chars: config.caption_max_chars }
    }

    pub fn locate(&self, doc: &RawDocument) -> FigureScan {
        let text = doc.text();
        let mut out = FigureScan::default();
        let mut seen = HashSet::new();

        for candidate in scan(text, &self.matchers) {
            let m = candidate.value;
            let label = match m.content_type {
                ContentType::Figure => format!("Figure {}", m.number),
                ContentType::Table => format!("Table {}", m.number),
            };
            if !seen.insert(label.clone()) {
                debug!(%label, "duplicate label skipped");
                out.diagnostics.push(Diagnostic::DuplicateLabel { label });
                continue;
            }
            let caption = capture_caption(text, candidate.end, self.caption_max_chars);
            let position = doc.char_offset(m.keyword_start);
            out.entries.push(FigureTableEntry {
                label,
                content_type: m.content_type,
                caption,
                page_number: doc.pages().page_at(position),
                position,
                image: None,
            });
        }

        debug!(entries = out.entries.len(), "figure/table scan complete");
        out
    }
}

fn label_match(caps: &Captures<'_>, content_type: ContentType) -> Option<LabelMatch> {
    Some(LabelMatch {
        content_type,
        number: caps.get(2)?.as_str().to_string(),
        keyword_start: caps.get(1)?.start(),
    })
}

/// Caption text starting at byte `from`.
pub fn capture_caption(text: &str, from: usize, max_chars: usize) -> String {
    let rest = &text[from.min(text.len())..];
    let mut collected: Vec<&str> = Vec::new();

    for (i, line) in rest.split('\n').enumerate() {
        let trimmed = line.trim();
        if i > 0 {
            if trimmed.is_empty() || ANY_LABEL.is_match(line) || NUMBERED_HEADING.is_match(line) {
                break;
            }
        }
        if !trimmed.is_empty() {
            collected.push(trimmed);
        }
        if ends_sentence(trimmed) {
            break;
        }
    }

    let joined = collected.join(" ");
    let joined = joined.trim_start_matches([':', '.', '|', '-', '\u{2013}', '\u{2014}']).trim();
    let sentence = first_sentence(joined);
    truncate_chars(sentence, max_chars)
}

/// True when `line` contains a sentence terminator that ends the caption.
fn ends_sentence(line: &str) -> bool {
    sentence_end(line).is_some()
}

/// Prefix of `text` up to and including the first real sentence terminator.
fn first_sentence(text: &str) -> &str {
    match sentence_end(text) {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Byte offset just past the first terminator followed by whitespace or the
/// end of text. Periods after known abbreviations are skipped.
fn sentence_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace());
        if !at_boundary {
            continue;
        }
        if c == '.' && is_abbreviation(&text[..i]) {
            continue;
        }
        return Some(i + 1);
    }
    None
}

fn is_abbreviation(before: &str) -> bool {
    let token = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_lowercase();
    ABBREVIATIONS.iter().any(|a| *a == token)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}
