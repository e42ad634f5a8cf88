//! Reference list parsing.
//!
//! Accepts the body of a References / Bibliography section. Entries start
//! with `[n]`, `n.` or `n)`; following lines continue the current entry until
//! a blank line. A short all-caps line ends the list.

use std::collections::BTreeMap;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BRACKET_ENTRY: Regex = Regex::new(r"^\[(\d{1,4})\]\s*(.+)$").unwrap();
    static ref DOTTED_ENTRY: Regex = Regex::new(r"^(\d{1,4})[.)]\s+(.+)$").unwrap();
}

/// Parsed reference list and where it sits in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bibliography {
    pub entries: BTreeMap<u32, String>,
    /// Byte range of the list in the raw text; citations inside it are ignored.
    pub span: Option<Range<usize>>,
}

impl Bibliography {
    pub fn parse(block: &str, span: Option<Range<usize>>) -> Self {
        Self { entries: parse_reference_list(block), span }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, byte: usize) -> bool {
        self.span.as_ref().is_some_and(|s| s.contains(&byte))
    }
}

pub fn parse_reference_list(block: &str) -> BTreeMap<u32, String> {
    let mut entries = BTreeMap::new();
    let mut current: Option<(u32, Vec<&str>)> = None;

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut entries, &mut current);
            continue;
        }
        if is_section_break(line) {
            break;
        }
        let entry = BRACKET_ENTRY.captures(line).or_else(|| DOTTED_ENTRY.captures(line));
        match entry {
            Some(caps) => {
                flush(&mut entries, &mut current);
                if let (Some(n), Some(rest)) = (caps.get(1), caps.get(2)) {
                    if let Ok(number) = n.as_str().parse::<u32>() {
                        current = Some((number, vec![rest.as_str().trim()]));
                    }
                }
            }
            None => {
                if let Some((_, parts)) = current.as_mut() {
                    parts.push(line);
                }
            }
        }
    }
    flush(&mut entries, &mut current);
    entries
}

fn flush(entries: &mut BTreeMap<u32, String>, current: &mut Option<(u32, Vec<&str>)>) {
    if let Some((number, parts)) = current.take() {
        if !parts.is_empty() {
            entries.insert(number, parts.join(" ").trim().to_string());
        }
    }
}

/// Short all-caps line such as "APPENDIX" or "SUPPLEMENTARY MATERIAL".
fn is_section_break(line: &str) -> bool {
    let has_cased = line.chars().any(|c| c.is_alphabetic());
    has_cased
        && !line.chars().any(|c| c.is_lowercase())
        && line.split_whitespace().count() <= 6
        && !BRACKET_ENTRY.is_match(line)
        && !DOTTED_ENTRY.is_match(line)
}
