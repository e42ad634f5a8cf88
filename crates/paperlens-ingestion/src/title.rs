//! Paper title heuristic over the first lines of the document.

use lazy_static::lazy_static;
use regex::Regex;

const MAX_TITLE_CANDIDATES: usize = 5;

const EXCLUDED_PREFIXES: &[&str] = &[
    "abstract", "introduction", "author", "university", "journal", "proceedings",
    "conference", "workshop", "symposium", "arxiv:", "submitted", "received",
    "accepted", "published", "volume", "issue", "doi:", "issn:", "email:",
    "address:", "department", "institute", "college", "school", "keywords",
];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

lazy_static! {
    static ref VERSION_TAG: Regex = Regex::new(r"(?i)\bv\d+\b|\[cs\.").unwrap();
}

/// First plausible title among the first few non-empty lines.
pub fn extract_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_TITLE_CANDIDATES)
        .find(|l| is_valid_title(l))
        .map(str::to_string)
}

pub fn is_valid_title(line: &str) -> bool {
    let len = line.chars().count();
    if !(10..=200).contains(&len) {
        return false;
    }
    let lower = line.to_lowercase();
    if EXCLUDED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    if lower.contains("arxiv:") || VERSION_TAG.is_match(line) {
        return false;
    }
    // Dates: digits together with a month abbreviation.
    if line.chars().any(|c| c.is_ascii_digit()) && MONTHS.iter().any(|m| lower.contains(m)) {
        return false;
    }
    let wordy = line.chars().filter(|c| c.is_alphanumeric() || c.is_whitespace()).count();
    if (wordy as f64) < len as f64 * 0.7 {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    words.len() >= 2 && words.iter().all(|w| w.chars().count() <= 50)
}
