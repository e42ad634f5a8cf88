//! Ordered matcher pipeline shared by the citation, figure and math scanners.
//!
//! Each scanner is a list of [`Matcher`]s in priority order. [`scan`] runs
//! every matcher across the text, then keeps candidates greedily by priority:
//! a candidate survives only if it does not overlap a span already claimed by
//! an earlier matcher. The survivors come back sorted by position.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

/// A matched span (byte offsets) with the value built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub start: usize,
    pub end: usize,
    pub value: T,
}

pub trait Matcher<T>: Send + Sync {
    /// Short name used in logs.
    fn label(&self) -> &'static str;

    /// The first candidate starting at or after byte offset `from`.
    fn match_at(&self, text: &str, from: usize) -> Option<Candidate<T>>;
}

/// Builds a value from a regex match, or rejects it.
pub type Build<T> = Box<dyn Fn(&Captures<'_>) -> Option<T> + Send + Sync>;

/// A matcher driven by one regex plus a builder that may veto matches.
pub struct RegexMatcher<T> {
    label: &'static str,
    regex: Regex,
    build: Build<T>,
}

impl<T> RegexMatcher<T> {
    pub fn new(
        label: &'static str,
        regex: Regex,
        build: impl Fn(&Captures<'_>) -> Option<T> + Send + Sync + 'static,
    ) -> Self {
        Self { label, regex, build: Box::new(build) }
    }
}

impl<T: Send + Sync> Matcher<T> for RegexMatcher<T> {
    fn label(&self) -> &'static str {
        self.label
    }

    fn match_at(&self, text: &str, from: usize) -> Option<Candidate<T>> {
        let mut pos = from;
        while pos <= text.len() {
            let caps = self.regex.captures_at(text, pos)?;
            let whole = caps.get(0)?;
            if let Some(value) = (self.build)(&caps) {
                if whole.end() > whole.start() {
                    return Some(Candidate { start: whole.start(), end: whole.end(), value });
                }
            }
            pos = next_boundary(text, whole.start());
        }
        None
    }
}

/// Smallest char boundary strictly after `pos`.
pub(crate) fn next_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Run `matchers` (highest priority first) over `text`.
pub fn scan<T>(text: &str, matchers: &[Box<dyn Matcher<T>>]) -> Vec<Candidate<T>> {
    // start -> end of every accepted span; accepted spans never overlap.
    let mut claimed: BTreeMap<usize, usize> = BTreeMap::new();
    let mut accepted = Vec::new();

    for matcher in matchers {
        let mut from = 0;
        let mut found = 0usize;
        while let Some(candidate) = matcher.match_at(text, from) {
            if let Some(claimed_end) = overlapping(&claimed, candidate.start, candidate.end) {
                // Resume past the claimed span when the candidate starts inside it,
                // otherwise just past the candidate's start.
                from = next_boundary(text, candidate.start);
                if claimed.range(..=candidate.start).next_back().is_some_and(|(_, &e)| e > candidate.start) {
                    from = from.max(claimed_end);
                }
                continue;
            }
            from = candidate.end.max(next_boundary(text, candidate.start));
            claimed.insert(candidate.start, candidate.end);
            accepted.push(candidate);
            found += 1;
        }
        tracing::trace!(matcher = matcher.label(), found, "matcher pass complete");
    }

    accepted.sort_by_key(|c| (c.start, c.end));
    accepted
}

/// End of the claimed span overlapping `[start, end)`, if any.
fn overlapping(claimed: &BTreeMap<usize, usize>, start: usize, end: usize) -> Option<usize> {
    claimed
        .range(..end)
        .next_back()
        .map(|(_, &claimed_end)| claimed_end)
        .filter(|&claimed_end| claimed_end > start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_matcher(label: &'static str, pattern: &str) -> Box<dyn Matcher<String>> {
        Box::new(RegexMatcher::new(label, Regex::new(pattern).unwrap(), |caps| {
            Some(caps[0].to_string())
        }))
    }

    #[test]
    fn test_higher_priority_claims_overlap() {
        let matchers = vec![word_matcher("long", r"abc\d"), word_matcher("short", r"c\d+")];
        let found = scan("abc1 c22", &matchers);
        let values: Vec<&str> = found.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["abc1", "c22"]);
    }

    #[test]
    fn test_results_sorted_by_position() {
        let matchers = vec![word_matcher("b", r"b+"), word_matcher("a", r"a+")];
        let found = scan("aa bb aa", &matchers);
        let starts: Vec<usize> = found.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 3, 6]);
    }

    #[test]
    fn test_builder_rejection_moves_on() {
        let even: Box<dyn Matcher<u32>> = Box::new(RegexMatcher::new(
            "even",
            Regex::new(r"\d+").unwrap(),
            |caps| caps[0].parse::<u32>().ok().filter(|n| n % 2 == 0),
        ));
        let found = scan("3 15 7 8", &[even]);
        let values: Vec<u32> = found.iter().map(|c| c.value).collect();
        // "15" and its suffix "5" are both rejected; scanning continues to "8".
        assert_eq!(values, vec![8]);
        assert_eq!(found[0].start, 7);
    }

    #[test]
    fn test_skipped_candidate_does_not_hide_later_match() {
        let matchers = vec![word_matcher("outer", r"<<\w+>>"), word_matcher("inner", r"<[^<>]+>")];
        let found = scan("<<ab>> x <cd>", &matchers);
        let values: Vec<&str> = found.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["<<ab>>", "<cd>"]);
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let matchers = vec![word_matcher("x", r"x")];
        let found = scan("éxü x", &matchers);
        assert_eq!(found.len(), 2);
    }
}
