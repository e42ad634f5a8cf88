//! Mathematical content detection.
//!
//! Delimited math is recognised exactly; the `plain` family is a line-level
//! heuristic (`token = expression`, `f(args) <= value`) with a known error
//! rate. No expression parsing is attempted. Each equation carries a
//! heuristic reading from [`crate::interpret`].

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use paperlens_common::document::RawDocument;
use paperlens_common::entities::{Equation, EquationKind};

use crate::interpret::{interpret, nearby_text, CONTEXT_CHARS};
use crate::matcher::{scan, Matcher, RegexMatcher};

const MIN_EQUATION_CHARS: usize = 3;
const MAX_PLAIN_LINE_CHARS: usize = 120;

/// Alphabetic tokens that still read as math.
const MATH_WORDS: &[&str] = &[
    "sin", "cos", "tan", "log", "exp", "max", "min", "sum", "argmax", "argmin",
    "lim", "det", "sqrt", "mod", "softmax", "relu", "sigmoid", "tanh", "var", "cov",
];

lazy_static! {
    static ref DISPLAY_DOLLARS: Regex = Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap();
    static ref DISPLAY_BRACKETS: Regex = Regex::new(r"(?s)\\\[(.+?)\\\]").unwrap();
    static ref LATEX_BLOCK: Regex = Regex::new(
        r"(?s)\\begin\{(equation|align|gather|multline|eqnarray)(\*?)\}(.*?)\\end\{(equation|align|gather|multline|eqnarray)(\*?)\}"
    )
    .unwrap();
    static ref INLINE: Regex = Regex::new(r"\$([^$\n]+)\$").unwrap();
    static ref PLAIN: Regex = Regex::new(
        r"(?m)^[ \t]*([A-Za-z][A-Za-z0-9_']*(?:\([^()\n]{0,40}\))?[ \t]*(?:==|!=|<=|>=|=|<|>|≤|≥|≠|≈)[ \t]*[^\n]+?)[ \t]*(?:\(\d{1,3}\))?[ \t]*$"
    )
    .unwrap();
    static ref TOKEN: Regex = Regex::new(r"[A-Za-z]+|\d+(?:\.\d+)?|[^\sA-Za-z\d]").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
struct MathMatch {
    kind: EquationKind,
    text: String,
}

pub struct MathDetector {
    matchers: Vec<Box<dyn Matcher<MathMatch>>>,
}

impl Default for MathDetector {
    fn default() -> Self {
        let matchers: Vec<Box<dyn Matcher<MathMatch>>> = vec![
            Box::new(RegexMatcher::new("display_dollars", DISPLAY_DOLLARS.clone(), delimited(EquationKind::Display))),
            Box::new(RegexMatcher::new("display_brackets", DISPLAY_BRACKETS.clone(), delimited(EquationKind::Display))),
            Box::new(RegexMatcher::new("latex_block", LATEX_BLOCK.clone(), latex_block)),
            Box::new(RegexMatcher::new("inline", INLINE.clone(), delimited(EquationKind::Inline))),
            Box::new(RegexMatcher::new("plain", PLAIN.clone(), plain)),
        ];
        Self { matchers }
    }
}

impl MathDetector {
    pub fn detect(&self, doc: &RawDocument) -> Vec<Equation> {
        let mut seen = HashSet::new();
        let mut equations = Vec::new();

        for candidate in scan(doc.text(), &self.matchers) {
            let m = candidate.value;
            if m.text.chars().count() < MIN_EQUATION_CHARS {
                continue;
            }
            let position = doc.char_offset(candidate.start);
            let page_number = doc.pages().page_at(position);
            if !seen.insert((m.text.clone(), m.kind, page_number)) {
                continue;
            }
            let nearby = nearby_text(doc.text(), candidate.start, candidate.end, CONTEXT_CHARS);
            let reading = interpret(&m.text, nearby);
            equations.push(Equation {
                text: m.text,
                kind: m.kind,
                page_number,
                position,
                topic: None,
                meaning: reading.meaning.to_string(),
                impact: reading.impact.to_string(),
            });
        }

        debug!(equations = equations.len(), "math detection complete");
        equations
    }
}

fn delimited(kind: EquationKind) -> impl Fn(&Captures<'_>) -> Option<MathMatch> + Send + Sync + 'static {
    move |caps: &Captures<'_>| Some(MathMatch { kind, text: caps.get(1)?.as_str().trim().to_string() })
}

fn latex_block(caps: &Captures<'_>) -> Option<MathMatch> {
    // begin/end environment names must agree, starred forms included
    if caps.get(1)?.as_str() != caps.get(4)?.as_str() || caps.get(2)?.as_str() != caps.get(5)?.as_str() {
        return None;
    }
    Some(MathMatch {
        kind: EquationKind::LatexBlock,
        text: caps.get(3)?.as_str().trim().to_string(),
    })
}

fn plain(caps: &Captures<'_>) -> Option<MathMatch> {
    let whole = caps.get(0)?.as_str();
    if whole.trim().chars().count() > MAX_PLAIN_LINE_CHARS {
        return None;
    }
    let expr = caps.get(1)?.as_str().trim();
    if looks_like_prose(expr) {
        return None;
    }
    Some(MathMatch { kind: EquationKind::Plain, text: expr.to_string() })
}

/// More than half of the right-hand tokens are ordinary words.
pub fn looks_like_prose(expr: &str) -> bool {
    let rhs = match expr.find(['=', '<', '>', '≤', '≥', '≠', '≈']) {
        Some(idx) => &expr[idx..],
        None => expr,
    };
    let tokens: Vec<&str> = TOKEN.find_iter(rhs).map(|m| m.as_str()).collect();
    if tokens.is_empty() {
        return true;
    }
    let wordy = tokens
        .iter()
        .filter(|t| t.len() >= 3 && t.chars().all(|c| c.is_ascii_alphabetic()))
        .filter(|t| {
            let lower = t.to_lowercase();
            !MATH_WORDS.iter().any(|w| *w == lower)
        })
        .count();
    wordy * 2 > tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect(text: &str) -> Vec<Equation> {
        MathDetector::default().detect(&RawDocument::from_text(text))
    }

    fn kinds(eqs: &[Equation]) -> Vec<EquationKind> {
        eqs.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_display_beats_inline() {
        let eqs = detect("We have $$E = mc^2$$ and also $a+b$ here.");
        assert_eq!(kinds(&eqs), vec![EquationKind::Display, EquationKind::Inline]);
        assert_eq!(eqs[0].text, "E = mc^2");
        assert_eq!(eqs[1].text, "a+b");
    }

    #[test]
    fn test_latex_block_and_bracket_display() {
        let text = "\\begin{align*}\nx &= y + 1\n\\end{align*}\nThen \\[ f(x) = x^2 \\] holds.";
        let eqs = detect(text);
        assert_eq!(kinds(&eqs), vec![EquationKind::LatexBlock, EquationKind::Display]);
        assert_eq!(eqs[0].text, "x &= y + 1");
    }

    #[test]
    fn test_mismatched_environment_rejected() {
        let eqs = detect("\\begin{equation}\na = b + c\n\\end{align}");
        assert!(eqs.iter().all(|e| e.kind != EquationKind::LatexBlock));
    }

    #[test]
    fn test_plain_equations() {
        let eqs = detect("The loss is defined below.\nL = sum(y - p)^2 (3)\nf(x) <= 0.5\n");
        assert_eq!(kinds(&eqs), vec![EquationKind::Plain, EquationKind::Plain]);
        assert_eq!(eqs[0].text, "L = sum(y - p)^2");
        assert_eq!(eqs[1].text, "f(x) <= 0.5");
    }

    #[test]
    fn test_prose_with_equals_is_rejected() {
        assert!(detect("Result = the model performed better than expected overall\n").is_empty());
        assert!(looks_like_prose("x = the value of things"));
        assert!(!looks_like_prose("y = max(a, b) + 1"));
    }

    #[test]
    fn test_equations_carry_a_reading() {
        let text = "We minimise the cross-entropy of the labels.\n$$L = -\\sum_i y_i \\log p_i$$\nThe update is f(x) <= 0.5 elsewhere.";
        let eqs = detect(text);
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs[0].meaning, interpret(&eqs[0].text, text).meaning);
        assert!(eqs[0].meaning.starts_with("Cross-entropy"));
        assert!(!eqs[0].impact.is_empty());
        assert_eq!(eqs[0].topic, None);
    }

    #[test]
    fn test_short_and_duplicate_equations_dropped() {
        let eqs = detect("$x$ then $a+b$ and again $a+b$.");
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs[0].text, "a+b");
    }
}
