//! Keyword and key-phrase extraction.
//!
//! RAKE-style: candidate phrases are maximal runs of non-stopword tokens,
//! collected from weighted text pools (title, abstract, introduction,
//! conclusion, full text). Word scores are `(degree + frequency) / frequency`;
//! a phrase scores the sum of its word scores scaled by pool weight, a length
//! band favouring 1–3 word phrases, repetition, and a capitalisation bonus.
//! Author-declared keywords ("Keywords: ...") outrank everything computed;
//! acronyms fill any remaining slots.

use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use paperlens_common::config::ExtractionConfig;
use paperlens_common::entities::{Keyword, SectionMap, SectionName};

const MAX_PHRASE_WORDS: usize = 3;
const TITLE_WEIGHT: f64 = 3.0;
const ABSTRACT_WEIGHT: f64 = 2.5;
const INTRODUCTION_WEIGHT: f64 = 1.5;
const CONCLUSION_WEIGHT: f64 = 1.3;
const TEXT_WEIGHT: f64 = 1.0;
const PHRASE_DELIMITERS: [char; 12] = ['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '"', '\n'];
const CAPITALISED_BONUS: f64 = 0.3;
const ACRONYM_BONUS: f64 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "when", "while", "where",
    "with", "without", "within", "between", "among", "into", "onto", "through", "across",
    "from", "over", "under", "above", "below", "around", "about", "before", "after",
    "first", "second", "third", "fourth", "fifth", "last", "former", "latter", "new", "old",
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "per",
    "each", "every", "many", "several", "various", "other", "another", "any", "all", "both",
    "few", "more", "most", "some", "such", "same", "different", "similar", "varied",
    "we", "you", "they", "he", "she", "it", "our", "your", "their", "its", "his", "her",
    "who", "whom", "whose", "which", "that", "this", "these", "those", "there", "here",
    "been", "being", "was", "were", "are", "is", "am", "be", "have", "has", "had", "having",
    "do", "does", "did", "doing", "also", "however", "therefore", "furthermore", "moreover",
    "because", "since", "although", "though", "whereas", "yet", "besides", "overall",
    "research", "paper", "study", "article", "work", "result", "results", "finding",
    "findings", "approach", "approaches", "method", "methods", "analysis", "data", "dataset",
    "datasets", "model", "models", "system", "systems", "figure", "figures", "table", "tables",
    "section", "sections", "introduction", "related", "conclusion", "discussion",
    "abstract", "summary", "contributions", "overview", "proposed", "presented", "including",
    "via", "based", "using", "use", "used", "according", "towards", "toward",
    "amongst", "throughout", "whereby", "whichever", "whenever", "can", "could", "may",
    "might", "must", "shall", "should", "will", "would", "not", "for", "than", "only",
    "very", "well", "thus", "hence", "show", "shows", "shown", "paper", "propose",
];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[A-Za-z][A-Za-z0-9\-]+").unwrap();
    static ref ACRONYM: Regex = Regex::new(r"\b[A-Z]{2,}[A-Z\d]*\b").unwrap();
    static ref DECLARED: Vec<Regex> = vec![
        Regex::new(r"(?i)^keywords?\s*[:\-\u{2014}]\s*(.+)").unwrap(),
        Regex::new(r"(?i)^index\s+terms?\s*[:\-\u{2014}]\s*(.+)").unwrap(),
        Regex::new(r"(?i)^key\s+phrases?\s*[:\-\u{2014}]\s*(.+)").unwrap(),
    ];
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

#[derive(Debug, Default)]
struct PhraseStats {
    display: String,
    words: usize,
    weight: f64,
    count: usize,
    capitalised: usize,
    /// Occurrences in the full-text pool only.
    text_count: usize,
}

#[derive(Default)]
struct Accumulator {
    word_freq: HashMap<String, f64>,
    word_degree: HashMap<String, f64>,
    phrases: BTreeMap<String, PhraseStats>,
}

pub struct KeywordExtractor {
    stopwords: HashSet<String>,
    min_token_len: usize,
    top_k: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl KeywordExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let mut stopwords: HashSet<String> = STOPWORDS.iter().map(|w| w.to_string()).collect();
        stopwords.extend(config.extra_stopwords.iter().map(|w| w.to_lowercase()));
        Self {
            stopwords,
            min_token_len: config.keyword_min_token_len,
            top_k: config.keyword_top_k,
        }
    }

    /// Top-K keywords for a document, best first.
    pub fn extract(&self, text: &str, title: Option<&str>, sections: &SectionMap) -> Vec<Keyword> {
        if text.trim().is_empty() || self.top_k == 0 {
            return Vec::new();
        }

        let mut acc = Accumulator::default();
        let pools = [
            (title.unwrap_or(""), TITLE_WEIGHT, false),
            (sections.text(SectionName::Abstract), ABSTRACT_WEIGHT, false),
            (sections.text(SectionName::Introduction), INTRODUCTION_WEIGHT, false),
            (sections.text(SectionName::Conclusion), CONCLUSION_WEIGHT, false),
            (text, TEXT_WEIGHT, true),
        ];
        for (pool, weight, is_full_text) in pools {
            self.process_pool(&mut acc, pool, weight, is_full_text);
        }

        let word_scores: HashMap<&str, f64> = acc
            .word_freq
            .iter()
            .map(|(w, &freq)| {
                let degree = acc.word_degree.get(w).copied().unwrap_or(0.0);
                (w.as_str(), (degree + freq) / freq)
            })
            .collect();

        let mut ranked: Vec<(String, f64, usize)> = acc
            .phrases
            .iter()
            .filter(|(_, p)| p.words <= MAX_PHRASE_WORDS)
            .map(|(key, p)| {
                let base: f64 = key.split(' ').map(|w| word_scores.get(w).copied().unwrap_or(0.0)).sum();
                let band = 1.0 + 0.15 * (p.words as f64 - 1.0);
                let repetition = ((p.count + 1) as f64).ln_1p();
                let bonus = 1.0 + CAPITALISED_BONUS * p.capitalised as f64 / p.count.max(1) as f64;
                (p.display.clone(), base * p.weight * band * repetition * bonus, p.text_count)
            })
            .collect();
        sort_ranked(&mut ranked);

        let top_score = ranked.first().map(|r| r.1).unwrap_or(1.0);
        let lower_text = text.to_lowercase();
        let mut picked = Picker::new(self.top_k);

        let mut declared: Vec<(String, f64, usize)> = declared_keywords(text)
            .into_iter()
            .map(|kw| {
                let key = normalise(&kw);
                let own = ranked
                    .iter()
                    .find(|r| normalise(&r.0) == key)
                    .map(|r| r.1)
                    .unwrap_or(0.0);
                let freq = lower_text.matches(&kw.to_lowercase()).count();
                (kw, top_score + own, freq)
            })
            .collect();
        sort_ranked(&mut declared);
        for (term, score, freq) in declared {
            picked.push(&term, score, freq);
        }
        for (term, score, freq) in &ranked {
            picked.push(term, *score, *freq);
        }

        if !picked.full() {
            let mut acronyms: HashMap<String, (f64, usize)> = HashMap::new();
            let pools = [
                (title.unwrap_or(""), 2.0, false),
                (sections.text(SectionName::Abstract), 2.0, false),
                (text, 1.0, true),
            ];
            for (pool, weight, is_full_text) in pools {
                for m in ACRONYM.find_iter(pool) {
                    if m.as_str().len() <= 2 {
                        continue;
                    }
                    let entry = acronyms.entry(m.as_str().to_string()).or_default();
                    entry.0 += weight;
                    if is_full_text {
                        entry.1 += 1;
                    }
                }
            }
            let mut acronyms: Vec<(String, f64, usize)> = acronyms
                .into_iter()
                .map(|(term, (weight, freq))| (term, weight * (1.0 + ACRONYM_BONUS), freq))
                .collect();
            sort_ranked(&mut acronyms);
            for (term, score, freq) in acronyms {
                picked.push(&term, score, freq);
            }
        }

        let keywords = picked.finish();
        debug!(keywords = keywords.len(), "keyword extraction complete");
        keywords
    }

    fn process_pool(&self, acc: &mut Accumulator, pool: &str, weight: f64, is_full_text: bool) {
        let mut current: Vec<&str> = Vec::new();
        let mut last_end = 0;
        for m in WORD.find_iter(pool) {
            let token = m.as_str();
            let lower = token.to_lowercase();
            // Punctuation between tokens ends the running phrase.
            if pool[last_end..m.start()].contains(PHRASE_DELIMITERS) {
                register_phrase(acc, &current, weight, is_full_text);
                current.clear();
            }
            last_end = m.end();
            if self.stopwords.contains(&lower) || lower.chars().count() < self.min_token_len {
                register_phrase(acc, &current, weight, is_full_text);
                current.clear();
            } else {
                current.push(token);
            }
        }
        register_phrase(acc, &current, weight, is_full_text);
    }
}

fn register_phrase(acc: &mut Accumulator, tokens: &[&str], weight: f64, is_full_text: bool) {
    if tokens.is_empty() {
        return;
    }
    if tokens.len() == 1 && tokens[0].chars().count() < 4 {
        return;
    }
    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let key = lowered.join(" ");
    if key.chars().filter(|c| c.is_alphabetic()).count() < 4 {
        return;
    }

    let capitalised = tokens.iter().all(|t| t.chars().next().is_some_and(char::is_uppercase));
    let entry = acc.phrases.entry(key).or_insert_with(|| PhraseStats {
        display: tokens.join(" "),
        words: tokens.len(),
        ..Default::default()
    });
    entry.weight += weight;
    entry.count += 1;
    if capitalised {
        entry.capitalised += 1;
    }
    if is_full_text {
        entry.text_count += 1;
    }

    let degree = weight * (tokens.len() as f64 - 1.0);
    for word in lowered {
        *acc.word_freq.entry(word.clone()).or_default() += weight;
        *acc.word_degree.entry(word).or_default() += degree;
    }
}

/// Score descending, then term ascending.
fn sort_ranked(items: &mut [(String, f64, usize)]) {
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Accepts keywords in rank order, skipping normalised duplicates.
struct Picker {
    limit: usize,
    seen: HashSet<String>,
    out: Vec<Keyword>,
}

impl Picker {
    fn new(limit: usize) -> Self {
        Self { limit, seen: HashSet::new(), out: Vec::new() }
    }

    fn full(&self) -> bool {
        self.out.len() >= self.limit
    }

    fn push(&mut self, term: &str, score: f64, frequency: usize) {
        if self.full() {
            return;
        }
        let words = term.split_whitespace().count();
        if words == 0 || words > MAX_PHRASE_WORDS {
            return;
        }
        let key = normalise(term);
        if key.is_empty() || !self.seen.insert(key) {
            return;
        }
        // Scores never rise down the ranking.
        let score = match self.out.last() {
            Some(prev) => score.min(prev.score),
            None => score,
        };
        self.out.push(Keyword {
            term: title_case(term),
            frequency,
            score,
            rank: self.out.len() + 1,
        });
    }

    fn finish(self) -> Vec<Keyword> {
        self.out
    }
}

/// Author-declared keywords ("Keywords:", "Index Terms:", "Key phrases:").
pub fn declared_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(list) = DECLARED.iter().find_map(|re| re.captures(line)).and_then(|c| c.get(1)) else {
            continue;
        };
        for raw in list.as_str().split([';', ',']) {
            let candidate = raw.trim().trim_end_matches(['.', ';', ':']).trim();
            if candidate.chars().count() < 3 || candidate.split_whitespace().count() > MAX_PHRASE_WORDS {
                continue;
            }
            if seen.insert(candidate.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()) {
                out.push(candidate.to_string());
            }
        }
    }
    out
}

fn normalise(term: &str) -> String {
    NON_ALNUM
        .replace_all(&term.to_lowercase(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case each word, keeping acronyms as written.
fn title_case(term: &str) -> String {
    term.split_whitespace()
        .map(|word| {
            let is_acronym = word.chars().count() > 1
                && word.chars().any(char::is_alphabetic)
                && !word.chars().any(char::is_lowercase);
            if is_acronym {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
