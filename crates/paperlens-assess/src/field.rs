//! Research-field inference and field-name canonicalisation.
//!
//! Inference counts field keyword hits over the title and section text. The
//! highest count wins; ties go to the field listed first, and a document with
//! no hits at all is assigned the default field.

use std::sync::OnceLock;

use regex::Regex;

use paperlens_common::entities::AnalysisRecord;

pub const DEFAULT_FIELD: &str = "Computer Science";

/// Field name, keyword stems, and the aliases that name the same field.
const FIELDS: &[(&str, &[&str], &[&str])] = &[
    (
        "Computer Science",
        &[
            "algorithm", "neural network", "machine learning", "deep learning", "dataset",
            "software", "computational", "artificial intelligence", "training", "benchmark",
        ],
        &["computer science", "cs", "machine learning", "ml", "artificial intelligence", "ai"],
    ),
    (
        "Medicine",
        &[
            "patient", "clinical", "treatment", "disease", "hospital", "diagnos", "therap",
            "medical", "drug trial", "cohort",
        ],
        &["medicine", "medical", "clinical medicine", "health", "healthcare"],
    ),
    (
        "Biology",
        &["cell", "gene", "protein", "organism", "species", "dna", "rna", "enzyme", "genom"],
        &["biology", "life sciences", "bioinformatics"],
    ),
    (
        "Physics",
        &[
            "quantum", "particle", "momentum", "magnetic", "photon", "relativity",
            "thermodynamic", "electron", "hamiltonian",
        ],
        &["physics", "applied physics"],
    ),
    (
        "Mathematics",
        &["theorem", "lemma", "proof", "corollary", "conjecture", "topolog", "algebra"],
        &["mathematics", "math", "maths", "applied mathematics"],
    ),
    (
        "Engineering",
        &[
            "prototype", "circuit", "mechanical", "sensor", "manufactur", "control system",
            "actuator", "load test",
        ],
        &["engineering"],
    ),
];

fn field_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FIELDS
            .iter()
            .map(|(name, stems, _)| {
                let alternation = stems.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|");
                (*name, Regex::new(&format!(r"(?i)\b(?:{alternation})")).unwrap())
            })
            .collect()
    })
}

/// Best-matching field for a record's title and section text.
pub fn infer_field(record: &AnalysisRecord) -> &'static str {
    let mut haystack = record.title.clone().unwrap_or_default();
    haystack.push('\n');
    haystack.push_str(&record.sections.full_text());
    infer_field_from_text(&haystack)
}

pub fn infer_field_from_text(text: &str) -> &'static str {
    let mut best = (DEFAULT_FIELD, 0usize);
    for (name, pattern) in field_patterns() {
        let hits = pattern.find_iter(text).count();
        if hits > best.1 {
            best = (*name, hits);
        }
    }
    best.0
}

/// Canonical field name for a user-supplied name or alias.
pub fn canonical_field(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    FIELDS
        .iter()
        .find(|(field, _, aliases)| field.to_lowercase() == lower || aliases.iter().any(|a| *a == lower))
        .map(|(field, _, _)| *field)
}

/// True when two field names refer to the same field.
pub fn same_field(a: &str, b: &str) -> bool {
    match (canonical_field(a), canonical_field(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infers_medicine_from_clinical_text() {
        let text = "Patients in the clinical cohort received treatment; disease progression was tracked.";
        assert_eq!(infer_field_from_text(text), "Medicine");
    }

    #[test]
    fn test_no_hits_falls_back_to_default() {
        assert_eq!(infer_field_from_text("Nothing domain specific here."), DEFAULT_FIELD);
    }

    #[test]
    fn test_tie_goes_to_first_listed_field() {
        // one Computer Science hit, one Biology hit
        assert_eq!(infer_field_from_text("an algorithm for every protein"), "Computer Science");
    }

    #[test]
    fn test_aliases_canonicalise() {
        assert_eq!(canonical_field("ML"), Some("Computer Science"));
        assert_eq!(canonical_field(" medicine "), Some("Medicine"));
        assert_eq!(canonical_field("Astrology"), None);
        assert!(same_field("AI", "computer science"));
        assert!(same_field("Astrology", "astrology"));
        assert!(!same_field("Physics", "Biology"));
    }
}
