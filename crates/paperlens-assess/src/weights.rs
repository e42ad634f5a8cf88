//! Sub-score weights and missing-content deductions.

use serde::{Deserialize, Serialize};

/// The 4-component weight vector applied to the raw sub-scores.
/// Weights sum to 1.0 so that the overall score stays within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Fraction of essential sections present
    pub structural: f64,
    /// Mean heuristic quality of present sections
    pub content_quality: f64,
    /// Citation count against the expected minimum
    pub citation_adequacy: f64,
    /// Deduction-based score from the expected-topic rules
    pub missing_content: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            structural:        0.25,
            content_quality:   0.25,
            citation_adequacy: 0.15,
            missing_content:   0.35,
        }
    }
}

impl ScoreWeights {
    fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Validate that all weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|w| *w >= 0.0) && (self.sum() - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0. Returns false when that is
    /// impossible (negative weights or a zero sum).
    pub fn normalise(&mut self) -> bool {
        let sum = self.sum();
        if sum <= 0.0 || self.as_array().iter().any(|w| *w < 0.0) {
            return false;
        }
        self.structural        /= sum;
        self.content_quality   /= sum;
        self.citation_adequacy /= sum;
        self.missing_content   /= sum;
        true
    }

    /// Convert to array for iteration.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.structural,
            self.content_quality,
            self.citation_adequacy,
            self.missing_content,
        ]
    }
}

/// Points removed from the missing-content sub-score per item, by tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    pub critical: f64,
    pub important: f64,
    pub beneficial: f64,
}

impl Default for Deductions {
    fn default() -> Self {
        Self { critical: 15.0, important: 10.0, beneficial: 5.0 }
    }
}

impl Deductions {
    /// `max(0, 100 − Σ deduction)`.
    pub fn score(&self, critical: usize, important: usize, beneficial: usize) -> f64 {
        let lost = self.critical * critical as f64
            + self.important * important as f64
            + self.beneficial * beneficial as f64;
        (100.0 - lost).max(0.0)
    }
}
