//! Scoring configuration: thresholds, weights, deductions and the optional
//! rule-table override. Mirrors the `[scoring]` TOML table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::weights::{Deductions, ScoreWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Citation count at which citation adequacy reaches 100.
    #[serde(default = "default_expected_citations")]
    pub expected_citations: usize,

    /// Section quality at or above this is reported as a strength.
    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: f64,

    /// Section quality below this is reported as a weakness.
    #[serde(default = "default_weakness_threshold")]
    pub weakness_threshold: f64,

    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// TOML rule table replacing the built-in one.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    #[serde(default)]
    pub weights: ScoreWeights,

    #[serde(default)]
    pub deductions: Deductions,

    #[serde(default)]
    pub quality: QualityThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            expected_citations: default_expected_citations(),
            strength_threshold: default_strength_threshold(),
            weakness_threshold: default_weakness_threshold(),
            max_recommendations: default_max_recommendations(),
            rules_path: None,
            weights: ScoreWeights::default(),
            deductions: Deductions::default(),
            quality: QualityThresholds::default(),
        }
    }
}

fn default_expected_citations()  -> usize { 10 }
fn default_strength_threshold()  -> f64 { 70.0 }
fn default_weakness_threshold()  -> f64 { 40.0 }
fn default_max_recommendations() -> usize { 10 }

// ── Section quality ──────────────────────────────────────────────────────────

/// Length tiers (in characters of trimmed section text) and the marker
/// count that earns the full marker component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Shorter sections count as absent.
    #[serde(default = "default_present_min_chars")]
    pub present_min_chars: usize,

    #[serde(default = "default_short_chars")]
    pub short_chars: usize,

    #[serde(default = "default_adequate_chars")]
    pub adequate_chars: usize,

    #[serde(default = "default_substantial_chars")]
    pub substantial_chars: usize,

    #[serde(default = "default_marker_target")]
    pub marker_target: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            present_min_chars: default_present_min_chars(),
            short_chars: default_short_chars(),
            adequate_chars: default_adequate_chars(),
            substantial_chars: default_substantial_chars(),
            marker_target: default_marker_target(),
        }
    }
}

fn default_present_min_chars() -> usize { 50 }
fn default_short_chars()       -> usize { 100 }
fn default_adequate_chars()    -> usize { 200 }
fn default_substantial_chars() -> usize { 500 }
fn default_marker_target()     -> usize { 2 }
