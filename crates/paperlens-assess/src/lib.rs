//! paperlens-assess — Completeness scoring engine.
//! Turns an `AnalysisRecord` into an `AssessmentReport`: four weighted
//! sub-scores, rule-driven missing-content items, and (in comprehensive
//! mode) qualitative strengths, weaknesses and recommendations.

pub mod config;
pub mod engine;
pub mod field;
pub mod quality;
pub mod rules;
pub mod weights;

pub use config::{QualityThresholds, ScoringConfig};
pub use engine::Assessor;
pub use rules::{RuleTable, TopicRule};
pub use weights::{Deductions, ScoreWeights};
