//! paperlens-common — Shared types, errors, and configuration used across all Paperlens crates.

pub mod error;
pub mod document;
pub mod entities;
pub mod report;
pub mod config;

// Re-export commonly used types
pub use config::{AnalysisConfig, ExtractionConfig, LimitsConfig};
pub use document::{OffsetIndex, PageBreak, PageMap, RawDocument};
pub use error::{PaperlensError, Result};
