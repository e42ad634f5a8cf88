//! Analysis configuration: size guard and extraction knobs.
//!
//! Every field has a default, so a partial TOML table (or none at all)
//! yields a working configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by the extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

// ── Limits ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Documents longer than this (in characters) are rejected up front.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_document_chars: default_max_document_chars() }
    }
}

fn default_max_document_chars() -> usize { 2_000_000 }

// ── Extraction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Upper bound on figure/table caption length.
    #[serde(default = "default_caption_max_chars")]
    pub caption_max_chars: usize,

    #[serde(default = "default_keyword_top_k")]
    pub keyword_top_k: usize,

    /// Tokens shorter than this never become keywords.
    #[serde(default = "default_keyword_min_token_len")]
    pub keyword_min_token_len: usize,

    /// Added to the built-in stopword list.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    /// Numbered-citation ranges wider than this keep only their endpoints.
    #[serde(default = "default_max_citation_range_span")]
    pub max_citation_range_span: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            caption_max_chars: default_caption_max_chars(),
            keyword_top_k: default_keyword_top_k(),
            keyword_min_token_len: default_keyword_min_token_len(),
            extra_stopwords: Vec::new(),
            max_citation_range_span: default_max_citation_range_span(),
        }
    }
}

fn default_caption_max_chars()       -> usize { 300 }
fn default_keyword_top_k()           -> usize { 20 }
fn default_keyword_min_token_len()   -> usize { 3 }
fn default_max_citation_range_span() -> u32 { 50 }
