//! Configuration loading for Paperlens.
//! Reads the path given with `--config`, else the path in the PAPERLENS_CONFIG
//! env var, else paperlens.toml from the current directory. With none of
//! those present the built-in defaults apply.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::Context;
use paperlens_assess::ScoringConfig;
use paperlens_common::config::{AnalysisConfig, ExtractionConfig, LimitsConfig};

pub const CONFIG_ENV: &str = "PAPERLENS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "paperlens.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Where a configuration came from; logged at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

mod tests;

impl Config {
    /// Load configuration. An explicit path (flag or env var) must exist;
    /// a missing paperlens.toml just means defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, ConfigSource)> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let explicit = explicit.map(Path::to_path_buf).or(from_env);

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok((Self::default(), ConfigSource::Defaults));
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.resolve_paths(path.parent().unwrap_or(Path::new(".")));
        Ok((config, ConfigSource::File(path)))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Relative rule-table paths are relative to the config file.
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(rules) = self.scoring.rules_path.as_mut() {
            if rules.is_relative() {
                *rules = base.join(&*rules);
            }
        }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            limits: self.limits.clone(),
            extraction: self.extraction.clone(),
        }
    }
}
