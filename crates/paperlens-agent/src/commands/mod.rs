//! Subcommands of the `paperlens` binary.
//!
//! Every command analyses one or more input files and renders a JSON view
//! of the result. Files are processed in parallel; output keeps input order.
//! A single file yields a single JSON value, several files a JSON array.

pub mod input;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use rayon::prelude::*;
use serde_json::{json, Value};
use tracing::info;

use paperlens_assess::Assessor;
use paperlens_common::entities::AnalysisRecord;
use paperlens_common::report::AssessmentMode;
use paperlens_ingestion::Analyzer;

use crate::config::Config;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Score completeness and list missing content
    Assess {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// quick | comprehensive
        #[arg(long, default_value = "comprehensive")]
        mode: AssessmentMode,
        /// Research field; inferred from the text when omitted
        #[arg(long)]
        field: Option<String>,
    },
    /// Canonical sections, for downstream summarisation
    Sections {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// In-text citations and the parsed reference list
    Citations {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Figure and table captions with page numbers
    Figures {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Detected equations
    Math {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ranked keywords
    Keywords {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// The full analysis record
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        field: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Assess { .. }    => "assess",
            Command::Sections { .. }  => "sections",
            Command::Citations { .. } => "citations",
            Command::Figures { .. }   => "figures",
            Command::Math { .. }      => "math",
            Command::Keywords { .. }  => "keywords",
            Command::Analyze { .. }   => "analyze",
        }
    }

    fn files(&self) -> &[PathBuf] {
        match self {
            Command::Assess { files, .. }
            | Command::Sections { files }
            | Command::Citations { files }
            | Command::Figures { files }
            | Command::Math { files }
            | Command::Keywords { files }
            | Command::Analyze { files, .. } => files,
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            Command::Assess { field, .. } | Command::Analyze { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// Shared, read-only engines for one invocation.
pub struct Engines {
    analyzer: Analyzer,
    assessor: Option<Assessor>,
}

impl Engines {
    pub fn new(command: &Command, config: &Config) -> Result<Self> {
        let analyzer = Analyzer::new(&config.analysis());
        // Only assessment needs the rule table.
        let assessor = match command {
            Command::Assess { .. } => Some(
                Assessor::from_config(config.scoring.clone()).context("Failed to build assessment engine")?,
            ),
            _ => None,
        };
        Ok(Self { analyzer, assessor })
    }
}

pub fn execute(command: &Command, config: &Config) -> Result<Value> {
    let engines = Engines::new(command, config)?;
    let files = command.files();
    info!(command = command.name(), files = files.len(), "running");

    let mut outputs = files
        .par_iter()
        .map(|path| run_one(command, &engines, path))
        .collect::<Result<Vec<Value>>>()?;

    Ok(if outputs.len() == 1 {
        outputs.remove(0)
    } else {
        Value::Array(outputs)
    })
}

fn run_one(command: &Command, engines: &Engines, path: &Path) -> Result<Value> {
    let doc = input::load_document(path)?;
    let record = engines
        .analyzer
        .analyze(&doc, command.field().map(str::to_string))
        .with_context(|| format!("Failed to analyse {}", path.display()))?;
    render(command, engines, &record)
}

/// JSON view of one analysed document.
pub fn render(command: &Command, engines: &Engines, record: &AnalysisRecord) -> Result<Value> {
    let value = match command {
        Command::Assess { mode, .. } => {
            let assessor = engines
                .assessor
                .as_ref()
                .context("assessment engine not initialised")?;
            serde_json::to_value(assessor.assess(record, *mode))?
        }
        Command::Sections { .. } => json!({
            "title": record.title,
            "sections": record.sections,
        }),
        Command::Citations { .. } => serde_json::to_value(record.citation_report())?,
        Command::Figures { .. } => serde_json::to_value(record.figure_report())?,
        Command::Math { .. } => serde_json::to_value(record.math_report())?,
        Command::Keywords { .. } => json!({ "keywords": record.keywords }),
        Command::Analyze { .. } => serde_json::to_value(record)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_test_utils::{complete_paper, paper_pages};
    use pretty_assertions::assert_eq;

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("paperlens-cmd-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_assess_single_file_gives_object() {
        let path = write_fixture("single.txt", &complete_paper());
        let command = Command::Assess { files: vec![path], mode: AssessmentMode::Quick, field: None };
        let value = execute(&command, &Config::default()).unwrap();
        assert_eq!(value["mode"], "quick");
        assert_eq!(value["research_field"], "Computer Science");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_several_files_give_array_in_input_order() {
        let a = write_fixture("a.txt", &complete_paper());
        let b = write_fixture("b.txt", "");
        let command = Command::Assess { files: vec![a, b], mode: AssessmentMode::Comprehensive, field: None };
        let value = execute(&command, &Config::default()).unwrap();
        let reports = value.as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0]["overall_completeness_score"].as_f64().unwrap() > 0.0);
        assert_eq!(reports[1]["overall_completeness_score"].as_f64().unwrap(), 0.0);
    }

    #[test]
    fn test_figures_from_paged_text() {
        let path = write_fixture("paged.txt", &paper_pages().join("\u{c}"));
        let value = execute(&Command::Figures { files: vec![path] }, &Config::default()).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["tables"], 2);
        assert!(value["entries"].as_array().unwrap().iter().all(|e| e["page_number"] == 2));
    }

    #[test]
    fn test_sections_view_carries_title() {
        let path = write_fixture("sections.txt", &complete_paper());
        let value = execute(&Command::Sections { files: vec![path] }, &Config::default()).unwrap();
        assert_eq!(value["title"], "Graph Neural Networks for Molecular Property Prediction");
        assert!(value["sections"]["sections"]["methodology"]["text"].is_string());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let command = Command::Citations { files: vec![PathBuf::from("/nonexistent/paper.txt")] };
        assert!(execute(&command, &Config::default()).is_err());
    }

    #[test]
    fn test_oversize_document_is_an_error() {
        let path = write_fixture("big.txt", &complete_paper());
        let mut config = Config::default();
        config.limits.max_document_chars = 100;
        let err = execute(&Command::Math { files: vec![path] }, &config).unwrap_err();
        assert!(format!("{err:#}").contains("too large"));
    }
}
