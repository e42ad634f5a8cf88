//! Paperlens — structural analysis and completeness scoring for academic papers.
//! Entry point for the command-line binary.

mod commands;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::ConfigSource;

#[derive(Debug, Parser)]
#[command(name = "paperlens", version, about = "Analyse extracted paper text and score its completeness")]
struct Cli {
    /// Configuration file (defaults to $PAPERLENS_CONFIG, then ./paperlens.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paperlens=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Paperlens {}", env!("CARGO_PKG_VERSION"));

    let (config, source) = config::Config::load(cli.config.as_deref())?;
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigSource::Defaults => info!("no configuration file; using defaults"),
    }

    let output = commands::execute(&cli.command, &config)?;
    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}
