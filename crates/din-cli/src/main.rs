//! DIN 8580 CLI - Command-line interface
//!
//! Usage:
//!   din8580 extract --source <path|url> --out-json <path>
//!   din8580 render --in-json <path> --out-html <path>
//!
//! Logs go to stderr; stdout carries only the run summary.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use din_core::{AppConfig, LoggingConfig};
use din_extractor::Extractor;
use din_render::{page_summary, Renderer};

#[derive(Parser)]
#[command(name = "din8580")]
#[command(about = "DIN 8580 manufacturing process taxonomy: OWL to JSON tree to interactive HTML")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "debug" or "din_extractor=trace"); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the class hierarchy of an OWL ontology into a JSON tree
    Extract {
        /// Local file path or http(s) URL of the ontology
        #[arg(long)]
        source: String,

        /// Destination of the JSON tree
        #[arg(long)]
        out_json: PathBuf,
    },
    /// Render a JSON tree as a self-contained interactive HTML page
    Render {
        /// JSON tree written by `extract`
        #[arg(long)]
        in_json: PathBuf,

        /// Destination of the HTML page
        #[arg(long)]
        out_html: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging, cli.log_level.as_deref());

    match cli.command {
        Commands::Extract { source, out_json } => {
            let extraction = Extractor::new(config.extract)
                .run(&source, &out_json)
                .await
                .with_context(|| format!("extraction of {source} failed"))?;

            tracing::info!(
                source = %source,
                out_json = %out_json.display(),
                classes = extraction.stats.class_count,
                "extract finished"
            );
            println!("Wrote JSON: {}", out_json.display());
            println!("{}", extraction.stats);
        }
        Commands::Render { in_json, out_html } => {
            let summary = Renderer::new(config.render)
                .run(&in_json, &out_html)
                .with_context(|| format!("rendering of {} failed", in_json.display()))?;

            tracing::info!(
                in_json = %in_json.display(),
                out_html = %out_html.display(),
                nodes = summary.stats.node_count,
                "render finished"
            );
            println!("Wrote HTML: {}", out_html.display());
            println!("{}", page_summary(&summary.stats));
        }
    }

    Ok(())
}

/// Defaults, then the config file if given, then environment variables
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override(),
        None => AppConfig::from_env(),
    };
    config.context("invalid configuration")
}

fn init_tracing(logging: &LoggingConfig, cli_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = cli_level.unwrap_or(&logging.level);
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
