//! casedesk Control - CLI client for the complaint dashboard
//!
//! Transforms local exports and shows the daemon's current snapshot.

use anyhow::{Context, Result};
use casedesk_common::config::load_config;
use casedeskctl::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "casedeskctl")]
#[command(about = "casedesk - complaint dashboard control", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to $CASEDESK_CONFIG or /etc/casedesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and aggregate a local export file
    Transform {
        /// Delimiter-separated export (same dialect as the configured source)
        file: PathBuf,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the daemon's current snapshot
    Snapshot {
        /// Snapshot endpoint (defaults to the configured server address)
        #[arg(long)]
        url: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    let output = match cli.command {
        Commands::Transform { file, json } => commands::transform_file(&file, &config, json)?,
        Commands::Snapshot { url, json } => {
            let url = url.unwrap_or_else(|| commands::default_snapshot_url(&config));
            commands::fetch_snapshot(&url, json).await?
        }
        Commands::Config => commands::show_config(&config)?,
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
