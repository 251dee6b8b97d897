//! Glimpse CLI
//!
//! Region screenshots and screen recording sessions, driven from files.
//!
//! # Usage
//!
//! ```bash
//! # Capture the region dragged from (100,100) to (300,250)
//! glimpse select --image page.png --from 100,100 --to 300,250 -o region.png
//!
//! # Replay a clip as the screen and record it
//! glimpse record --input clip.webm -o out.webm --pause-after 5
//!
//! # Write a default config file
//! glimpse config init
//! ```

mod commands;
mod host;

use anyhow::Result;
use clap::{Parser, Subcommand};
use glimpse_core::error::CaptureError;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Glimpse - region screenshots and screen recording sessions
#[derive(Parser)]
#[command(name = "glimpse")]
#[command(author = "GhostKellz")]
#[command(version)]
#[command(about = "Region screenshots and screen recording sessions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a dragged region of a page snapshot
    Select(commands::SelectArgs),

    /// Record a replayed media file through a recording session
    #[command(alias = "rec")]
    Record(commands::RecordArgs),

    /// Manage the configuration file
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let directive = format!("glimpse={}", level)
        .parse()
        .unwrap_or_else(|_| LevelFilter::WARN.into());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Select(args) => commands::select(args).await,
        Commands::Record(args) => commands::record(args).await,
        Commands::Config(args) => commands::config(args).await,
    };

    if let Err(ref e) = result {
        let hint = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<CaptureError>())
            .and_then(CaptureError::user_hint);
        if let Some(hint) = hint {
            eprintln!("hint: {}", hint);
        }
    }

    result
}
