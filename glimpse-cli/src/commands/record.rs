//! Record command - replay a media file through a recording session

use anyhow::{Context, Result};
use clap::Args;
use glimpse_core::config::ConfigFile;
use glimpse_core::error::CaptureError;
use glimpse_core::media::{Recorder, RecorderStatus};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

use crate::host::FilePlatform;

/// Arguments for the record command
#[derive(Args)]
pub struct RecordArgs {
    /// Media file replayed as the captured screen
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the assembled recording
    #[arg(short, long)]
    output: PathBuf,

    /// Bytes per recorded chunk
    #[arg(long, default_value = "65536")]
    chunk_size: usize,

    /// Milliseconds between chunks
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    timeslice: u64,

    /// Pause once after this many chunks
    #[arg(long)]
    pause_after: Option<usize>,

    /// How long to stay paused, in milliseconds
    #[arg(long, default_value = "500")]
    pause_ms: u64,

    /// Recorder MIME type (overrides the config file)
    #[arg(long)]
    mime_type: Option<String>,
}

/// Record the replayed stream until it runs out or Ctrl+C
pub async fn record(args: RecordArgs) -> Result<()> {
    println!("Glimpse - Recording\n");

    let mut config = ConfigFile::load_or_default()
        .recording_config()
        .context("Invalid recording settings")?;
    if let Some(mime_type) = args.mime_type {
        config = config.with_mime_type(mime_type);
    }

    config
        .validate_strict()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let platform = Arc::new(FilePlatform::new(
        &args.input,
        args.chunk_size,
        Duration::from_millis(args.timeslice),
    ));
    let mut recorder = Recorder::new(platform, &config).context("Failed to create recorder")?;

    println!("Configuration:");
    println!("  Source:     {} ({})", config.kind, args.input.display());
    println!(
        "  MIME type:  {}",
        config.recorder.mime_type.as_deref().unwrap_or("(from file)")
    );
    println!("  Chunks:     {} bytes every {} ms", args.chunk_size, args.timeslice);
    println!();

    recorder.start().await.context("Failed to start recording")?;

    let total = recorder
        .live_stream()
        .map(|stream| stream.len())
        .unwrap_or_default();
    println!("Recording started ({} bytes to replay).", total);
    println!("Press Ctrl+C to stop early...\n");

    let mut paused_once = false;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\nReceived interrupt signal...");
                break;
            }
            more = recorder.next_event() => {
                if !more {
                    break;
                }
            }
        }

        if !matches!(
            recorder.status(),
            RecorderStatus::Recording | RecorderStatus::Paused
        ) {
            break;
        }

        if let Some(after) = args.pause_after {
            if !paused_once && recorder.chunk_count() >= after {
                paused_once = true;
                recorder.pause()?;
                println!("Paused after {} chunks", recorder.chunk_count());
                tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;
                recorder.resume()?;
                println!("Resumed");
            }
        }

        if recorder.buffered_bytes() >= total {
            info!("Replay exhausted after {} chunks", recorder.chunk_count());
            break;
        }
    }

    if recorder.status() == RecorderStatus::Idle {
        if let Some(err) = recorder.error() {
            return Err(anyhow::Error::new(CaptureError::Shared(err)).context("Recording failed"));
        }
    }

    println!("Stopping recording...");
    let artifact = recorder
        .finish()
        .await
        .context("Failed to finish recording")?;

    std::fs::write(&args.output, artifact.data())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Recording saved.");
    println!("  File:       {}", args.output.display());
    println!("  Type:       {}", artifact.content_type());
    println!("  Size:       {} bytes", artifact.len());
    println!("  Chunks:     {}", artifact.chunk_count());

    Ok(())
}
