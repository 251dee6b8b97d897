//! Select command - capture a dragged region of a page snapshot

use anyhow::{Context, Result};
use clap::Args;
use glimpse_core::config::ConfigFile;
use glimpse_core::region::RegionSelector;
use glimpse_core::types::{PointerPoint, Viewport};
use std::path::PathBuf;
use tracing::warn;

use crate::host::ImageRasterizer;

/// Arguments for the select command
#[derive(Args)]
pub struct SelectArgs {
    /// PNG snapshot of the page to select from
    #[arg(short, long)]
    image: PathBuf,

    /// Where the drag starts, as x,y
    #[arg(long, allow_hyphen_values = true)]
    from: PointerPoint,

    /// Where the pointer is released, as x,y
    #[arg(long, allow_hyphen_values = true)]
    to: PointerPoint,

    /// Extra pixels past the right/bottom edge (defaults to the config value)
    #[arg(short, long)]
    padding: Option<u32>,

    /// Output PNG path; prints a data URL when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Run a single drag over the snapshot and save the captured region
pub async fn select(args: SelectArgs) -> Result<()> {
    let mut config = ConfigFile::load_or_default().selection_config();
    if let Some(padding) = args.padding {
        config = config.with_padding(padding);
    }
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let rasterizer = ImageRasterizer::open(&args.image)
        .with_context(|| format!("Failed to load {}", args.image.display()))?;
    let (width, height) = rasterizer.dimensions();

    let mut selector = RegionSelector::with_config(Viewport::new(width, height), &config);
    selector.begin();
    selector.on_pointer_down(args.from);
    let artifact = selector
        .on_pointer_up(args.to, &rasterizer)
        .await
        .context("Failed to capture region")?;

    if let Some(crop) = selector.committed() {
        println!("Selection:  {}", crop);
    }
    println!("Padding:    {}px", config.padding);

    if artifact.is_empty() {
        println!("The selection is empty; nothing was captured.");
        return Ok(());
    }

    println!("Image:      {}x{}", artifact.width, artifact.height);

    match args.output {
        Some(path) => {
            std::fs::write(&path, &artifact.png)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved to:   {}", path.display());
        }
        None => println!("{}", artifact.to_data_url()),
    }

    Ok(())
}
