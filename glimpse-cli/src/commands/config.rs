//! Config command - manage configuration files

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use glimpse_core::config::{ConfigFile, sample_config};

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show where the config file lives and whether it is in use
    Path,

    /// Show the selection and recording settings in effect
    Show,

    /// Write the commented sample config and print its settings
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the commented sample config
    Sample,
}

/// Run config subcommand
pub async fn config(args: ConfigArgs) -> Result<()> {
    let path = ConfigFile::default_path();

    match args.command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                println!("(not created yet; built-in defaults apply)");
            } else if let Err(e) = ConfigFile::load_from(path.clone()) {
                println!("(exists but will be ignored: {})", e);
            } else {
                println!("(in use)");
            }
        }
        ConfigCommand::Show => {
            if !path.exists() {
                println!("No configuration file at {}; built-in defaults:\n", path.display());
                print_settings(&ConfigFile::default());
                println!();
                println!("Create the file with:");
                println!("  glimpse config init");
                return Ok(());
            }

            let config =
                ConfigFile::load_from(path.clone()).context("Failed to load config file")?;

            println!("Configuration file: {}\n", path.display());
            print_settings(&config);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                println!("{} already exists; pass --force to replace it.", path.display());
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            std::fs::write(&path, sample_config()).context("Failed to write config file")?;

            let written =
                ConfigFile::load_from(path.clone()).context("Written config does not parse")?;

            println!("Wrote {}\n", path.display());
            print_settings(&written);
        }
        ConfigCommand::Sample => {
            print!("{}", sample_config());
        }
    }

    Ok(())
}

/// Print the selection and recording tables, then any recording warnings
fn print_settings(config: &ConfigFile) {
    println!("[selection]");
    println!("  padding:         {}px", config.selection.padding);
    println!("[recording]");
    println!("  kind:            {}", config.recording.kind);
    println!("  audio:           {}", config.recording.audio);
    println!(
        "  mime_type:       {}",
        display_or_default(&config.recording.mime_type)
    );
    let bitrate = match config.recording.bits_per_second {
        0 => "(platform default)".to_string(),
        bps => bps.to_string(),
    };
    println!("  bits_per_second: {}", bitrate);
    println!(
        "  content_type:    {}",
        display_or_default(&config.recording.content_type)
    );

    for warning in config.selection_config().validate() {
        println!("warning: {}", warning);
    }
    match config.recording_config() {
        Ok(recording) => {
            for warning in recording.validate() {
                println!("warning: {}", warning);
            }
        }
        Err(e) => println!("error: {}", e),
    }
}

fn display_or_default(value: &str) -> &str {
    if value.is_empty() {
        "(platform default)"
    } else {
        value
    }
}
