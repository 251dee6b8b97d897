//! Configuration file loading and merging
//!
//! Loads user configuration from `~/.config/glimpse/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{DEFAULT_PADDING, RecordingConfig, SelectionConfig};
use crate::error::{CaptureError, Result};
use crate::types::CaptureKind;

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Region selection settings
    #[serde(default)]
    pub selection: SelectionSettings,

    /// Recording settings
    #[serde(default)]
    pub recording: RecordingSettings,
}

/// Region selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Extra pixels captured past the right/bottom edge of a selection
    #[serde(default = "default_padding")]
    pub padding: u32,
}

/// Recording settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Source kind (screen, camera)
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Request an audio track
    #[serde(default)]
    pub audio: bool,

    /// Recorder MIME type (empty = platform default)
    #[serde(default)]
    pub mime_type: String,

    /// Recorder bitrate in bits per second (0 = platform default)
    #[serde(default)]
    pub bits_per_second: u32,

    /// Artifact content type override (empty = type of the first chunk)
    #[serde(default)]
    pub content_type: String,
}

fn default_padding() -> u32 {
    DEFAULT_PADDING
}

fn default_kind() -> String {
    "screen".to_string()
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            padding: default_padding(),
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            audio: false,
            mime_type: String::new(),
            bits_per_second: 0,
            content_type: String::new(),
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("glimpse").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("glimpse")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/glimpse/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CaptureError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CaptureError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(&path, content)
            .map_err(|e| CaptureError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Create a default config file if it doesn't exist
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_path();
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Region selection settings as runtime configuration
    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            padding: self.selection.padding,
        }
    }

    /// Recording settings as runtime configuration
    pub fn recording_config(&self) -> Result<RecordingConfig> {
        let kind: CaptureKind = self
            .recording
            .kind
            .parse()
            .map_err(CaptureError::config)?;

        let mut config = RecordingConfig {
            kind,
            ..RecordingConfig::default()
        }
        .with_audio(self.recording.audio);

        if !self.recording.mime_type.is_empty() {
            config = config.with_mime_type(&self.recording.mime_type);
        }
        if self.recording.bits_per_second > 0 {
            config = config.with_bits_per_second(self.recording.bits_per_second);
        }
        if !self.recording.content_type.is_empty() {
            config = config.with_content_type(&self.recording.content_type);
        }

        Ok(config)
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# Glimpse Configuration

[selection]
# Extra pixels captured past the right and bottom edges of a selection
# (clamped to the page)
padding = 30

[recording]
# Source: screen (display picker) or camera
kind = "screen"

# Request an audio track alongside video
audio = false

# Recorder MIME type, e.g. "video/webm;codecs=vp9" (empty = platform default)
mime_type = ""

# Recorder bitrate in bits per second (0 = platform default)
bits_per_second = 0

# Content type for the finished recording (empty = type of the first chunk)
content_type = ""
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.selection.padding, 30);
        assert_eq!(config.recording.kind, "screen");
        assert!(!config.recording.audio);
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = sample_config();
        let config: ConfigFile = toml::from_str(&sample).unwrap();
        assert_eq!(config.selection.padding, 30);
        assert_eq!(config.recording.kind, "screen");
    }

    #[test]
    fn test_empty_strings_mean_platform_default() {
        let config = ConfigFile::default().recording_config().unwrap();
        assert_eq!(config.kind, CaptureKind::Screen);
        assert!(config.recorder.mime_type.is_none());
        assert!(config.recorder.bits_per_second.is_none());
        assert!(config.blob.content_type.is_none());
    }
}
