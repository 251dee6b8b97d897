//! Configuration types for Glimpse
//!
//! Provides region selection settings and recording session configuration.

mod file;

pub use file::{ConfigFile, RecordingSettings, SelectionSettings, sample_config};

use serde::{Deserialize, Serialize};

use crate::media::{BlobOptions, MediaStreamConstraints, RecorderOptions, TrackRequest};
use crate::types::CaptureKind;

/// Default extra pixels rasterized past the right/bottom edge of a selection
pub const DEFAULT_PADDING: u32 = 30;

/// Region selection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Extra pixels included past the right and bottom edges of the
    /// selection; clamped to the rendered surface
    pub padding: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
        }
    }
}

impl SelectionConfig {
    /// Set the padding margin
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Validate the configuration and return any warnings
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.padding > 500 {
            warnings.push(format!(
                "Padding of {}px will capture far more than the selected region.",
                self.padding
            ));
        }
        warnings
    }
}

/// Complete recording session configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Screen or camera
    pub kind: CaptureKind,
    /// Constraints passed to stream acquisition
    pub constraints: MediaStreamConstraints,
    /// Options for the platform recorder
    pub recorder: RecorderOptions,
    /// Options applied at assembly
    pub blob: BlobOptions,
}

impl RecordingConfig {
    /// Create a config for screen recording
    pub fn screen() -> Self {
        Self {
            kind: CaptureKind::Screen,
            ..Self::default()
        }
    }

    /// Create a config for camera recording
    pub fn camera() -> Self {
        Self {
            kind: CaptureKind::Camera,
            ..Self::default()
        }
    }

    /// Replace the stream constraints
    pub fn with_constraints(mut self, constraints: MediaStreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Enable or disable audio
    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.constraints = self.constraints.with_audio(enabled);
        self
    }

    /// Set the recorder MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.recorder.mime_type = Some(mime_type.into());
        self
    }

    /// Set the recorder bitrate
    pub fn with_bits_per_second(mut self, bits_per_second: u32) -> Self {
        self.recorder.bits_per_second = Some(bits_per_second);
        self
    }

    /// Override the artifact content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.blob.content_type = Some(content_type.into());
        self
    }

    /// Whether an audio track is requested
    pub fn has_audio(&self) -> bool {
        self.constraints.audio.is_requested()
    }

    /// Validate the configuration and return any warnings
    ///
    /// An empty list means the configuration looks good.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(bps) = self.recorder.bits_per_second {
            if bps > 0 && bps < 100_000 {
                warnings.push(format!(
                    "Bitrate {} bps is very low. Video will be barely legible.",
                    bps
                ));
            } else if bps > 50_000_000 {
                warnings.push(format!(
                    "Bitrate {} bps is very high for a browser recorder.",
                    bps
                ));
            }
        }

        if let Some(ref mime_type) = self.recorder.mime_type {
            if !mime_type.contains('/') {
                warnings.push(format!(
                    "MIME type '{}' does not look like type/subtype",
                    mime_type
                ));
            }
        }

        if let (Some(mime_type), Some(content_type)) =
            (&self.recorder.mime_type, &self.blob.content_type)
        {
            let base = |s: &str| s.split(';').next().unwrap_or_default().trim().to_string();
            if base(mime_type) != base(content_type) {
                warnings.push(format!(
                    "Artifact type {} differs from the recorded type {}. Players may reject it.",
                    content_type, mime_type
                ));
            }
        }

        if self.kind == CaptureKind::Camera
            && matches!(self.constraints.video, TrackRequest::Enabled(false))
            && self.has_audio()
        {
            warnings.push("Camera capture with video disabled records audio only.".to_string());
        }

        warnings
    }

    /// Validate and return an error if the configuration cannot work
    ///
    /// Unlike `validate()` which returns warnings, this returns hard errors.
    pub fn validate_strict(&self) -> Result<(), String> {
        if !self.constraints.video.is_requested() && !self.constraints.audio.is_requested() {
            return Err("At least one of video or audio must be requested".to_string());
        }

        if self.recorder.bits_per_second == Some(0) {
            return Err("Bitrate cannot be zero".to_string());
        }

        if let Some(ref mime_type) = self.recorder.mime_type {
            if mime_type.trim().is_empty() {
                return Err("MIME type cannot be empty".to_string());
            }
        }

        if let Some(ref content_type) = self.blob.content_type {
            if content_type.trim().is_empty() {
                return Err("Artifact content type cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
