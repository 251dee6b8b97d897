//! Stream constraints and recorder options
//!
//! Requested constraints are checked against what the platform advertises
//! before acquisition. Unknown keys only produce warnings; the platform
//! is free to ignore them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::error::CaptureError;
use crate::types::TrackKind;

/// Request for one kind of track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackRequest {
    /// Plain on/off
    Enabled(bool),
    /// Enabled with per-track constraints (e.g. `width`, `frameRate`)
    Constraints(BTreeMap<String, serde_json::Value>),
}

impl TrackRequest {
    /// Whether a track of this kind is requested at all
    pub fn is_requested(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Constraints(_) => true,
        }
    }

    /// Constraint keys, if any were given
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let map = match self {
            Self::Enabled(_) => None,
            Self::Constraints(map) => Some(map),
        };
        map.into_iter().flat_map(|m| m.keys().map(String::as_str))
    }
}

/// Constraints passed to stream acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStreamConstraints {
    #[serde(default = "default_video")]
    pub video: TrackRequest,
    #[serde(default = "default_audio")]
    pub audio: TrackRequest,
}

fn default_video() -> TrackRequest {
    TrackRequest::Enabled(true)
}

fn default_audio() -> TrackRequest {
    TrackRequest::Enabled(false)
}

impl Default for MediaStreamConstraints {
    fn default() -> Self {
        Self {
            video: default_video(),
            audio: default_audio(),
        }
    }
}

impl MediaStreamConstraints {
    /// Video only, no constraints
    pub fn video_only() -> Self {
        Self::default()
    }

    /// Enable or disable audio
    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio = TrackRequest::Enabled(enabled);
        self
    }

    /// Add a video constraint
    pub fn with_video_constraint(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.video = with_constraint(self.video, key.into(), value);
        self
    }

    /// Add an audio constraint
    pub fn with_audio_constraint(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.audio = with_constraint(self.audio, key.into(), value);
        self
    }

    /// Request for the given track kind
    pub fn track(&self, kind: TrackKind) -> &TrackRequest {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }
}

fn with_constraint(request: TrackRequest, key: String, value: serde_json::Value) -> TrackRequest {
    let mut map = match request {
        TrackRequest::Enabled(_) => BTreeMap::new(),
        TrackRequest::Constraints(map) => map,
    };
    map.insert(key, value);
    TrackRequest::Constraints(map)
}

/// Constraint keys the platform understands
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupportedConstraints(BTreeSet<String>);

impl SupportedConstraints {
    /// Keys commonly supported by browsers
    pub fn standard() -> Self {
        [
            "width",
            "height",
            "aspectRatio",
            "frameRate",
            "facingMode",
            "resizeMode",
            "deviceId",
            "groupId",
            "displaySurface",
            "logicalSurface",
            "cursor",
            "echoCancellation",
            "autoGainControl",
            "noiseSuppression",
            "sampleRate",
            "sampleSize",
            "channelCount",
            "latency",
            "volume",
        ]
        .into_iter()
        .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn insert(&mut self, key: impl Into<String>) {
        self.0.insert(key.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SupportedConstraints {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A requested constraint the platform does not understand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintWarning {
    pub track: TrackKind,
    pub key: String,
}

impl ConstraintWarning {
    pub fn to_error(&self) -> CaptureError {
        CaptureError::UnsupportedConstraint(format!("{} {}", self.track, self.key))
    }
}

impl std::fmt::Display for ConstraintWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} constraint '{}' is not supported", self.track, self.key)
    }
}

/// Check every requested key against `supported`
///
/// Returns one warning per unsupported key, and logs them grouped per
/// track.
pub fn validate_constraints(
    constraints: &MediaStreamConstraints,
    supported: &SupportedConstraints,
) -> Vec<ConstraintWarning> {
    let mut warnings = Vec::new();

    for track in [TrackKind::Video, TrackKind::Audio] {
        let unsupported: Vec<&str> = constraints
            .track(track)
            .keys()
            .filter(|key| !supported.contains(key))
            .collect();

        if unsupported.is_empty() {
            continue;
        }

        warn!(
            "The following {} constraints are not supported on this platform: {}",
            track,
            unsupported.join(",")
        );

        warnings.extend(unsupported.into_iter().map(|key| ConstraintWarning {
            track,
            key: key.to_string(),
        }));
    }

    warnings
}

/// Options for the platform recorder
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecorderOptions {
    /// Container/codec MIME type (e.g. `video/webm;codecs=vp9`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Target bitrate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_second: Option<u32>,
}

/// Options for the assembled artifact
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlobOptions {
    /// Overrides the content type taken from the first chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}
