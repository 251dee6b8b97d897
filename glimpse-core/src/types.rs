//! Core types for Glimpse
//!
//! These types are shared between the region selector and the recording
//! session: identifiers, pointer coordinates, media payloads and the
//! finalized artifacts each session produces.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global handle counter for unique session IDs
static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

/// Pointer position in viewport pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerPoint {
    pub x: i32,
    pub y: i32,
}

impl PointerPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for PointerPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl std::str::FromStr for PointerPoint {
    type Err = String;

    /// Parse `"x,y"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected x,y but got '{}'", s))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| format!("Invalid x coordinate: {}", x))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| format!("Invalid y coordinate: {}", y))?;
        Ok(Self { x, y })
    }
}

/// Size of the visible viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Kind of live media source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    /// Screen, window or tab via the display picker
    #[default]
    Screen,
    /// Camera and microphone devices
    Camera,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Screen => write!(f, "screen"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

impl std::str::FromStr for CaptureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "screen" | "display" => Ok(Self::Screen),
            "camera" | "device" | "webcam" => Ok(Self::Camera),
            _ => Err(format!("Unknown capture kind: {}", s)),
        }
    }
}

/// Kind of media track inside a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A fragment of recorded media as delivered by the platform recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    /// Encoded bytes
    pub data: Bytes,
    /// MIME type reported by the recorder (may be empty)
    pub content_type: String,
}

impl MediaChunk {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Finalized, playable recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    data: Bytes,
    content_type: String,
    chunk_count: usize,
}

impl MediaArtifact {
    pub(crate) fn new(data: Bytes, content_type: String, chunk_count: usize) -> Self {
        Self {
            data,
            content_type,
            chunk_count,
        }
    }

    /// Recorded bytes, in recording order
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// MIME type of the recording
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Number of chunks that were merged into this artifact
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Display for MediaArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes of {} ({} chunks)",
            self.data.len(),
            if self.content_type.is_empty() {
                "untyped media"
            } else {
                &self.content_type
            },
            self.chunk_count
        )
    }
}

/// Encoded image of a captured region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// PNG-encoded pixels (empty for a zero-area capture)
    pub png: Bytes,
}

impl ImageArtifact {
    /// Artifact for a selection with no area
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            png: Bytes::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Encode as a `data:image/png;base64,...` URL
    ///
    /// A zero-area capture encodes as `data:,`, the same value a browser
    /// canvas yields for an empty surface.
    pub fn to_data_url(&self) -> String {
        if self.is_empty() {
            return "data:,".to_string();
        }
        format!("data:image/png;base64,{}", BASE64.encode(&self.png))
    }
}
