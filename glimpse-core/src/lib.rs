//! Glimpse Core Library
//!
//! Region screenshots and screen/camera recording for browser pages.
//!
//! This library provides:
//! - Pointer-driven region selection with a live crop rectangle and dim mask
//! - Rasterization of the selected region into a PNG artifact
//! - Screen or camera stream acquisition behind a host platform trait
//! - A recording state machine that assembles chunks into one artifact
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ RegionSelector  │───▶│ Rasterizer   │───▶│ ImageArtifact   │
//! │ (pointer drag)  │    │ (host page)  │    │ (PNG)           │
//! └─────────────────┘    └──────────────┘    └─────────────────┘
//!
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ StreamAcquirer  │───▶│ Recorder     │───▶│ MediaArtifact   │
//! │ (display/device)│    │ (FSM+chunks) │    │ (assembled)     │
//! └─────────────────┘    └──────────────┘    └─────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod region;
pub mod types;

pub use config::{ConfigFile, RecordingConfig, SelectionConfig};
pub use error::{CaptureError, Result};
pub use media::{
    MediaPlatform, MediaStreamConstraints, Recorder, RecorderStatus, RecorderUpdate,
    StreamAcquirer,
};
pub use region::{CaptureRasterizer, CropRectangle, DimMask, RegionSelector};
pub use types::{CaptureKind, Handle, ImageArtifact, MediaArtifact, MediaChunk, PointerPoint, Viewport};
