//! Screen and camera recording
//!
//! This module handles:
//! - Capability and constraint checks against the host platform
//! - Live stream acquisition (`StreamAcquirer`)
//! - The recording state machine (`Recorder`)
//! - Assembly of recorded chunks into one artifact

pub mod acquire;
pub mod assemble;
pub mod constraints;
pub mod platform;
pub mod recorder;

pub use acquire::{AcquireState, StreamAcquirer, check_capabilities};
pub use assemble::assemble;
pub use constraints::{
    BlobOptions, ConstraintWarning, MediaStreamConstraints, RecorderOptions,
    SupportedConstraints, TrackRequest, validate_constraints,
};
pub use platform::{
    BackendState, MediaPlatform, MediaStream, MediaTrack, PlatformCapabilities, RecorderBackend,
    RecorderEvent, RecorderEvents,
};
pub use recorder::{Recorder, RecorderControl, RecorderStatus, RecorderUpdate};
