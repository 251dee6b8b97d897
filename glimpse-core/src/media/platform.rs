//! Host media primitives
//!
//! The host provides stream acquisition and a recorder that can be opened
//! on a stream. Recorder callbacks are not exposed here: a backend reports
//! through [`RecorderEvents`], which posts messages to the owning
//! [`Recorder`](super::Recorder).

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

use super::constraints::{MediaStreamConstraints, RecorderOptions, SupportedConstraints};
use crate::error::{CaptureError, Result};
use crate::types::{Handle, MediaChunk, TrackKind};

/// A single audio or video track of a live stream
pub trait MediaTrack: Send + Sync {
    /// Platform track identifier
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Stop the track and release the underlying device
    fn stop(&self);

    /// False once the track has been stopped
    fn is_live(&self) -> bool;
}

/// A live media stream
pub trait MediaStream: Send + Sync {
    /// Platform stream identifier
    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// Video tracks only
    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == TrackKind::Video)
            .collect()
    }

    /// Stop every track
    fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// State reported by the platform recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendState {
    Inactive,
    Recording,
    Paused,
}

/// A recorder opened on a stream
pub trait RecorderBackend: Send {
    fn start(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    /// Request finalization; completion arrives as [`RecorderEvent::Stopped`]
    fn stop(&mut self) -> Result<()>;

    fn state(&self) -> BackendState;
}

/// What the host can do at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformCapabilities {
    /// A stream recorder primitive exists
    pub recorder: bool,
    /// Screen/window/tab capture exists
    pub display_capture: bool,
    /// Camera/microphone capture exists
    pub device_capture: bool,
}

impl PlatformCapabilities {
    /// Everything available
    pub fn full() -> Self {
        Self {
            recorder: true,
            display_capture: true,
            device_capture: true,
        }
    }
}

/// Host media platform
#[async_trait]
pub trait MediaPlatform: Send + Sync {
    type Stream: MediaStream + 'static;

    fn capabilities(&self) -> PlatformCapabilities;

    /// Constraint keys the platform understands
    fn supported_constraints(&self) -> SupportedConstraints;

    /// Whether the recorder can produce `mime_type`
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Prompt for a screen, window or tab
    async fn acquire_display_stream(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream>;

    /// Open camera and/or microphone
    async fn acquire_device_stream(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream>;

    /// Open a recorder on `stream`, reporting through `events`
    fn create_recorder(
        &self,
        stream: &Self::Stream,
        options: &RecorderOptions,
        events: RecorderEvents,
    ) -> Result<Box<dyn RecorderBackend>>;
}

/// Event emitted by a recorder backend
#[derive(Debug)]
pub enum RecorderEvent {
    /// A chunk of encoded media
    DataAvailable(MediaChunk),
    /// The recorder finished; no more data follows
    Stopped,
    /// The recorder failed
    Error(CaptureError),
}

/// Event tagged with the recording session it belongs to
#[derive(Debug)]
pub(crate) struct SessionEvent {
    pub session: Handle,
    pub event: RecorderEvent,
}

/// Sending half handed to a recorder backend
///
/// Every event is tagged with the session the backend was opened for, so
/// events from a torn-down session never reach a newer one. Once the
/// recorder detaches, sends are silently dropped.
#[derive(Debug, Clone)]
pub struct RecorderEvents {
    session: Handle,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl RecorderEvents {
    pub(crate) fn new(session: Handle, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    /// Session these events belong to
    pub fn session(&self) -> Handle {
        self.session
    }

    /// Report a chunk of data
    pub fn data_available(&self, chunk: MediaChunk) -> bool {
        self.send(RecorderEvent::DataAvailable(chunk))
    }

    /// Report that finalization completed
    pub fn stopped(&self) -> bool {
        self.send(RecorderEvent::Stopped)
    }

    /// Report a recorder failure
    pub fn error(&self, message: impl Into<String>) -> bool {
        self.send(RecorderEvent::Error(CaptureError::recorder(message)))
    }

    /// Post an event; false if the recorder has detached
    pub fn send(&self, event: RecorderEvent) -> bool {
        let delivered = self
            .tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_ok();
        if !delivered {
            trace!("Dropping event for detached session {}", self.session);
        }
        delivered
    }

    /// Whether the recorder is still listening
    pub fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }
}
