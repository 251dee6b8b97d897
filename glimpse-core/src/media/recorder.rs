//! Recording session state machine
//!
//! ```text
//! idle ─▶ acquiring_media ─▶ ready ─▶ recording ⇄ paused
//!                                         │         │
//!                                         └─▶ stopping ─▶ stopped
//! ```
//!
//! Any state other than `stopping`/`stopped` drops back to `idle` on a
//! fault, releasing the stream and detaching the platform recorder.
//! Backend events arrive as messages tagged with the recording session
//! that produced them; events from an older session are discarded.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use super::acquire::StreamAcquirer;
use super::assemble::assemble;
use super::constraints::{BlobOptions, ConstraintWarning, RecorderOptions};
use super::platform::{
    BackendState, MediaPlatform, MediaStream, MediaTrack, RecorderBackend, RecorderEvent,
    RecorderEvents, SessionEvent,
};
use crate::config::RecordingConfig;
use crate::error::{CaptureError, Result};
use crate::types::{CaptureKind, Handle, MediaArtifact, MediaChunk};

/// Capacity of the update broadcast channel
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Recorder status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderStatus {
    Idle,
    AcquiringMedia,
    Ready,
    Recording,
    Paused,
    /// Stop requested; chunks flushed by the platform recorder before its
    /// stop event are still buffered
    Stopping,
    Stopped,
}

impl RecorderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AcquiringMedia => "acquiring_media",
            Self::Ready => "ready",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Whether the underlying recorder is open
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused | Self::Stopping)
    }
}

impl std::fmt::Display for RecorderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification published to [`Recorder::subscribe`] receivers
#[derive(Debug, Clone)]
pub enum RecorderUpdate {
    /// Status changed
    Status(RecorderStatus),
    /// A recording session started
    Started(Handle),
    /// The backend delivered a chunk (including empty ones)
    Chunk { session: Handle, size: usize },
    /// The recording was assembled
    Finalized(Arc<MediaArtifact>),
    /// The session failed
    Failed(Arc<CaptureError>),
}

/// Cloneable handle for requesting a stop while `start` is suspended
///
/// A stop requested while the stream is still being acquired is honored
/// as soon as acquisition settles: the fresh stream is released and the
/// recorder returns to idle without opening a platform recorder.
#[derive(Debug, Clone, Default)]
pub struct RecorderControl {
    stop_requested: Arc<AtomicBool>,
}

impl RecorderControl {
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    fn take_stop_request(&self) -> bool {
        self.stop_requested.swap(false, Ordering::SeqCst)
    }
}

/// Finite-state machine over a platform stream recorder
pub struct Recorder<P: MediaPlatform> {
    /// Recorder handle, for log correlation
    handle: Handle,
    /// Host media platform
    platform: Arc<P>,
    /// Stream acquisition
    acquirer: StreamAcquirer<P>,
    /// Options passed to the platform recorder
    options: RecorderOptions,
    /// Options applied at assembly
    blob_options: BlobOptions,
    /// Authoritative status
    status: RecorderStatus,
    /// Live stream (handed off by the acquirer)
    stream: Option<P::Stream>,
    /// Open platform recorder
    backend: Option<Box<dyn RecorderBackend>>,
    /// Current recording session
    session: Option<Handle>,
    /// Events from the open platform recorder
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    /// Recorded chunks, in arrival order
    chunks: Vec<MediaChunk>,
    /// Last session fault
    error: Option<Arc<CaptureError>>,
    /// Finalized recording
    artifact: Option<Arc<MediaArtifact>>,
    /// Out-of-band stop requests
    control: RecorderControl,
    /// Update feed
    updates: broadcast::Sender<RecorderUpdate>,
}

impl<P: MediaPlatform> Recorder<P> {
    /// Create a recorder
    ///
    /// Fails with [`CaptureError::CapabilityMissing`] before any user
    /// gesture if the platform cannot record or cannot capture the
    /// configured source kind.
    pub fn new(platform: Arc<P>, config: &RecordingConfig) -> Result<Self> {
        if !platform.capabilities().recorder {
            return Err(CaptureError::capability(
                "No media recorder is available on this platform",
            ));
        }

        if let Some(ref mime_type) = config.recorder.mime_type {
            if !platform.is_type_supported(mime_type) {
                warn!(
                    "The MIME type {} is not supported by the platform recorder",
                    mime_type
                );
            }
        }

        let acquirer =
            StreamAcquirer::new(platform.clone(), config.kind, config.constraints.clone())?;
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let handle = Handle::new();

        info!("Recorder {} created for {} capture", handle, config.kind);

        Ok(Self {
            handle,
            platform,
            acquirer,
            options: config.recorder.clone(),
            blob_options: config.blob.clone(),
            status: RecorderStatus::Idle,
            stream: None,
            backend: None,
            session: None,
            events_rx: None,
            chunks: Vec::new(),
            error: None,
            artifact: None,
            control: RecorderControl::default(),
            updates,
        })
    }

    /// Acquire the live stream without starting to record
    pub async fn acquire_media(&mut self) -> Result<()> {
        if self.stream.is_some() {
            debug!("Recorder {}: stream already held", self.handle);
            return Ok(());
        }

        match self.status {
            RecorderStatus::Idle | RecorderStatus::Ready => {}
            status => {
                debug!("Recorder {}: ignoring acquire while {}", self.handle, status);
                return Ok(());
            }
        }

        self.error = None;
        self.set_status(RecorderStatus::AcquiringMedia);

        let result = self.acquirer.acquire().await.map(|_| ());
        match result {
            Ok(()) => {
                self.stream = self.acquirer.take();
                self.set_status(RecorderStatus::Ready);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Start recording, acquiring the stream first if needed
    ///
    /// Ignored unless the recorder is idle or ready.
    pub async fn start(&mut self) -> Result<()> {
        match self.status {
            RecorderStatus::Idle | RecorderStatus::Ready => {}
            status => {
                debug!("Recorder {}: ignoring start while {}", self.handle, status);
                return Ok(());
            }
        }

        self.error = None;
        self.control.reset();

        if self.stream.is_none() {
            self.acquire_media().await?;
        }

        if self.control.take_stop_request() {
            info!(
                "Recorder {}: stop requested during acquisition, releasing stream",
                self.handle
            );
            self.teardown();
            self.set_status(RecorderStatus::Idle);
            return Ok(());
        }

        self.detach_backend();
        self.chunks.clear();

        let session = Handle::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let events = RecorderEvents::new(session, tx);

        let Some(stream) = self.stream.as_ref() else {
            return Err(self.fail(CaptureError::NoActiveSession));
        };
        let created = self.platform.create_recorder(stream, &self.options, events);

        let mut backend = match created {
            Ok(backend) => backend,
            Err(e) => return Err(self.fail(e)),
        };
        if let Err(e) = backend.start() {
            return Err(self.fail(e));
        }

        self.backend = Some(backend);
        self.session = Some(session);
        self.events_rx = Some(rx);
        self.set_status(RecorderStatus::Recording);
        self.notify(RecorderUpdate::Started(session));

        info!("Recorder {}: recording session {}", self.handle, session);
        Ok(())
    }

    /// Pause recording; a no-op unless recording
    pub fn pause(&mut self) -> Result<()> {
        if self.status != RecorderStatus::Recording {
            debug!("Recorder {}: ignoring pause while {}", self.handle, self.status);
            return Ok(());
        }

        let result = match self.backend.as_mut() {
            Some(backend) if backend.state() == BackendState::Recording => backend.pause(),
            _ => {
                debug!("Recorder {}: platform recorder is not recording", self.handle);
                return Ok(());
            }
        };

        match result {
            Ok(()) => {
                self.set_status(RecorderStatus::Paused);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Resume recording; a no-op unless paused
    pub fn resume(&mut self) -> Result<()> {
        if self.status != RecorderStatus::Paused {
            debug!("Recorder {}: ignoring resume while {}", self.handle, self.status);
            return Ok(());
        }

        let result = match self.backend.as_mut() {
            Some(backend) if backend.state() == BackendState::Paused => backend.resume(),
            _ => {
                debug!("Recorder {}: platform recorder is not paused", self.handle);
                return Ok(());
            }
        };

        match result {
            Ok(()) => {
                self.set_status(RecorderStatus::Recording);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Ask the platform recorder to finalize
    ///
    /// Completion arrives as a [`RecorderEvent::Stopped`] event; use
    /// [`finish`](Self::finish) to stop and wait for the artifact. Stopping
    /// an already stopped or absent recorder is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        match self.status {
            RecorderStatus::Recording | RecorderStatus::Paused => {}
            RecorderStatus::AcquiringMedia => {
                info!("Recorder {}: abandoning acquisition", self.handle);
                self.teardown();
                self.set_status(RecorderStatus::Idle);
                return Ok(());
            }
            status => {
                debug!("Recorder {}: ignoring stop while {}", self.handle, status);
                return Ok(());
            }
        }

        let result = match self.backend.as_mut() {
            Some(backend) if backend.state() != BackendState::Inactive => backend.stop(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            return Err(self.fail(e));
        }

        self.set_status(RecorderStatus::Stopping);
        Ok(())
    }

    /// Stop and wait for the assembled recording
    pub async fn finish(&mut self) -> Result<Arc<MediaArtifact>> {
        match self.status {
            RecorderStatus::Recording | RecorderStatus::Paused => self.stop()?,
            RecorderStatus::Stopping => {}
            RecorderStatus::Stopped => {
                return self.artifact.clone().ok_or(CaptureError::EmptyArtifact);
            }
            _ => return Err(CaptureError::NoActiveSession),
        }

        while self.status == RecorderStatus::Stopping {
            if !self.next_event().await {
                break;
            }
        }

        match (self.status, &self.artifact, &self.error) {
            (RecorderStatus::Stopped, Some(artifact), _) => Ok(artifact.clone()),
            (_, _, Some(error)) => Err(CaptureError::Shared(error.clone())),
            _ => Err(CaptureError::NoActiveSession),
        }
    }

    /// Apply one backend event
    ///
    /// Hosts that deliver events themselves can call this directly; it
    /// always applies to the current session.
    pub fn dispatch(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::DataAvailable(chunk) => self.on_data_available(chunk),
            RecorderEvent::Stopped => self.on_stopped(),
            RecorderEvent::Error(err) => self.on_error(err),
        }
    }

    /// Apply every queued backend event without waiting
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events_rx.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next backend event and apply it
    ///
    /// Returns false when no recorder is attached. If the platform
    /// recorder goes away mid-session the session fails.
    pub async fn next_event(&mut self) -> bool {
        let Some(rx) = self.events_rx.as_mut() else {
            return false;
        };

        match rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => {
                if self.status.is_recording() {
                    let _ = self.fail(CaptureError::recorder(
                        "Platform recorder went away without finishing",
                    ));
                }
                false
            }
        }
    }

    /// Return a stopped or idle recorder to a fresh idle state
    pub fn reset(&mut self) {
        match self.status {
            RecorderStatus::Stopped | RecorderStatus::Idle => {
                self.teardown();
                self.chunks.clear();
                self.artifact = None;
                self.error = None;
                self.set_status(RecorderStatus::Idle);
            }
            status => debug!("Recorder {}: ignoring reset while {}", self.handle, status),
        }
    }

    /// Release the stream and detach the platform recorder
    ///
    /// An in-progress recording is abandoned. A finalized artifact is kept.
    pub fn clear_media(&mut self) {
        self.teardown();
        self.chunks.clear();
        if self.status != RecorderStatus::Stopped {
            self.set_status(RecorderStatus::Idle);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        if self.session != Some(event.session) {
            debug!(
                "Recorder {}: dropping event from stale session {}",
                self.handle, event.session
            );
            return;
        }
        self.dispatch(event.event);
    }

    fn on_data_available(&mut self, chunk: MediaChunk) {
        // The platform flushes its last buffered data between stop() and
        // the stop event, so chunks are still accepted while stopping.
        if !self.status.is_recording() {
            debug!(
                "Recorder {}: dropping {}-byte chunk while {}",
                self.handle,
                chunk.len(),
                self.status
            );
            return;
        }

        let size = chunk.len();
        if chunk.is_empty() {
            trace!("Recorder {}: discarding empty chunk", self.handle);
        } else {
            self.chunks.push(chunk);
            trace!(
                "Recorder {}: buffered {} bytes ({} chunks)",
                self.handle,
                size,
                self.chunks.len()
            );
        }

        if let Some(session) = self.session {
            self.notify(RecorderUpdate::Chunk { session, size });
        }
    }

    fn on_stopped(&mut self) {
        if self.status.is_recording() {
            self.finalize();
        } else {
            debug!("Recorder {}: ignoring stop event while {}", self.handle, self.status);
        }
    }

    fn on_error(&mut self, err: CaptureError) {
        match self.status {
            RecorderStatus::Stopping => {
                warn!("Recorder {}: error while stopping: {}", self.handle, err);
                let err = Arc::new(err);
                self.error = Some(err.clone());
                self.notify(RecorderUpdate::Failed(err));
            }
            RecorderStatus::Idle | RecorderStatus::Stopped => {
                debug!("Recorder {}: ignoring error while {}: {}", self.handle, self.status, err);
            }
            _ => {
                let _ = self.fail(err);
            }
        }
    }

    fn finalize(&mut self) {
        match assemble(&self.chunks, &self.blob_options) {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                self.teardown();
                self.artifact = Some(artifact.clone());
                self.set_status(RecorderStatus::Stopped);
                info!("Recorder {}: finalized {}", self.handle, artifact);
                self.notify(RecorderUpdate::Finalized(artifact));
            }
            Err(e) => {
                let _ = self.fail(e);
            }
        }
    }

    /// Record a fault, release everything and return to idle
    fn fail(&mut self, err: CaptureError) -> CaptureError {
        let err = Arc::new(err);
        warn!("Recorder {} failed: {}", self.handle, err);
        self.teardown();
        self.error = Some(err.clone());
        self.set_status(RecorderStatus::Idle);
        self.notify(RecorderUpdate::Failed(err.clone()));
        CaptureError::Shared(err)
    }

    fn teardown(&mut self) {
        self.detach_backend();
        if let Some(stream) = self.stream.take() {
            stream.stop_all();
            debug!("Recorder {}: released stream {}", self.handle, stream.id());
        }
        self.acquirer.release();
    }

    fn detach_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            if backend.state() != BackendState::Inactive {
                if let Err(e) = backend.stop() {
                    debug!("Recorder {}: platform recorder stop failed: {}", self.handle, e);
                }
            }
        }
        self.events_rx = None;
        self.session = None;
    }

    fn set_status(&mut self, status: RecorderStatus) {
        if self.status == status {
            return;
        }
        info!("Recorder {}: {} -> {}", self.handle, self.status, status);
        self.status = status;
        self.notify(RecorderUpdate::Status(status));
    }

    fn notify(&self, update: RecorderUpdate) {
        // No receivers is fine
        let _ = self.updates.send(update);
    }

    /// Get the recorder handle
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Get the current status
    pub fn status(&self) -> RecorderStatus {
        self.status
    }

    /// Current recording session, if a platform recorder is open
    pub fn session(&self) -> Option<Handle> {
        self.session
    }

    /// Last session fault
    pub fn error(&self) -> Option<Arc<CaptureError>> {
        self.error.clone()
    }

    /// Finalized recording
    pub fn media_artifact(&self) -> Option<Arc<MediaArtifact>> {
        self.artifact.clone()
    }

    /// Number of buffered chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total buffered bytes
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(MediaChunk::len).sum()
    }

    /// The held stream
    pub fn live_stream(&self) -> Option<&P::Stream> {
        self.stream.as_ref()
    }

    /// Video tracks of the held stream, for host-side preview
    pub fn live_preview(&self) -> Option<Vec<Arc<dyn MediaTrack>>> {
        self.stream.as_ref().map(|stream| stream.video_tracks())
    }

    /// Handle for requesting a stop while `start` is suspended
    pub fn control(&self) -> RecorderControl {
        self.control.clone()
    }

    /// Subscribe to status changes, chunks, results and faults
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderUpdate> {
        self.updates.subscribe()
    }

    pub fn kind(&self) -> CaptureKind {
        self.acquirer.kind()
    }

    /// Constraint keys the platform will likely ignore
    pub fn constraint_warnings(&self) -> &[ConstraintWarning] {
        self.acquirer.warnings()
    }
}

impl<P: MediaPlatform> Drop for Recorder<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
