//! Mock infrastructure for testing
//!
//! Provides a scriptable media platform, recorder backend and rasterizer.

#![allow(dead_code)]

use async_trait::async_trait;
use glimpse_core::error::{CaptureError, Result};
use glimpse_core::media::{
    BackendState, MediaPlatform, MediaStream, MediaStreamConstraints, MediaTrack,
    PlatformCapabilities, RecorderBackend, RecorderEvents, RecorderOptions, SupportedConstraints,
};
use glimpse_core::region::{CaptureRasterizer, PixelSurface, RenderRequest};
use glimpse_core::types::{Handle, MediaChunk, TrackKind};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Content type emitted by the mock recorder
pub const MOCK_MIME: &str = "video/webm";

/// A track whose stopped state outlives the stream that owned it
pub struct MockTrack {
    id: String,
    kind: TrackKind,
    live: AtomicBool,
}

impl MockTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            live: AtomicBool::new(true),
        }
    }
}

impl MediaTrack for MockTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct MockStream {
    id: String,
    tracks: Vec<Arc<MockTrack>>,
}

impl MediaStream for MockStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .iter()
            .map(|track| track.clone() as Arc<dyn MediaTrack>)
            .collect()
    }
}

/// How the mock host answers acquisition prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Grant,
    Deny,
    NoDevice,
}

/// Test-side view of an opened recorder
#[derive(Clone)]
pub struct MockRecorderHandle {
    events: RecorderEvents,
    state: Arc<Mutex<BackendState>>,
}

impl MockRecorderHandle {
    pub fn session(&self) -> Handle {
        self.events.session()
    }

    pub fn state(&self) -> BackendState {
        *self.state.lock()
    }

    pub fn emit_chunk(&self, data: &'static [u8]) -> bool {
        self.events.data_available(MediaChunk::new(data, MOCK_MIME))
    }

    pub fn emit_error(&self, message: &str) -> bool {
        self.events.error(message)
    }

    pub fn emit_stopped(&self) -> bool {
        self.events.stopped()
    }

    pub fn is_attached(&self) -> bool {
        self.events.is_attached()
    }
}

/// Recorder backend that reports through the shared event sender
pub struct MockBackend {
    events: RecorderEvents,
    state: Arc<Mutex<BackendState>>,
    final_chunk: Option<&'static [u8]>,
    fail_start: bool,
}

impl RecorderBackend for MockBackend {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(CaptureError::recorder("mock recorder refused to start"));
        }
        *self.state.lock() = BackendState::Recording;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        *self.state.lock() = BackendState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        *self.state.lock() = BackendState::Recording;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        *self.state.lock() = BackendState::Inactive;
        if let Some(data) = self.final_chunk {
            self.events.data_available(MediaChunk::new(data, MOCK_MIME));
        }
        self.events.stopped();
        Ok(())
    }

    fn state(&self) -> BackendState {
        *self.state.lock()
    }
}

/// Scriptable media platform
pub struct MockPlatform {
    capabilities: PlatformCapabilities,
    supported: SupportedConstraints,
    mime_types: Vec<String>,
    answer: Mutex<PromptAnswer>,
    gate: Option<Arc<Notify>>,
    final_chunk: Option<&'static [u8]>,
    fail_start: bool,
    prompts: AtomicUsize,
    streams: AtomicUsize,
    tracks: Mutex<Vec<Arc<MockTrack>>>,
    recorders: Mutex<Vec<MockRecorderHandle>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            capabilities: PlatformCapabilities::full(),
            supported: SupportedConstraints::standard(),
            mime_types: vec![MOCK_MIME.to_string(), "video/webm;codecs=vp9".to_string()],
            answer: Mutex::new(PromptAnswer::Grant),
            gate: None,
            final_chunk: None,
            fail_start: false,
            prompts: AtomicUsize::new(0),
            streams: AtomicUsize::new(0),
            tracks: Mutex::new(Vec::new()),
            recorders: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_answer(self, answer: PromptAnswer) -> Self {
        *self.answer.lock() = answer;
        self
    }

    /// Hold every acquisition until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Flush `data` from the recorder when it is stopped
    pub fn with_final_chunk(mut self, data: &'static [u8]) -> Self {
        self.final_chunk = Some(data);
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn set_answer(&self, answer: PromptAnswer) {
        *self.answer.lock() = answer;
    }

    /// Number of acquisition prompts shown
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Every track ever handed out
    pub fn tracks(&self) -> Vec<Arc<MockTrack>> {
        self.tracks.lock().clone()
    }

    pub fn all_tracks_stopped(&self) -> bool {
        self.tracks.lock().iter().all(|track| !track.is_live())
    }

    pub fn recorder_count(&self) -> usize {
        self.recorders.lock().len()
    }

    pub fn recorder(&self, index: usize) -> MockRecorderHandle {
        self.recorders.lock()[index].clone()
    }

    pub fn last_recorder(&self) -> MockRecorderHandle {
        self.recorders
            .lock()
            .last()
            .cloned()
            .expect("no recorder was created")
    }

    async fn prompt(&self, constraints: &MediaStreamConstraints) -> Result<MockStream> {
        self.prompts.fetch_add(1, Ordering::SeqCst);

        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }

        match *self.answer.lock() {
            PromptAnswer::Grant => {}
            PromptAnswer::Deny => return Err(CaptureError::permission("denied by user")),
            PromptAnswer::NoDevice => return Err(CaptureError::no_device("nothing to capture")),
        }

        let n = self.streams.fetch_add(1, Ordering::SeqCst);
        let mut tracks = Vec::new();
        if constraints.video.is_requested() {
            tracks.push(Arc::new(MockTrack::new(format!("video-{}", n), TrackKind::Video)));
        }
        if constraints.audio.is_requested() {
            tracks.push(Arc::new(MockTrack::new(format!("audio-{}", n), TrackKind::Audio)));
        }
        self.tracks.lock().extend(tracks.iter().cloned());

        Ok(MockStream {
            id: format!("stream-{}", n),
            tracks,
        })
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaPlatform for MockPlatform {
    type Stream = MockStream;

    fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    fn supported_constraints(&self) -> SupportedConstraints {
        self.supported.clone()
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|t| t == mime_type)
    }

    async fn acquire_display_stream(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream> {
        self.prompt(constraints).await
    }

    async fn acquire_device_stream(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream> {
        self.prompt(constraints).await
    }

    fn create_recorder(
        &self,
        _stream: &Self::Stream,
        _options: &RecorderOptions,
        events: RecorderEvents,
    ) -> Result<Box<dyn RecorderBackend>> {
        let state = Arc::new(Mutex::new(BackendState::Inactive));
        self.recorders.lock().push(MockRecorderHandle {
            events: events.clone(),
            state: state.clone(),
        });
        Ok(Box::new(MockBackend {
            events,
            state,
            final_chunk: self.final_chunk,
            fail_start: self.fail_start,
        }))
    }
}

/// Rasterizer over a fixed surface where pixel (x, y) = [x, y, 0, 255]
pub struct MockRasterizer {
    surface: RgbaImage,
    fail: bool,
    requests: Mutex<Vec<RenderRequest>>,
}

impl MockRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        let surface = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        Self {
            surface,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(1, 1)
        }
    }

    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl CaptureRasterizer for MockRasterizer {
    async fn render(&self, request: &RenderRequest) -> Result<PixelSurface> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(CaptureError::rasterize("mock renderer failed"));
        }
        Ok(self.surface.clone())
    }
}

/// Decode a PNG artifact back to pixels
pub fn decode_png(png: &[u8]) -> RgbaImage {
    image::load_from_memory(png)
        .expect("artifact is not a valid PNG")
        .to_rgba8()
}
