//! File-backed host collaborators
//!
//! Lets the CLI drive the core without a browser: a PNG stands in for the
//! rendered page, and a media file is replayed as a screen stream whose
//! recorder emits fixed-size chunks on a timer.

use async_trait::async_trait;
use bytes::Bytes;
use glimpse_core::error::{CaptureError, Result};
use glimpse_core::media::{
    BackendState, MediaPlatform, MediaStream, MediaStreamConstraints, MediaTrack,
    PlatformCapabilities, RecorderBackend, RecorderEvents, RecorderOptions, SupportedConstraints,
};
use glimpse_core::region::{CaptureRasterizer, PixelSurface, RenderRequest, RenderTarget};
use glimpse_core::types::{MediaChunk, TrackKind};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Container types the replay recorder will label chunks with
const SUPPORTED_TYPES: &[&str] = &["video/webm", "video/mp4", "video/x-matroska", "audio/ogg"];

/// Guess a content type from the file extension
pub fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("webm") => "video/webm",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("ogg") | Some("opus") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// A static image standing in for the rendered page
pub struct ImageRasterizer {
    surface: PixelSurface,
}

impl ImageRasterizer {
    pub fn open(path: &Path) -> Result<Self> {
        let surface = image::open(path)?.to_rgba8();
        debug!(
            "Loaded {}x{} page snapshot from {:?}",
            surface.width(),
            surface.height(),
            path
        );
        Ok(Self { surface })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }
}

#[async_trait]
impl CaptureRasterizer for ImageRasterizer {
    async fn render(&self, request: &RenderRequest) -> Result<PixelSurface> {
        match request.target {
            RenderTarget::Document => Ok(self.surface.clone()),
            RenderTarget::Element(ref id) => Err(CaptureError::rasterize(format!(
                "Element '{}' does not exist in a flat snapshot",
                id
            ))),
        }
    }
}

pub struct FileTrack {
    id: String,
    live: AtomicBool,
}

impl MediaTrack for FileTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("Track {} ended", self.id);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// A media file opened as a single-track stream
pub struct FileStream {
    id: String,
    data: Bytes,
    track: Arc<FileTrack>,
}

impl FileStream {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl MediaStream for FileStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![self.track.clone() as Arc<dyn MediaTrack>]
    }
}

/// Replay position shared between the recorder and its timer task
struct Playback {
    data: Bytes,
    offset: usize,
    state: BackendState,
}

/// Recorder that slices the replayed file into chunks on a timer
pub struct FileRecorder {
    playback: Arc<Mutex<Playback>>,
    events: RecorderEvents,
    content_type: String,
    chunk_size: usize,
    timeslice: Duration,
    task: Option<JoinHandle<()>>,
}

impl RecorderBackend for FileRecorder {
    fn start(&mut self) -> Result<()> {
        {
            let mut playback = self.playback.lock();
            if playback.state != BackendState::Inactive {
                return Err(CaptureError::recorder("Replay recorder already started"));
            }
            playback.state = BackendState::Recording;
        }

        let playback = self.playback.clone();
        let events = self.events.clone();
        let content_type = self.content_type.clone();
        let chunk_size = self.chunk_size;
        let mut ticker = tokio::time::interval(self.timeslice);

        self.task = Some(tokio::spawn(async move {
            loop {
                ticker.tick().await;

                // Chunks are sent under the lock so none can follow the stop event
                let mut replay = playback.lock();
                match replay.state {
                    BackendState::Inactive => break,
                    BackendState::Paused => continue,
                    BackendState::Recording => {}
                }
                if replay.offset >= replay.data.len() {
                    continue;
                }

                let end = (replay.offset + chunk_size).min(replay.data.len());
                let chunk = replay.data.slice(replay.offset..end);
                replay.offset = end;
                trace!("Replayed up to byte {}", end);

                if !events.data_available(MediaChunk::new(chunk, content_type.as_str())) {
                    break;
                }
            }
        }));

        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playback.lock().state = BackendState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.playback.lock().state = BackendState::Recording;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut playback = self.playback.lock();
        playback.state = BackendState::Inactive;
        self.events.stopped();
        Ok(())
    }

    fn state(&self) -> BackendState {
        self.playback.lock().state
    }
}

impl Drop for FileRecorder {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Host platform that replays a media file as the "screen"
pub struct FilePlatform {
    input: PathBuf,
    chunk_size: usize,
    timeslice: Duration,
    streams: AtomicUsize,
}

impl FilePlatform {
    pub fn new(input: impl Into<PathBuf>, chunk_size: usize, timeslice: Duration) -> Self {
        Self {
            input: input.into(),
            chunk_size: chunk_size.max(1),
            timeslice,
            streams: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaPlatform for FilePlatform {
    type Stream = FileStream;

    fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities {
            recorder: true,
            display_capture: true,
            device_capture: false,
        }
    }

    fn supported_constraints(&self) -> SupportedConstraints {
        SupportedConstraints::standard()
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        let base = mime_type.split(';').next().unwrap_or_default().trim();
        SUPPORTED_TYPES.contains(&base)
    }

    async fn acquire_display_stream(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream> {
        if constraints.audio.is_requested() {
            debug!("Replay streams carry no separate audio track");
        }

        let data = tokio::fs::read(&self.input).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CaptureError::no_device(format!("{}: {}", self.input.display(), e))
            }
            std::io::ErrorKind::PermissionDenied => {
                CaptureError::permission(format!("{}: {}", self.input.display(), e))
            }
            _ => CaptureError::from(e),
        })?;

        if data.is_empty() {
            return Err(CaptureError::no_device(format!(
                "{} is empty",
                self.input.display()
            )));
        }

        let n = self.streams.fetch_add(1, Ordering::SeqCst);
        info!("Replaying {:?} ({} bytes) as screen", self.input, data.len());

        Ok(FileStream {
            id: format!("replay-{}", n),
            data: Bytes::from(data),
            track: Arc::new(FileTrack {
                id: format!("replay-{}-video", n),
                live: AtomicBool::new(true),
            }),
        })
    }

    async fn acquire_device_stream(
        &self,
        _constraints: &MediaStreamConstraints,
    ) -> Result<Self::Stream> {
        Err(CaptureError::capability("File replay cannot open camera devices"))
    }

    fn create_recorder(
        &self,
        stream: &Self::Stream,
        options: &RecorderOptions,
        events: RecorderEvents,
    ) -> Result<Box<dyn RecorderBackend>> {
        let content_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_content_type(&self.input).to_string());

        Ok(Box::new(FileRecorder {
            playback: Arc::new(Mutex::new(Playback {
                data: stream.data.clone(),
                offset: 0,
                state: BackendState::Inactive,
            })),
            events,
            content_type,
            chunk_size: self.chunk_size,
            timeslice: self.timeslice,
            task: None,
        }))
    }
}
