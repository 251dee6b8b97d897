//! Live stream acquisition
//!
//! Checks platform capabilities and requested constraints, then prompts
//! the host for a screen or camera stream. A held stream is reused until
//! it is taken or released.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::constraints::{ConstraintWarning, MediaStreamConstraints, validate_constraints};
use super::platform::{MediaPlatform, MediaStream, PlatformCapabilities};
use crate::error::{CaptureError, Result};
use crate::types::CaptureKind;

/// Acquisition progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireState {
    /// Nothing requested, or the stream was handed off / released
    Idle,
    /// Waiting on the host (permission prompt, device open)
    Acquiring,
    /// A stream is held
    Ready,
    /// The last attempt was rejected
    Failed,
}

/// Requests a live stream from the host platform
pub struct StreamAcquirer<P: MediaPlatform> {
    platform: Arc<P>,
    kind: CaptureKind,
    constraints: MediaStreamConstraints,
    warnings: Vec<ConstraintWarning>,
    state: AcquireState,
    stream: Option<P::Stream>,
}

impl<P: MediaPlatform> StreamAcquirer<P> {
    /// Create an acquirer for `kind`
    ///
    /// Fails up front if the platform cannot capture this kind at all.
    /// Unsupported constraint keys are logged and kept as warnings.
    pub fn new(
        platform: Arc<P>,
        kind: CaptureKind,
        constraints: MediaStreamConstraints,
    ) -> Result<Self> {
        check_capabilities(&platform.capabilities(), kind)?;

        let warnings = validate_constraints(&constraints, &platform.supported_constraints());

        Ok(Self {
            platform,
            kind,
            constraints,
            warnings,
            state: AcquireState::Idle,
            stream: None,
        })
    }

    /// Acquire a stream, or return the one already held
    pub async fn acquire(&mut self) -> Result<&P::Stream> {
        if self.stream.is_some() {
            debug!("Reusing held {} stream", self.kind);
            return self.stream.as_ref().ok_or(CaptureError::NoActiveSession);
        }

        check_capabilities(&self.platform.capabilities(), self.kind)?;

        self.state = AcquireState::Acquiring;
        info!("Requesting {} stream", self.kind);

        let result = match self.kind {
            CaptureKind::Screen => self.platform.acquire_display_stream(&self.constraints).await,
            CaptureKind::Camera => self.platform.acquire_device_stream(&self.constraints).await,
        };

        match result {
            Ok(stream) => {
                info!(
                    "Acquired {} stream {} with {} tracks",
                    self.kind,
                    stream.id(),
                    stream.tracks().len()
                );
                self.state = AcquireState::Ready;
                Ok(&*self.stream.insert(stream))
            }
            Err(e) => {
                warn!("Failed to acquire {} stream: {}", self.kind, e);
                self.state = AcquireState::Failed;
                Err(e)
            }
        }
    }

    /// Hand the held stream off to the caller
    pub fn take(&mut self) -> Option<P::Stream> {
        let stream = self.stream.take();
        if stream.is_some() {
            self.state = AcquireState::Idle;
        }
        stream
    }

    /// Stop and drop the held stream
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_all();
            debug!("Released {} stream {}", self.kind, stream.id());
        }
        self.state = AcquireState::Idle;
    }

    /// The held stream
    pub fn stream(&self) -> Option<&P::Stream> {
        self.stream.as_ref()
    }

    pub fn state(&self) -> AcquireState {
        self.state
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn constraints(&self) -> &MediaStreamConstraints {
        &self.constraints
    }

    /// Constraint keys the platform will likely ignore
    pub fn warnings(&self) -> &[ConstraintWarning] {
        &self.warnings
    }
}

/// Fail with [`CaptureError::CapabilityMissing`] if `kind` cannot be captured
pub fn check_capabilities(capabilities: &PlatformCapabilities, kind: CaptureKind) -> Result<()> {
    match kind {
        CaptureKind::Screen if !capabilities.display_capture => Err(CaptureError::capability(
            "This platform does not support screen capturing",
        )),
        CaptureKind::Camera if !capabilities.device_capture => Err(CaptureError::capability(
            "This platform does not support camera capture",
        )),
        _ => Ok(()),
    }
}
