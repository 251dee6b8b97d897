//! Error types for Glimpse

use std::sync::Arc;
use thiserror::Error;

/// Result type alias using CaptureError
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Main error type for Glimpse operations
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The host platform lacks a required primitive
    #[error("Capability missing: {0}")]
    CapabilityMissing(String),

    /// The user (or host policy) refused access to the media source
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No device or source matched the request
    #[error("No device: {0}")]
    NoDevice(String),

    /// A requested constraint is not understood by the platform
    #[error("Unsupported constraint: {0}")]
    UnsupportedConstraint(String),

    /// The underlying recorder reported a failure mid-session
    #[error("Recorder fault: {0}")]
    RecorderFault(String),

    /// Finalization was attempted without any recorded data
    #[error("Recording produced no data")]
    EmptyArtifact,

    /// Rendering or cropping the captured surface failed
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// Pointer released without a drag in progress
    #[error("No active region selection")]
    NoActiveSelection,

    /// No recording in progress
    #[error("No active capture session")]
    NoActiveSession,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session fault that is also kept on the recorder for later inspection
    #[error(transparent)]
    Shared(Arc<CaptureError>),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CaptureError>,
    },
}

impl CaptureError {
    /// Create a capability-missing error
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::CapabilityMissing(msg.into())
    }

    /// Create a permission-denied error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a no-device error
    pub fn no_device(msg: impl Into<String>) -> Self {
        Self::NoDevice(msg.into())
    }

    /// Create a recorder fault
    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::RecorderFault(msg.into())
    }

    /// Create a rasterization error
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with all context layers stripped
    pub fn root(&self) -> &CaptureError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// A short hint on how the user can resolve this error
    pub fn user_hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::CapabilityMissing(_) => {
                Some("Use a browser with MediaRecorder and getDisplayMedia support")
            }
            Self::PermissionDenied(_) => Some("Grant screen or camera access and try again"),
            Self::NoDevice(_) => Some("Connect a camera or pick another capture source"),
            Self::UnsupportedConstraint(_) => {
                Some("Remove the constraint or check the platform's supported constraints")
            }
            Self::EmptyArtifact => Some("Record for longer before stopping"),
            Self::NoActiveSelection => Some("Press and drag to select a region first"),
            Self::NoActiveSession => Some("Start a recording first"),
            Self::Config(_) => Some("Check ~/.config/glimpse/config.toml for typos"),
            _ => None,
        }
    }

    /// Whether retrying the same session can succeed without code changes
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self.root(),
            Self::PermissionDenied(_)
                | Self::NoDevice(_)
                | Self::UnsupportedConstraint(_)
                | Self::EmptyArtifact
                | Self::NoActiveSelection
                | Self::NoActiveSession
                | Self::Config(_)
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

// Conversions from external error types

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        Self::Rasterize(err.to_string())
    }
}

impl From<toml::de::Error> for CaptureError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("Failed to parse config file: {}", err))
    }
}

impl From<toml::ser::Error> for CaptureError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(format!("Failed to serialize config: {}", err))
    }
}
