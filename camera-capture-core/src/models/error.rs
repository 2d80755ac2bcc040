use std::fmt;

use thiserror::Error;

/// Errors that can occur during camera capture operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("file at '{0}' already exists")]
    DestinationExists(String),

    #[error("a still capture is already pending")]
    CaptureInProgress,

    #[error("camera is not open")]
    NotOpen,

    #[error("camera access error: {0}")]
    Access(String),

    #[error("failed to configure capture session: {0}")]
    ConfigurationFailed(String),

    #[error("capture failed: {0}")]
    CaptureFailed(CaptureFailureReason),

    #[error("video recording failed: {0}")]
    RecordingFailed(String),

    #[error("manual focus failed: {0}")]
    FocusFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("device fault: {0}")]
    DeviceFault(DeviceFault),

    #[error("the camera was disconnected")]
    Disconnected,
}

/// Why a submitted capture did not complete.
///
/// Distinguishes driver-side errors from captures flushed by an abort
/// (session teardown, device close).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFailureReason {
    /// An error happened in the framework driver.
    Driver,
    /// The capture was flushed before completion.
    Aborted,
}

impl fmt::Display for CaptureFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => write!(f, "an error happened in the framework driver"),
            Self::Aborted => write!(f, "the capture was aborted before completion"),
        }
    }
}

/// Fatal device-level fault categories reported by the hardware layer.
///
/// Every fault forces a close of the session and surfaces on the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFault {
    /// The camera device is already in use.
    InUse,
    /// The maximum number of open cameras has been reached.
    MaxInUse,
    /// The camera device could not be opened due to a device policy.
    Disabled,
    /// The camera device has encountered a fatal error.
    Device,
    /// The camera service has encountered a fatal error.
    Service,
}

impl fmt::Display for DeviceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InUse => write!(f, "the camera device is already in use"),
            Self::MaxInUse => write!(f, "too many cameras are in use"),
            Self::Disabled => write!(f, "the camera device is disabled by a device policy"),
            Self::Device => write!(f, "the camera device has encountered a fatal error"),
            Self::Service => write!(f, "the camera service has encountered a fatal error"),
        }
    }
}
