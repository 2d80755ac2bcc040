use std::sync::Arc;

use crate::models::error::{CameraError, CaptureFailureReason};
use crate::models::request::{CaptureRequest, CaptureUpdate};

/// Progress of one submitted capture, delivered on the hardware callback
/// context. Repeating requests produce a stream of these; one-shot captures
/// end with `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A partial result arrived; more will follow for this capture.
    Progressed(CaptureUpdate),
    /// The capture finished. `tag` echoes the request's correlation tag.
    Completed {
        tag: Option<u64>,
        update: CaptureUpdate,
    },
    /// The capture did not complete.
    Failed(CaptureFailureReason),
}

/// Callback receiving capture events for a submitted request.
pub type CaptureListener = Arc<dyn Fn(CaptureEvent) + Send + Sync + 'static>;

/// A live capture session bound to a fixed target set.
///
/// The target set is immutable once configured; changing targets or template
/// means closing this session and creating a new one on the device.
pub trait CaptureSessionHandle: Send {
    /// Install or replace the continuously resubmitted repeating request.
    fn set_repeating(
        &mut self,
        request: CaptureRequest,
        listener: Option<CaptureListener>,
    ) -> Result<(), CameraError>;

    /// Stop resubmitting the repeating request.
    fn stop_repeating(&mut self) -> Result<(), CameraError>;

    /// Submit a one-shot capture.
    fn capture(
        &mut self,
        request: CaptureRequest,
        listener: Option<CaptureListener>,
    ) -> Result<(), CameraError>;

    /// Tear the session down. In-flight captures are flushed. Idempotent.
    fn close(&mut self);
}
