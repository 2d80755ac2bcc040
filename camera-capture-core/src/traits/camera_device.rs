use crate::models::camera_models::TargetHandle;
use crate::models::error::CameraError;
use crate::models::request::CaptureTemplate;
use crate::traits::capture_session::CaptureSessionHandle;

/// Outcome of an asynchronous session configuration.
pub enum SessionEvent {
    /// The session is live; requests may now be submitted through the handle.
    Configured(Box<dyn CaptureSessionHandle>),
    /// The hardware rejected the target/template combination.
    ConfigureFailed(String),
}

/// One-shot callback reporting the outcome of `create_session`.
pub type SessionStateCallback = Box<dyn FnOnce(SessionEvent) + Send + 'static>;

/// An open camera device.
///
/// At most one capture session is live at a time; creating a new one
/// requires the previous session to have been closed first.
pub trait CameraDevice: Send {
    /// Begin configuring a capture session binding `targets`.
    ///
    /// Returns once configuration is underway; the outcome arrives on the
    /// hardware callback context via `on_state`.
    fn create_session(
        &mut self,
        template: CaptureTemplate,
        targets: Vec<TargetHandle>,
        on_state: SessionStateCallback,
    ) -> Result<(), CameraError>;

    /// Release the device. Idempotent.
    fn close(&mut self);
}
