use crate::models::error::CameraError;

/// Push-event sink for asynchronous camera notifications.
///
/// Methods are called from the hardware callback context, never from the
/// command context, and never while session state is locked — an
/// implementation may call back into the controller.
pub trait CameraDelegate: Send + Sync {
    /// A categorized error with no per-call result channel to land on.
    fn on_error(&self, error: &CameraError);

    /// The device reported that it is closing.
    fn on_closing(&self);
}
