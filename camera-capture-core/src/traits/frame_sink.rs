use crate::models::camera_models::FrameImage;

/// Consumer of the raw frame stream.
///
/// At most one sink is active; delivery happens on the hardware callback
/// context with no buffering beyond the single in-flight frame.
pub trait FrameSink: Send + Sync {
    fn on_frame(&self, frame: FrameImage);
}
