use std::sync::Arc;

use crate::models::camera_models::{PixelFormat, TargetHandle};

/// Callback signalling that a frame is available for acquisition.
pub type FrameListener = Arc<dyn Fn() + Send + Sync + 'static>;

/// Borrowed view of one plane of a hardware frame buffer.
pub struct PlaneView<'a> {
    pub bytes_per_row: u32,
    pub bytes_per_pixel: u32,
    pub bytes: &'a [u8],
}

/// A frame buffer still owned by the hardware layer.
///
/// The underlying buffer is released back to the reader when this value is
/// dropped; extract what you need and drop it promptly.
pub trait HardwareFrame: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> PixelFormat;
    fn plane_count(&self) -> usize;
    fn plane(&self, index: usize) -> PlaneView<'_>;
}

/// A bounded pool of frame buffers fed by a capture target.
pub trait FrameReader: Send {
    /// The capture target this reader is backed by.
    fn target(&self) -> TargetHandle;

    /// Install or clear the frame-available callback.
    fn set_frame_listener(&mut self, listener: Option<FrameListener>);

    /// Acquire the newest available frame, discarding anything older.
    /// Returns `None` when no frame is waiting.
    fn acquire_latest(&mut self) -> Option<Box<dyn HardwareFrame>>;

    /// Release the reader and its buffers. Idempotent.
    fn close(&mut self);
}
