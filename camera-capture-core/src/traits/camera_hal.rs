use std::sync::Arc;

use crate::models::camera_models::{FrameSize, PixelFormat};
use crate::models::error::{CameraError, DeviceFault};
use crate::traits::camera_device::CameraDevice;
use crate::traits::frame_reader::FrameReader;
use crate::traits::video_encoder::VideoEncoder;

/// Asynchronous device-level notification from the hardware layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The device was disconnected (unplugged, preempted).
    Disconnected,
    /// The device or its service hit a fatal fault.
    Fault(DeviceFault),
    /// The device finished closing.
    Closed,
}

/// Callback invoked for device-level events.
///
/// Fires on the hardware callback context, serialized with capture results
/// and session state callbacks.
pub type DeviceEventCallback = Arc<dyn Fn(DeviceEvent) + Send + Sync + 'static>;

/// Entry point into the platform camera stack.
///
/// Implementations must deliver every callback from their own serialized
/// delivery context, never synchronously from within a call into the HAL —
/// the core re-enters its session state from callbacks.
pub trait CameraHal: Send + Sync {
    /// Acquire exclusive ownership of the physical camera.
    ///
    /// Device loss after a successful open is reported through `events`.
    fn open_device(&self, events: DeviceEventCallback) -> Result<Box<dyn CameraDevice>, CameraError>;

    /// Allocate a frame reader whose target can be bound into a capture
    /// session. `max_frames` bounds how many undelivered buffers the reader
    /// may hold.
    fn new_frame_reader(
        &self,
        size: FrameSize,
        format: PixelFormat,
        max_frames: usize,
    ) -> Result<Box<dyn FrameReader>, CameraError>;

    /// Allocate an unprepared video encoder pipeline.
    fn new_video_encoder(&self) -> Result<Box<dyn VideoEncoder>, CameraError>;
}
