//! # camera-capture-virtual
//!
//! Scripted in-memory backend for `camera-capture-core`.
//!
//! Provides:
//! - `VirtualCameraHal` — implements every hardware trait of the core over
//!   one inspectable state tree; nothing progresses until the driving test
//!   delivers the hardware-side outcome
//! - `VirtualRenderTarget` — stand-in preview surface
//! - `FrameData` — frame contents pushed into virtual readers
//! - `EventRecorder` / `FrameCollector` — ready-made delegate and frame
//!   sink implementations that record what they receive
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_capture_core::{CameraCapabilities, CameraConfiguration, CameraController};
//! use camera_capture_virtual::{EventRecorder, VirtualCameraHal};
//!
//! let hal = Arc::new(VirtualCameraHal::new());
//! let delegate = Arc::new(EventRecorder::new());
//! let target = hal.new_render_target();
//! let camera = CameraController::new(
//!     Arc::clone(&hal) as _,
//!     CameraConfiguration::default(),
//!     CameraCapabilities::default(),
//!     Box::new(target),
//!     delegate,
//! )?;
//! camera.open()?;
//! hal.complete_session_configuration();
//! ```

mod capture_session;
mod device;
mod frame_reader;
mod hal;
mod render_target;
mod video_encoder;

pub use frame_reader::FrameData;
pub use hal::VirtualCameraHal;
pub use render_target::VirtualRenderTarget;
pub use video_encoder::EncoderSnapshot;

use parking_lot::Mutex;

use camera_capture_core::{CameraDelegate, CameraError, FrameImage, FrameSink};

/// Delegate implementation that records every event it receives.
#[derive(Default)]
pub struct EventRecorder {
    errors: Mutex<Vec<CameraError>>,
    closing_count: Mutex<usize>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<CameraError> {
        self.errors.lock().clone()
    }

    pub fn closing_count(&self) -> usize {
        *self.closing_count.lock()
    }
}

impl CameraDelegate for EventRecorder {
    fn on_error(&self, error: &CameraError) {
        self.errors.lock().push(error.clone());
    }

    fn on_closing(&self) {
        *self.closing_count.lock() += 1;
    }
}

/// Frame sink that collects every delivered frame.
#[derive(Default)]
pub struct FrameCollector {
    frames: Mutex<Vec<FrameImage>>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<FrameImage> {
        self.frames.lock().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }
}

impl FrameSink for FrameCollector {
    fn on_frame(&self, frame: FrameImage) {
        self.frames.lock().push(frame);
    }
}
