//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Coordinates a single physical camera through its full operating
//! lifecycle: live preview, still capture with autofocus/auto-exposure
//! convergence, video recording, and raw frame streaming — four mutually
//! exclusive modes multiplexed over one capture pipeline. Platform backends
//! implement the hardware traits (`CameraHal`, `CameraDevice`,
//! `CaptureSessionHandle`, `FrameReader`, `VideoEncoder`, `RenderTarget`)
//! and plug into the generic [`CameraController`].
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CameraHal, CameraDevice, CaptureSessionHandle,
//! │                   FrameReader, VideoEncoder, RenderTarget,
//! │                   CameraDelegate, FrameSink
//! ├── models/       ← CameraError, CaptureRequest, LockState,
//! │                   CameraConfiguration, CameraCapabilities, FrameImage
//! ├── controls/     ← mode policy, orientation, metering geometry
//! ├── processing/   ← frame plane extraction
//! ├── session/      ← CameraController (session manager, lock sequence,
//! │                   manual focus, recording, frame stream)
//! └── storage/      ← image file output, recording metadata sidecar
//! ```
//!
//! ## Concurrency
//!
//! Two execution contexts touch session state: the command context (caller
//! operations) and the hardware callback context (device events, session
//! configuration results, per-capture results). Both enter through one
//! mutex-guarded critical section per controller; every hardware callback
//! carries the session generation it was created under and is discarded once
//! superseded.

pub mod controls;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{
    FlashMode, FrameImage, FramePlane, FrameSize, LensFacing, NormalizedPoint, PixelFormat,
    SensorRect, TargetHandle,
};
pub use models::config::{CameraCapabilities, CameraConfiguration, RecordingProfile};
pub use models::error::{CameraError, CaptureFailureReason, DeviceFault};
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::request::{
    AfTrigger, AutoExposureMode, AutoExposureStatus, AutoFocusMode, AutoFocusStatus,
    CaptureRequest, CaptureTemplate, CaptureUpdate, ControlMode, FlashControl, MeteringRectangle,
    PrecaptureTrigger, METERING_WEIGHT_MAX,
};
pub use models::state::{LockState, RecordingState};
pub use processing::frame_extractor::extract_frame;
pub use session::{CameraController, FocusResponder, OpenReply, PictureResponder};
pub use traits::camera_delegate::CameraDelegate;
pub use traits::camera_device::{CameraDevice, SessionEvent, SessionStateCallback};
pub use traits::camera_hal::{CameraHal, DeviceEvent, DeviceEventCallback};
pub use traits::capture_session::{CaptureEvent, CaptureListener, CaptureSessionHandle};
pub use traits::frame_reader::{FrameListener, FrameReader, HardwareFrame, PlaneView};
pub use traits::frame_sink::FrameSink;
pub use traits::render_target::RenderTarget;
pub use traits::video_encoder::VideoEncoder;
