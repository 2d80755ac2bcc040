use std::path::Path;

use crate::models::camera_models::TargetHandle;
use crate::models::config::RecordingProfile;
use crate::models::error::CameraError;

/// An encoding pipeline that consumes frames from a capture target.
///
/// Call order matters: `prepare` before `target`/`start`, `stop` before the
/// output file is complete, `reset` to return to the unprepared state.
/// Implementations surface failures as [`CameraError::RecordingFailed`].
pub trait VideoEncoder: Send {
    /// Configure the pipeline against a negotiated profile and destination.
    fn prepare(
        &mut self,
        profile: &RecordingProfile,
        output: &Path,
        orientation_hint: i32,
        enable_audio: bool,
    ) -> Result<(), CameraError>;

    /// The capture target frames must be rendered into. Only valid after a
    /// successful `prepare`.
    fn target(&self) -> TargetHandle;

    fn start(&mut self) -> Result<(), CameraError>;

    fn pause(&mut self) -> Result<(), CameraError>;

    fn resume(&mut self) -> Result<(), CameraError>;

    /// Stop encoding and finalize the output file.
    fn stop(&mut self) -> Result<(), CameraError>;

    /// Return to the unprepared state, releasing pipeline resources.
    /// Safe to call in any state.
    fn reset(&mut self);
}
