//! Scripted video encoder: records the call sequence a real encoder
//! pipeline would see and fails on demand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{CameraError, RecordingProfile, TargetHandle, VideoEncoder};

#[derive(Default)]
pub(crate) struct EncoderState {
    pub(crate) target: Option<TargetHandle>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) orientation_hint: Option<i32>,
    pub(crate) enable_audio: Option<bool>,
    pub(crate) profile: Option<RecordingProfile>,
    pub(crate) prepared: bool,
    pub(crate) started: bool,
    pub(crate) paused: bool,
    pub(crate) stopped: bool,
    pub(crate) start_count: usize,
    pub(crate) stop_count: usize,
    pub(crate) reset_count: usize,
    pub(crate) fail_prepare: bool,
    pub(crate) fail_start: bool,
    pub(crate) fail_pause: bool,
    pub(crate) fail_resume: bool,
    pub(crate) fail_stop: bool,
}

/// Inspectable snapshot of an encoder's lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSnapshot {
    pub output: Option<PathBuf>,
    pub orientation_hint: Option<i32>,
    pub enable_audio: Option<bool>,
    pub prepared: bool,
    pub started: bool,
    pub paused: bool,
    pub stopped: bool,
    pub start_count: usize,
    pub stop_count: usize,
    pub reset_count: usize,
}

impl EncoderState {
    pub(crate) fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot {
            output: self.output.clone(),
            orientation_hint: self.orientation_hint,
            enable_audio: self.enable_audio,
            prepared: self.prepared,
            started: self.started,
            paused: self.paused,
            stopped: self.stopped,
            start_count: self.start_count,
            stop_count: self.stop_count,
            reset_count: self.reset_count,
        }
    }
}

pub(crate) struct VirtualEncoder {
    pub(crate) state: Arc<Mutex<EncoderState>>,
}

impl VideoEncoder for VirtualEncoder {
    fn prepare(
        &mut self,
        profile: &RecordingProfile,
        output: &Path,
        orientation_hint: i32,
        enable_audio: bool,
    ) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_prepare {
            return Err(CameraError::RecordingFailed(
                "virtual encoder refused to prepare".into(),
            ));
        }
        state.profile = Some(profile.clone());
        state.output = Some(output.to_path_buf());
        state.orientation_hint = Some(orientation_hint);
        state.enable_audio = Some(enable_audio);
        state.prepared = true;
        Ok(())
    }

    fn target(&self) -> TargetHandle {
        self.state
            .lock()
            .target
            .expect("virtual encoder target queried before prepare")
    }

    fn start(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_start {
            return Err(CameraError::RecordingFailed(
                "virtual encoder failed to start".into(),
            ));
        }
        state.started = true;
        state.stopped = false;
        state.start_count += 1;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_pause {
            return Err(CameraError::RecordingFailed(
                "virtual encoder failed to pause".into(),
            ));
        }
        state.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_resume {
            return Err(CameraError::RecordingFailed(
                "virtual encoder failed to resume".into(),
            ));
        }
        state.paused = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.fail_stop {
            return Err(CameraError::RecordingFailed(
                "virtual encoder failed to stop".into(),
            ));
        }
        state.started = false;
        state.stopped = true;
        state.stop_count += 1;
        Ok(())
    }

    fn reset(&mut self) {
        let mut state = self.state.lock();
        state.prepared = false;
        state.started = false;
        state.paused = false;
        state.reset_count += 1;
    }
}
