//! Scripted capture session: records every submission for inspection and
//! replays results only when the driving test asks for them.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    CameraError, CaptureListener, CaptureRequest, CaptureSessionHandle, CaptureTemplate,
    TargetHandle,
};

/// One recorded one-shot capture submission.
pub(crate) struct CaptureSlot {
    pub(crate) request: CaptureRequest,
    pub(crate) listener: Option<CaptureListener>,
    pub(crate) terminal: bool,
}

pub(crate) struct SessionState {
    pub(crate) template: CaptureTemplate,
    pub(crate) targets: Vec<TargetHandle>,
    pub(crate) repeating: Option<CaptureRequest>,
    pub(crate) repeating_listener: Option<CaptureListener>,
    pub(crate) repeating_active: bool,
    pub(crate) set_repeating_count: usize,
    pub(crate) stop_repeating_count: usize,
    pub(crate) captures: Vec<CaptureSlot>,
    pub(crate) closed: bool,
    pub(crate) fail_next_repeating: Option<CameraError>,
    pub(crate) fail_next_capture: Option<CameraError>,
}

impl SessionState {
    pub(crate) fn new(template: CaptureTemplate, targets: Vec<TargetHandle>) -> Self {
        Self {
            template,
            targets,
            repeating: None,
            repeating_listener: None,
            repeating_active: false,
            set_repeating_count: 0,
            stop_repeating_count: 0,
            captures: Vec::new(),
            closed: false,
            fail_next_repeating: None,
            fail_next_capture: None,
        }
    }
}

pub(crate) struct VirtualSession {
    pub(crate) state: Arc<Mutex<SessionState>>,
}

impl CaptureSessionHandle for VirtualSession {
    fn set_repeating(
        &mut self,
        request: CaptureRequest,
        listener: Option<CaptureListener>,
    ) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CameraError::Access("session is closed".into()));
        }
        if let Some(error) = state.fail_next_repeating.take() {
            return Err(error);
        }
        state.repeating = Some(request);
        state.repeating_listener = listener;
        state.repeating_active = true;
        state.set_repeating_count += 1;
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CameraError::Access("session is closed".into()));
        }
        state.repeating_active = false;
        state.stop_repeating_count += 1;
        Ok(())
    }

    fn capture(
        &mut self,
        request: CaptureRequest,
        listener: Option<CaptureListener>,
    ) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CameraError::Access("session is closed".into()));
        }
        if let Some(error) = state.fail_next_capture.take() {
            return Err(error);
        }
        state.captures.push(CaptureSlot {
            request,
            listener,
            terminal: false,
        });
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.repeating_active = false;
        state.repeating_listener = None;
    }
}
