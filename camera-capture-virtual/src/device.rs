//! Scripted camera device: session configuration is parked until the
//! driving test completes it through the HAL.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    CameraDevice, CameraError, CaptureTemplate, SessionStateCallback, TargetHandle,
};

use crate::hal::{PendingSession, VirtualState};

pub(crate) struct VirtualDevice {
    pub(crate) state: Arc<Mutex<VirtualState>>,
}

impl CameraDevice for VirtualDevice {
    fn create_session(
        &mut self,
        template: CaptureTemplate,
        targets: Vec<TargetHandle>,
        on_state: SessionStateCallback,
    ) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        if !state.device_open {
            return Err(CameraError::NotOpen);
        }
        state.pending_session = Some(PendingSession {
            template,
            targets,
            on_state,
        });
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.device_open = false;
        state.device_close_count += 1;
        // The asynchronous Closed notification is the test's to emit, the
        // way the platform delivers it on its own callback queue.
    }
}
