//! Scripted render target standing in for the platform's preview surface.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{FrameSize, RenderTarget, TargetHandle};

pub(crate) struct RenderTargetState {
    pub(crate) target: TargetHandle,
    pub(crate) buffer_size: Option<FrameSize>,
}

/// A preview surface allocated by [`crate::VirtualCameraHal::new_render_target`].
pub struct VirtualRenderTarget {
    pub(crate) state: Arc<Mutex<RenderTargetState>>,
}

impl RenderTarget for VirtualRenderTarget {
    fn set_buffer_size(&mut self, size: FrameSize) {
        self.state.lock().buffer_size = Some(size);
    }

    fn handle(&self) -> TargetHandle {
        self.state.lock().target
    }
}
