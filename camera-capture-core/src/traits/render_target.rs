use crate::models::camera_models::{FrameSize, TargetHandle};

/// The platform-owned drawable the live preview renders into.
///
/// The core only sizes its buffers and binds it into capture sessions; the
/// platform owns allocation and presentation.
pub trait RenderTarget: Send {
    /// Resize the buffers backing this target.
    fn set_buffer_size(&mut self, size: FrameSize);

    fn handle(&self) -> TargetHandle;
}
