//! Raw frame streaming: rebuilds the session around the dedicated streaming
//! reader and pushes the newest available frame to the single active sink.

use std::sync::Arc;

use crate::models::error::CameraError;
use crate::models::request::CaptureTemplate;
use crate::processing::frame_extractor;
use crate::session::camera::{CameraController, SharedCore};
use crate::traits::frame_reader::FrameListener;
use crate::traits::frame_sink::FrameSink;

impl CameraController {
    /// Start the preview with a raw frame stream attached.
    ///
    /// Rebuilds the session with the record template bound to the streaming
    /// reader (decoupled from the still-capture target) and installs `sink`
    /// as the single subscriber.
    pub fn start_preview_with_frame_stream(
        &self,
        sink: Arc<dyn FrameSink>,
    ) -> Result<(), CameraError> {
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            let stream_target = match inner.stream_reader.as_ref() {
                Some(reader) => reader.target(),
                None => return Err(CameraError::NotOpen),
            };
            inner.reconfigure(
                &core,
                deferred,
                CaptureTemplate::Record,
                vec![stream_target],
                None,
            )?;

            inner.frame_sink = Some(sink);
            let epoch = inner.epoch;
            let weak = Arc::downgrade(&core);
            let listener: FrameListener = Arc::new(move || {
                if let Some(core) = weak.upgrade() {
                    handle_stream_frame(&core, epoch);
                }
            });
            if let Some(reader) = inner.stream_reader.as_mut() {
                reader.set_frame_listener(Some(listener));
            }
            Ok(())
        })
    }

    /// Unsubscribe the frame sink; no further frames are produced until a
    /// new subscription re-arms the stream.
    pub fn stop_frame_stream(&self) -> Result<(), CameraError> {
        self.enter(|inner, _deferred| {
            if let Some(reader) = inner.stream_reader.as_mut() {
                reader.set_frame_listener(None);
            }
            inner.frame_sink = None;
            Ok(())
        })
    }
}

/// One frame-available signal: acquire only the newest frame (older
/// undelivered frames are dropped by the reader), extract it, release the
/// hardware buffer, and deliver outside the lock. No frame waiting is a
/// silent no-op.
fn handle_stream_frame(core: &Arc<SharedCore>, epoch: u64) {
    let delivery = core.enter(|inner, _deferred| {
        if epoch != inner.epoch {
            return None;
        }
        let sink = inner.frame_sink.clone()?;
        let reader = inner.stream_reader.as_mut()?;
        let frame = reader.acquire_latest()?;
        let image = frame_extractor::extract_frame(frame.as_ref());
        // Hardware buffer released here when `frame` drops.
        Some((sink, image))
    });
    if let Some((sink, image)) = delivery {
        sink.on_frame(image);
    }
}
