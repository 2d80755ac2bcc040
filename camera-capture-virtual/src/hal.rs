//! The virtual camera HAL: one shared state tree behind the hardware
//! traits, plus the inspection and delivery surface tests drive.
//!
//! Delivery methods model the platform's serialized callback queue: state
//! locks are always released before a stored callback is invoked, so
//! callbacks may freely re-enter the controller (and, through it, this
//! backend).

use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    CameraDevice, CameraError, CameraHal, CaptureEvent, CaptureFailureReason, CaptureRequest,
    CaptureTemplate, CaptureUpdate, DeviceEvent, DeviceEventCallback, DeviceFault, FrameReader,
    FrameSize, PixelFormat, SessionEvent, SessionStateCallback, TargetHandle, VideoEncoder,
};

use crate::capture_session::{SessionState, VirtualSession};
use crate::device::VirtualDevice;
use crate::frame_reader::{FrameData, ReaderState, VirtualFrameReader};
use crate::render_target::{RenderTargetState, VirtualRenderTarget};
use crate::video_encoder::{EncoderSnapshot, EncoderState, VirtualEncoder};

pub(crate) struct PendingSession {
    pub(crate) template: CaptureTemplate,
    pub(crate) targets: Vec<TargetHandle>,
    pub(crate) on_state: SessionStateCallback,
}

pub(crate) struct VirtualState {
    next_target: u64,
    pub(crate) device_open: bool,
    pub(crate) device_close_count: usize,
    device_events: Option<DeviceEventCallback>,
    fail_open: bool,
    fail_configure: bool,
    pub(crate) pending_session: Option<PendingSession>,
    session: Option<Arc<Mutex<SessionState>>>,
    sessions_created: usize,
    readers: Vec<Arc<Mutex<ReaderState>>>,
    encoders: Vec<Arc<Mutex<EncoderState>>>,
    render_targets: Vec<Arc<Mutex<RenderTargetState>>>,
    fail_new_encoder: bool,
    fail_encoder_prepare: bool,
    fail_encoder_start: bool,
    fail_encoder_pause: bool,
    fail_encoder_resume: bool,
    fail_encoder_stop: bool,
}

impl VirtualState {
    fn allocate_target(&mut self) -> TargetHandle {
        self.next_target += 1;
        TargetHandle(self.next_target)
    }
}

/// A deterministic, fully scripted camera backend.
///
/// Commands from the core are recorded; nothing progresses until the
/// driving test delivers the corresponding hardware-side outcome
/// ([`complete_session_configuration`], [`complete_capture`],
/// [`push_frame`], [`emit_device_event`], …).
///
/// [`complete_session_configuration`]: VirtualCameraHal::complete_session_configuration
/// [`complete_capture`]: VirtualCameraHal::complete_capture
/// [`push_frame`]: VirtualCameraHal::push_frame
/// [`emit_device_event`]: VirtualCameraHal::emit_device_event
pub struct VirtualCameraHal {
    state: Arc<Mutex<VirtualState>>,
}

impl Default for VirtualCameraHal {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCameraHal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(VirtualState {
                next_target: 0,
                device_open: false,
                device_close_count: 0,
                device_events: None,
                fail_open: false,
                fail_configure: false,
                pending_session: None,
                session: None,
                sessions_created: 0,
                readers: Vec::new(),
                encoders: Vec::new(),
                render_targets: Vec::new(),
                fail_new_encoder: false,
                fail_encoder_prepare: false,
                fail_encoder_start: false,
                fail_encoder_pause: false,
                fail_encoder_resume: false,
                fail_encoder_stop: false,
            })),
        }
    }

    /// Allocate a preview surface, the way the platform hands one out.
    pub fn new_render_target(&self) -> VirtualRenderTarget {
        let mut state = self.state.lock();
        let target = state.allocate_target();
        let rt_state = Arc::new(Mutex::new(RenderTargetState {
            target,
            buffer_size: None,
        }));
        state.render_targets.push(Arc::clone(&rt_state));
        VirtualRenderTarget { state: rt_state }
    }

    // --- Failure priming ---

    /// Make the next `open_device` fail with an in-use fault.
    pub fn fail_open(&self) {
        self.state.lock().fail_open = true;
    }

    /// Make the next session configuration report failure.
    pub fn fail_next_session_configuration(&self) {
        self.state.lock().fail_configure = true;
    }

    /// Make the next one-shot capture submission be refused.
    pub fn fail_next_capture_submission(&self) {
        let session = self.current_session();
        session.lock().fail_next_capture =
            Some(CameraError::Access("virtual capture submission refused".into()));
    }

    /// Make the next repeating-request submission be refused.
    pub fn fail_next_repeating_submission(&self) {
        let session = self.current_session();
        session.lock().fail_next_repeating =
            Some(CameraError::Access("virtual repeating submission refused".into()));
    }

    pub fn fail_next_encoder(&self) {
        self.state.lock().fail_new_encoder = true;
    }

    pub fn fail_next_encoder_prepare(&self) {
        self.state.lock().fail_encoder_prepare = true;
    }

    pub fn fail_next_encoder_start(&self) {
        self.state.lock().fail_encoder_start = true;
    }

    pub fn fail_next_encoder_pause(&self) {
        self.state.lock().fail_encoder_pause = true;
    }

    pub fn fail_next_encoder_stop(&self) {
        self.state.lock().fail_encoder_stop = true;
    }

    // --- Device ---

    pub fn device_open(&self) -> bool {
        self.state.lock().device_open
    }

    pub fn device_close_count(&self) -> usize {
        self.state.lock().device_close_count
    }

    /// Deliver an asynchronous device event to the core.
    pub fn emit_device_event(&self, event: DeviceEvent) {
        let callback = self.state.lock().device_events.clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // --- Session configuration ---

    pub fn has_pending_session(&self) -> bool {
        self.state.lock().pending_session.is_some()
    }

    pub fn sessions_created(&self) -> usize {
        self.state.lock().sessions_created
    }

    /// Resolve the in-flight session configuration, successfully unless a
    /// failure was primed.
    pub fn complete_session_configuration(&self) {
        let (pending, outcome) = {
            let mut state = self.state.lock();
            let pending = state
                .pending_session
                .take()
                .expect("no session configuration in flight");
            if state.fail_configure {
                state.fail_configure = false;
                (pending, None)
            } else {
                let session = Arc::new(Mutex::new(SessionState::new(
                    pending.template,
                    pending.targets.clone(),
                )));
                state.session = Some(Arc::clone(&session));
                state.sessions_created += 1;
                (pending, Some(session))
            }
        };
        match outcome {
            Some(session) => (pending.on_state)(SessionEvent::Configured(Box::new(
                VirtualSession { state: session },
            ))),
            None => (pending.on_state)(SessionEvent::ConfigureFailed(
                "virtual backend refused the session configuration".into(),
            )),
        }
    }

    fn current_session(&self) -> Arc<Mutex<SessionState>> {
        self.state
            .lock()
            .session
            .as_ref()
            .map(Arc::clone)
            .expect("no capture session configured")
    }

    pub fn session_template(&self) -> Option<CaptureTemplate> {
        let session = self.state.lock().session.as_ref().map(Arc::clone)?;
        let template = session.lock().template;
        Some(template)
    }

    pub fn session_targets(&self) -> Vec<TargetHandle> {
        let session = self.current_session();
        let targets = session.lock().targets.clone();
        targets
    }

    // --- Repeating request ---

    pub fn repeating_request(&self) -> Option<CaptureRequest> {
        let session = self.state.lock().session.as_ref().map(Arc::clone)?;
        let request = session.lock().repeating.clone();
        request
    }

    pub fn repeating_active(&self) -> bool {
        let session = self.current_session();
        let active = session.lock().repeating_active;
        active
    }

    pub fn set_repeating_count(&self) -> usize {
        let session = self.current_session();
        let count = session.lock().set_repeating_count;
        count
    }

    pub fn stop_repeating_count(&self) -> usize {
        let session = self.current_session();
        let count = session.lock().stop_repeating_count;
        count
    }

    /// Deliver one repeating-request result to its listener.
    pub fn deliver_repeating_update(&self, update: CaptureUpdate) {
        let (listener, tag) = {
            let session = self.current_session();
            let state = session.lock();
            (
                state.repeating_listener.clone(),
                state.repeating.as_ref().and_then(|request| request.tag),
            )
        };
        if let Some(listener) = listener {
            listener(CaptureEvent::Completed { tag, update });
        }
    }

    // --- One-shot captures ---

    pub fn capture_count(&self) -> usize {
        let session = self.current_session();
        let count = session.lock().captures.len();
        count
    }

    pub fn capture_request(&self, index: usize) -> CaptureRequest {
        let session = self.current_session();
        let request = session.lock().captures[index].request.clone();
        request
    }

    pub fn last_capture_request(&self) -> CaptureRequest {
        let session = self.current_session();
        let request = session
            .lock()
            .captures
            .last()
            .expect("no capture submitted")
            .request
            .clone();
        request
    }

    /// Complete one-shot capture `index` with the given 3A result.
    pub fn complete_capture(&self, index: usize, update: CaptureUpdate) {
        let (listener, tag) = {
            let session = self.current_session();
            let mut state = session.lock();
            let slot = &mut state.captures[index];
            assert!(!slot.terminal, "capture {} already finished", index);
            slot.terminal = true;
            (slot.listener.clone(), slot.request.tag)
        };
        if let Some(listener) = listener {
            listener(CaptureEvent::Completed { tag, update });
        }
    }

    /// Fail one-shot capture `index` with a categorized reason.
    pub fn fail_capture(&self, index: usize, reason: CaptureFailureReason) {
        let listener = {
            let session = self.current_session();
            let mut state = session.lock();
            let slot = &mut state.captures[index];
            assert!(!slot.terminal, "capture {} already finished", index);
            slot.terminal = true;
            slot.listener.clone()
        };
        if let Some(listener) = listener {
            listener(CaptureEvent::Failed(reason));
        }
    }

    // --- Frame readers ---

    fn reader_for(&self, format: PixelFormat) -> Arc<Mutex<ReaderState>> {
        self.state
            .lock()
            .readers
            .iter()
            .rev()
            .find(|reader| {
                let reader = reader.lock();
                reader.format == format && !reader.closed
            })
            .map(Arc::clone)
            .unwrap_or_else(|| panic!("no open {:?} frame reader", format))
    }

    /// Enqueue a frame and fire the reader's frame-available callback.
    pub fn push_frame(&self, frame: FrameData) {
        let format = frame.format;
        self.push_frame_silent(frame);
        self.notify_frames(format);
    }

    /// Enqueue a frame without signalling; models arrivals coalesced behind
    /// a busy callback queue.
    pub fn push_frame_silent(&self, frame: FrameData) {
        let reader = self.reader_for(frame.format);
        reader.lock().push(frame);
    }

    /// Fire the frame-available callback of the reader for `format` once.
    pub fn notify_frames(&self, format: PixelFormat) {
        let listener = {
            let reader = self.reader_for(format);
            let listener = reader.lock().listener.clone();
            listener
        };
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Buffer size the reader for `format` was allocated with.
    pub fn reader_size(&self, format: PixelFormat) -> FrameSize {
        let reader = self.reader_for(format);
        let size = reader.lock().size;
        size
    }

    /// How many frames the reader for `format` has evicted or discarded.
    pub fn dropped_frames(&self, format: PixelFormat) -> u64 {
        let reader = self.reader_for(format);
        let dropped = reader.lock().dropped;
        dropped
    }

    pub fn reader_closed(&self, format: PixelFormat) -> bool {
        // Closed readers are invisible to `reader_for`; inspect directly.
        let readers: Vec<_> = self.state.lock().readers.iter().map(Arc::clone).collect();
        readers
            .iter()
            .rev()
            .find(|reader| reader.lock().format == format)
            .map(|reader| reader.lock().closed)
            .unwrap_or(false)
    }

    // --- Render target & encoder ---

    /// Buffer size last applied to the most recent render target.
    pub fn render_target_buffer_size(&self) -> Option<FrameSize> {
        let targets: Vec<_> = self
            .state
            .lock()
            .render_targets
            .iter()
            .map(Arc::clone)
            .collect();
        targets.last().and_then(|target| target.lock().buffer_size)
    }

    /// Snapshot of the most recently created encoder.
    pub fn encoder(&self) -> Option<EncoderSnapshot> {
        let encoder = self.state.lock().encoders.last().map(Arc::clone)?;
        let snapshot = encoder.lock().snapshot();
        Some(snapshot)
    }
}

impl CameraHal for VirtualCameraHal {
    fn open_device(&self, events: DeviceEventCallback) -> Result<Box<dyn CameraDevice>, CameraError> {
        let mut state = self.state.lock();
        if state.fail_open {
            state.fail_open = false;
            return Err(CameraError::DeviceFault(DeviceFault::InUse));
        }
        if state.device_open {
            return Err(CameraError::DeviceFault(DeviceFault::InUse));
        }
        state.device_open = true;
        state.device_events = Some(events);
        Ok(Box::new(VirtualDevice {
            state: Arc::clone(&self.state),
        }))
    }

    fn new_frame_reader(
        &self,
        size: FrameSize,
        format: PixelFormat,
        max_frames: usize,
    ) -> Result<Box<dyn FrameReader>, CameraError> {
        let mut state = self.state.lock();
        let target = state.allocate_target();
        let reader = Arc::new(Mutex::new(ReaderState {
            target,
            size,
            format,
            max_frames,
            queue: Default::default(),
            listener: None,
            dropped: 0,
            closed: false,
        }));
        state.readers.push(Arc::clone(&reader));
        Ok(Box::new(VirtualFrameReader { state: reader }))
    }

    fn new_video_encoder(&self) -> Result<Box<dyn VideoEncoder>, CameraError> {
        let mut state = self.state.lock();
        if state.fail_new_encoder {
            state.fail_new_encoder = false;
            return Err(CameraError::RecordingFailed(
                "virtual encoder allocation refused".into(),
            ));
        }
        let target = state.allocate_target();
        let encoder = Arc::new(Mutex::new(EncoderState {
            target: Some(target),
            fail_prepare: std::mem::take(&mut state.fail_encoder_prepare),
            fail_start: std::mem::take(&mut state.fail_encoder_start),
            fail_pause: std::mem::take(&mut state.fail_encoder_pause),
            fail_resume: std::mem::take(&mut state.fail_encoder_resume),
            fail_stop: std::mem::take(&mut state.fail_encoder_stop),
            ..Default::default()
        }));
        state.encoders.push(Arc::clone(&encoder));
        Ok(Box::new(VirtualEncoder { state: encoder }))
    }
}
