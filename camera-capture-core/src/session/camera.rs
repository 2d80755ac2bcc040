//! The capture session manager.
//!
//! One `CameraInner` behind a single `parking_lot::Mutex` is the critical
//! section for all session state: the command context (caller-issued
//! operations) and the hardware callback context both enter through it.
//! Hardware callbacks hold a `Weak` reference and carry the session epoch
//! they were created under; a callback for a superseded epoch is discarded.
//! Delegate events, responder resolutions, and file I/O are deferred and run
//! after the lock is released, so sinks may re-enter the controller.

use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::controls::mode_policy;
use crate::controls::orientation;
use crate::models::camera_models::{FlashMode, FrameSize, PixelFormat, TargetHandle};
use crate::models::config::{CameraCapabilities, CameraConfiguration};
use crate::models::error::{CameraError, CaptureFailureReason};
use crate::models::request::{CaptureRequest, CaptureTemplate, ControlMode};
use crate::models::state::{LockState, RecordingState};
use crate::session::lock_sequence::LockSequence;
use crate::session::still::PendingCapture;
use crate::traits::camera_delegate::CameraDelegate;
use crate::traits::camera_device::{CameraDevice, SessionEvent, SessionStateCallback};
use crate::traits::camera_hal::{CameraHal, DeviceEvent, DeviceEventCallback};
use crate::traits::capture_session::{CaptureEvent, CaptureListener, CaptureSessionHandle};
use crate::traits::frame_reader::FrameReader;
use crate::traits::frame_sink::FrameSink;
use crate::traits::render_target::RenderTarget;
use crate::traits::video_encoder::VideoEncoder;

/// Per-call result channel for `take_picture`: resolves with the written
/// file path or a categorized error.
pub type PictureResponder = Box<dyn FnOnce(Result<PathBuf, CameraError>) + Send + 'static>;

/// Per-call result channel for `acquire_focus`.
pub type FocusResponder = Box<dyn FnOnce(Result<(), CameraError>) + Send + 'static>;

/// Reply to a successful `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenReply {
    /// The render target the preview is bound to.
    pub target: TargetHandle,
    /// The negotiated preview size.
    pub preview_size: FrameSize,
}

/// Work queued while the session lock is held, run after it is released.
#[derive(Default)]
pub(crate) struct Deferred {
    tasks: Vec<Box<dyn FnOnce() + Send>>,
}

impl Deferred {
    pub(crate) fn push(&mut self, task: impl FnOnce() + Send + 'static) {
        self.tasks.push(Box::new(task));
    }

    fn run(mut self) {
        for task in self.tasks.drain(..) {
            task();
        }
    }
}

/// Runs inside the session-configured callback, with the lock held; used to
/// start an encoder only once the session is live.
pub(crate) type SessionReady = Box<dyn FnOnce(&mut CameraInner, &mut Deferred) + Send + 'static>;

pub(crate) struct SharedCore {
    inner: Mutex<CameraInner>,
}

impl SharedCore {
    /// Enter the session critical section; deferred work runs after unlock.
    pub(crate) fn enter<R>(&self, f: impl FnOnce(&mut CameraInner, &mut Deferred) -> R) -> R {
        let mut deferred = Deferred::default();
        let out = {
            let mut inner = self.inner.lock();
            f(&mut inner, &mut deferred)
        };
        deferred.run();
        out
    }
}

pub(crate) struct CameraInner {
    pub(crate) hal: Arc<dyn CameraHal>,
    pub(crate) config: CameraConfiguration,
    pub(crate) capabilities: CameraCapabilities,
    pub(crate) delegate: Arc<dyn CameraDelegate>,
    pub(crate) render_target: Box<dyn RenderTarget>,

    pub(crate) device: Option<Box<dyn CameraDevice>>,
    pub(crate) session: Option<Box<dyn CaptureSessionHandle>>,
    pub(crate) still_reader: Option<Box<dyn FrameReader>>,
    pub(crate) stream_reader: Option<Box<dyn FrameReader>>,
    pub(crate) encoder: Option<Box<dyn VideoEncoder>>,

    /// The in-memory repeating request; policy and the convergence machines
    /// rewrite it, only this manager submits it.
    pub(crate) repeating: Option<CaptureRequest>,
    /// Session generation; bumped on every reconfigure and close.
    pub(crate) epoch: u64,

    pub(crate) flash: FlashMode,
    pub(crate) autofocus: bool,
    pub(crate) device_orientation: Option<i32>,

    pub(crate) lock: LockSequence,
    pub(crate) pending_capture: Option<Arc<PendingCapture>>,
    pub(crate) focus_in_flight: bool,
    pub(crate) focus_seq: u64,

    pub(crate) recording: RecordingState,
    pub(crate) recording_started: Option<Instant>,
    pub(crate) paused_total: Duration,
    pub(crate) pause_started: Option<Instant>,
    pub(crate) recording_path: Option<PathBuf>,

    pub(crate) frame_sink: Option<Arc<dyn FrameSink>>,
}

/// Coordinates one physical camera through its full operating lifecycle:
/// live preview, still capture with 3A convergence, video recording, and raw
/// frame streaming — one mode at a time over a single capture pipeline.
pub struct CameraController {
    pub(crate) core: Arc<SharedCore>,
}

impl CameraController {
    pub fn new(
        hal: Arc<dyn CameraHal>,
        config: CameraConfiguration,
        capabilities: CameraCapabilities,
        render_target: Box<dyn RenderTarget>,
        delegate: Arc<dyn CameraDelegate>,
    ) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::ConfigurationFailed)?;
        Ok(Self {
            core: Arc::new(SharedCore {
                inner: Mutex::new(CameraInner {
                    hal,
                    config,
                    capabilities,
                    delegate,
                    render_target,
                    device: None,
                    session: None,
                    still_reader: None,
                    stream_reader: None,
                    encoder: None,
                    repeating: None,
                    epoch: 0,
                    flash: FlashMode::Off,
                    autofocus: true,
                    device_orientation: None,
                    lock: LockSequence::new(),
                    pending_capture: None,
                    focus_in_flight: false,
                    focus_seq: 0,
                    recording: RecordingState::Idle,
                    recording_started: None,
                    paused_total: Duration::ZERO,
                    pause_started: None,
                    recording_path: None,
                    frame_sink: None,
                }),
            }),
        })
    }

    pub(crate) fn enter<R>(&self, f: impl FnOnce(&mut CameraInner, &mut Deferred) -> R) -> R {
        self.core.enter(f)
    }

    /// Acquire the device and immediately establish a preview session.
    pub fn open(&self) -> Result<OpenReply, CameraError> {
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            if inner.device.is_some() {
                return Err(CameraError::Access("camera is already open".into()));
            }

            inner.still_reader = Some(inner.hal.new_frame_reader(
                inner.config.capture_size,
                PixelFormat::Jpeg,
                2,
            )?);
            inner.stream_reader = Some(inner.hal.new_frame_reader(
                inner.config.preview_size,
                PixelFormat::Yuv420,
                2,
            )?);

            let weak = Arc::downgrade(&core);
            let events: DeviceEventCallback = Arc::new(move |event| {
                if let Some(core) = weak.upgrade() {
                    handle_device_event(&core, event);
                }
            });
            match inner.hal.open_device(events) {
                Ok(device) => inner.device = Some(device),
                Err(e) => {
                    inner.close_resources(deferred);
                    return Err(e);
                }
            }

            if let Err(e) = inner.start_preview_session(&core, deferred, None) {
                inner.close_resources(deferred);
                return Err(e);
            }

            Ok(OpenReply {
                target: inner.render_target.handle(),
                preview_size: inner.config.preview_size,
            })
        })
    }

    /// Re-establish a plain preview session.
    pub fn start_preview(&self) -> Result<(), CameraError> {
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| inner.start_preview_session(&core, deferred, None))
    }

    /// Tear down session, device, readers, and encoder, in that order.
    /// Idempotent; safe when never opened and from error paths.
    pub fn close(&self) {
        self.enter(|inner, deferred| inner.close_resources(deferred));
    }

    /// Apply a new flash setting and resubmit the repeating request.
    ///
    /// The staged setting is rolled back if resubmission fails, so the
    /// observable setting always matches what is active on hardware.
    pub fn set_flash(&self, flash: FlashMode) -> Result<(), CameraError> {
        self.enter(|inner, _deferred| {
            if inner.flash == flash {
                return Ok(());
            }
            let saved = inner.flash;
            inner.flash = flash;
            if let Some(request) = inner.repeating.as_mut() {
                mode_policy::apply_flash(request, flash);
                let submitted = request.clone();
                if let Some(session) = inner.session.as_mut() {
                    if let Err(e) = session.set_repeating(submitted, None) {
                        inner.flash = saved;
                        if let Some(request) = inner.repeating.as_mut() {
                            mode_policy::apply_flash(request, saved);
                        }
                        return Err(e);
                    }
                }
            }
            Ok(())
        })
    }

    /// Apply a new autofocus setting and resubmit the repeating request.
    ///
    /// A device without a usable AF mode silently downgrades an enabled
    /// setting; rollback on resubmission failure as for [`set_flash`].
    ///
    /// [`set_flash`]: CameraController::set_flash
    pub fn set_autofocus(&self, enabled: bool) -> Result<(), CameraError> {
        let core = Arc::clone(&self.core);
        self.enter(|inner, _deferred| {
            if inner.autofocus == enabled {
                return Ok(());
            }
            let saved = inner.autofocus;
            if let Some(request) = inner.repeating.as_mut() {
                let effective = mode_policy::apply_autofocus(request, enabled, &inner.capabilities);
                let submitted = request.clone();
                if let Some(session) = inner.session.as_mut() {
                    let listener = capture_listener(&core, inner.epoch);
                    if let Err(e) = session.set_repeating(submitted, Some(listener)) {
                        inner.autofocus = saved;
                        if let Some(request) = inner.repeating.as_mut() {
                            mode_policy::apply_autofocus(request, saved, &inner.capabilities);
                        }
                        return Err(e);
                    }
                }
                inner.autofocus = effective;
            } else {
                inner.autofocus = enabled;
            }
            Ok(())
        })
    }

    /// Feed a raw device orientation angle in; negative means unknown.
    pub fn update_orientation(&self, degrees: i32) {
        if degrees < 0 {
            return;
        }
        self.enter(|inner, _deferred| {
            inner.device_orientation = Some(orientation::round_to_cardinal(degrees));
        });
    }

    pub fn is_open(&self) -> bool {
        self.enter(|inner, _| inner.device.is_some())
    }

    pub fn flash(&self) -> FlashMode {
        self.enter(|inner, _| inner.flash)
    }

    pub fn autofocus_enabled(&self) -> bool {
        self.enter(|inner, _| inner.autofocus)
    }

    pub fn lock_state(&self) -> LockState {
        self.enter(|inner, _| inner.lock.state())
    }

    pub fn recording_state(&self) -> RecordingState {
        self.enter(|inner, _| inner.recording)
    }

    pub fn focus_in_progress(&self) -> bool {
        self.enter(|inner, _| inner.focus_in_flight)
    }
}

impl CameraInner {
    /// Close any existing session and build a new one for `template`.
    ///
    /// `extra_targets` are bound into the session; they join the repeating
    /// request only for non-preview templates. The repeating request is
    /// rebuilt against the current settings. `on_ready` runs once the
    /// session is live and repeating, before anything else can interleave.
    pub(crate) fn reconfigure(
        &mut self,
        core: &Arc<SharedCore>,
        deferred: &mut Deferred,
        template: CaptureTemplate,
        extra_targets: Vec<TargetHandle>,
        on_ready: Option<SessionReady>,
    ) -> Result<(), CameraError> {
        if self.device.is_none() {
            return Err(CameraError::NotOpen);
        }

        // A new session destructively invalidates any in-flight sequence.
        self.epoch += 1;
        self.abort_pending_capture(deferred);
        self.lock.reset();
        self.focus_in_flight = false;
        if let Some(mut session) = self.session.take() {
            session.close();
        }

        self.render_target.set_buffer_size(self.config.preview_size);

        let mut request = CaptureRequest::new(template);
        request.control_mode = ControlMode::Auto;
        request.targets.push(self.render_target.handle());
        if template != CaptureTemplate::Preview {
            request.targets.extend(extra_targets.iter().copied());
        }
        self.autofocus = mode_policy::apply_autofocus(&mut request, self.autofocus, &self.capabilities);
        mode_policy::apply_flash(&mut request, self.flash);
        self.repeating = Some(request);

        let mut session_targets = vec![self.render_target.handle()];
        session_targets.extend(extra_targets);

        let epoch = self.epoch;
        let weak = Arc::downgrade(core);
        let on_state: SessionStateCallback = Box::new(move |event| {
            if let Some(core) = weak.upgrade() {
                handle_session_event(&core, epoch, event, on_ready);
            }
        });

        log::debug!("configuring {:?} session (epoch {})", template, epoch);
        match self.device.as_mut() {
            Some(device) => device.create_session(template, session_targets, on_state),
            None => Err(CameraError::NotOpen),
        }
    }

    pub(crate) fn start_preview_session(
        &mut self,
        core: &Arc<SharedCore>,
        deferred: &mut Deferred,
        on_ready: Option<SessionReady>,
    ) -> Result<(), CameraError> {
        // The preview session binds the still reader's target so the final
        // high-resolution capture needs no reconfiguration.
        let still_target = self
            .still_reader
            .as_ref()
            .map(|reader| reader.target())
            .into_iter()
            .collect();
        self.reconfigure(core, deferred, CaptureTemplate::Preview, still_target, on_ready)
    }

    pub(crate) fn close_resources(&mut self, deferred: &mut Deferred) {
        self.epoch += 1;
        self.abort_pending_capture(deferred);

        if let Some(mut session) = self.session.take() {
            session.close();
        }
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        if let Some(mut reader) = self.still_reader.take() {
            reader.close();
        }
        if let Some(mut reader) = self.stream_reader.take() {
            reader.close();
        }
        if let Some(mut encoder) = self.encoder.take() {
            encoder.reset();
        }

        self.repeating = None;
        self.lock.reset();
        self.focus_in_flight = false;
        self.frame_sink = None;
        self.recording = RecordingState::Idle;
        self.recording_started = None;
        self.pause_started = None;
        self.paused_total = Duration::ZERO;
        self.recording_path = None;
    }

    /// Resolve a pending still capture as aborted, if one exists.
    fn abort_pending_capture(&mut self, deferred: &mut Deferred) {
        if let Some(pending) = self.pending_capture.take() {
            deferred.push(move || {
                pending.resolve(Err(CameraError::CaptureFailed(CaptureFailureReason::Aborted)));
            });
        }
    }

    /// Queue a categorized error for the event sink.
    pub(crate) fn defer_error(&self, deferred: &mut Deferred, error: CameraError) {
        let delegate = Arc::clone(&self.delegate);
        deferred.push(move || delegate.on_error(&error));
    }
}

/// Build a capture listener that routes events for `epoch` back into the
/// convergence machinery.
pub(crate) fn capture_listener(core: &Arc<SharedCore>, epoch: u64) -> CaptureListener {
    let weak: Weak<SharedCore> = Arc::downgrade(core);
    Arc::new(move |event| {
        if let Some(core) = weak.upgrade() {
            handle_capture_event(&core, epoch, event);
        }
    })
}

fn handle_capture_event(core: &Arc<SharedCore>, epoch: u64, event: CaptureEvent) {
    match event {
        CaptureEvent::Progressed(update) | CaptureEvent::Completed { update, .. } => {
            core.enter(|inner, deferred| inner.on_capture_update(core, epoch, &update, deferred));
        }
        CaptureEvent::Failed(reason) => {
            core.enter(|inner, deferred| inner.on_capture_failed(core, epoch, reason, deferred));
        }
    }
}

fn handle_session_event(
    core: &Arc<SharedCore>,
    epoch: u64,
    event: SessionEvent,
    on_ready: Option<SessionReady>,
) {
    core.enter(|inner, deferred| match event {
        SessionEvent::Configured(mut session) => {
            if epoch != inner.epoch {
                // Superseded before configuration finished.
                session.close();
                return;
            }
            if inner.device.is_none() {
                // Closed mid-configure; do not commit the torn-down session.
                session.close();
                inner.defer_error(
                    deferred,
                    CameraError::ConfigurationFailed("the camera was closed during configuration".into()),
                );
                return;
            }

            let request = match inner.repeating.clone() {
                Some(request) => request,
                None => return,
            };
            let listener = capture_listener(core, epoch);
            if let Err(e) = session.set_repeating(request, Some(listener)) {
                inner.defer_error(deferred, e);
                return;
            }
            inner.session = Some(session);
            if let Some(ready) = on_ready {
                ready(inner, deferred);
            }
        }
        SessionEvent::ConfigureFailed(reason) => {
            if epoch != inner.epoch {
                return;
            }
            inner.defer_error(deferred, CameraError::ConfigurationFailed(reason));
        }
    });
}

fn handle_device_event(core: &Arc<SharedCore>, event: DeviceEvent) {
    core.enter(|inner, deferred| match event {
        DeviceEvent::Disconnected => {
            log::warn!("camera disconnected; closing");
            inner.close_resources(deferred);
            inner.defer_error(deferred, CameraError::Disconnected);
        }
        DeviceEvent::Fault(fault) => {
            log::error!("camera device fault: {}", fault);
            inner.close_resources(deferred);
            inner.defer_error(deferred, CameraError::DeviceFault(fault));
        }
        DeviceEvent::Closed => {
            let delegate = Arc::clone(&inner.delegate);
            deferred.push(move || delegate.on_closing());
        }
    });
}
