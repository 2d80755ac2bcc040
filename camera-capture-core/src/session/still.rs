//! Still-photo capture orchestration: pre-flight checks, the AF/AE lock
//! sequence, the final high-resolution capture, and the unlock sequence that
//! always returns the pipeline to live preview.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::controls::{mode_policy, orientation};
use crate::models::error::{CameraError, CaptureFailureReason};
use crate::models::request::{AfTrigger, CaptureRequest, CaptureTemplate, CaptureUpdate, PrecaptureTrigger};
use crate::processing::frame_extractor;
use crate::session::camera::{
    capture_listener, CameraController, CameraInner, Deferred, PictureResponder, SharedCore,
};
use crate::session::lock_sequence::LockAction;
use crate::storage::image_writer;
use crate::traits::capture_session::{CaptureEvent, CaptureListener};
use crate::traits::frame_reader::FrameListener;

/// A still capture in flight: destination path plus a resolve-once result
/// channel. At most one exists at a time.
pub(crate) struct PendingCapture {
    pub(crate) path: PathBuf,
    responder: Mutex<Option<PictureResponder>>,
}

impl PendingCapture {
    fn new(path: PathBuf, responder: PictureResponder) -> Self {
        Self {
            path,
            responder: Mutex::new(Some(responder)),
        }
    }

    /// Resolve the result channel. Later calls are no-ops, so a late frame
    /// delivery cannot double-resolve after a failure already reported.
    pub(crate) fn resolve(&self, result: Result<PathBuf, CameraError>) {
        if let Some(responder) = self.responder.lock().take() {
            responder(result);
        }
    }

    fn is_resolved(&self) -> bool {
        self.responder.lock().is_none()
    }
}

impl CameraController {
    /// Capture a still photograph to `path`.
    ///
    /// Rejected before any hardware interaction when `path` already exists
    /// or another capture is pending. Otherwise runs the full lock sequence;
    /// the responder resolves with the written path once the image is on
    /// disk, or with a categorized error.
    pub fn take_picture(&self, path: impl Into<PathBuf>, responder: PictureResponder) {
        let path = path.into();
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            if let Err(e) = image_writer::destination_available(&path) {
                deferred.push(move || responder(Err(e)));
                return;
            }
            if inner.pending_capture.is_some() {
                deferred.push(move || responder(Err(CameraError::CaptureInProgress)));
                return;
            }
            if inner.session.is_none() || inner.repeating.is_none() {
                deferred.push(move || responder(Err(CameraError::NotOpen)));
                return;
            }

            let pending = Arc::new(PendingCapture::new(path, responder));
            inner.pending_capture = Some(Arc::clone(&pending));
            inner.lock_focus(&core, deferred);
        });
    }
}

impl CameraInner {
    /// Lock focus as the first step of a still capture: set the AF trigger
    /// and submit a one-shot so convergence results start flowing.
    fn lock_focus(&mut self, core: &Arc<SharedCore>, deferred: &mut Deferred) {
        let one_shot = match self.repeating.as_mut() {
            Some(request) => {
                request.af_trigger = Some(AfTrigger::Start);
                request.clone()
            }
            None => return,
        };

        self.lock.begin();
        let listener = capture_listener(core, self.epoch);
        let submit = match self.session.as_mut() {
            Some(session) => session.capture(one_shot, Some(listener)),
            None => Err(CameraError::NotOpen),
        };
        if let Err(e) = submit {
            log::error!("failed to lock focus: {}", e);
            self.resolve_pending(deferred, Err(e));
            self.unlock_focus(core);
        }
    }

    /// Route one 3A result through the lock sequence and act on it.
    pub(crate) fn on_capture_update(
        &mut self,
        core: &Arc<SharedCore>,
        epoch: u64,
        update: &CaptureUpdate,
        deferred: &mut Deferred,
    ) {
        if epoch != self.epoch {
            return;
        }
        match self.lock.process(update) {
            LockAction::None => {}
            LockAction::RunPrecapture => self.run_precapture(core),
            LockAction::RunCapture => self.capture_still(core, deferred),
        }
    }

    /// A capture failed on the shared listener. Inside a still-capture
    /// sequence that fails the pending request and recovers the preview;
    /// outside one it is only worth a log line.
    pub(crate) fn on_capture_failed(
        &mut self,
        core: &Arc<SharedCore>,
        epoch: u64,
        reason: CaptureFailureReason,
        deferred: &mut Deferred,
    ) {
        if epoch != self.epoch {
            return;
        }
        if self.lock.state().in_sequence() {
            self.resolve_pending(deferred, Err(CameraError::CaptureFailed(reason)));
            self.unlock_focus(core);
        } else {
            log::warn!("capture failed outside a still-capture sequence: {}", reason);
        }
    }

    /// Issue the auto-exposure precapture trigger.
    fn run_precapture(&mut self, core: &Arc<SharedCore>) {
        let one_shot = match self.repeating.as_mut() {
            Some(request) => {
                request.ae_precapture_trigger = Some(PrecaptureTrigger::Start);
                let one_shot = request.clone();
                request.ae_precapture_trigger = Some(PrecaptureTrigger::Idle);
                one_shot
            }
            None => return,
        };

        let listener = capture_listener(core, self.epoch);
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.capture(one_shot, Some(listener)) {
                log::error!("failed to run precapture sequence: {}", e);
            }
        }
    }

    /// Submit the final high-resolution capture against the still reader.
    fn capture_still(&mut self, core: &Arc<SharedCore>, deferred: &mut Deferred) {
        let pending = match self.pending_capture.as_ref() {
            Some(pending) => Arc::clone(pending),
            None => return,
        };
        let still_target = match self.still_reader.as_ref() {
            Some(reader) => reader.target(),
            None => return,
        };
        let repeating = match self.repeating.as_ref() {
            Some(request) => request,
            None => return,
        };

        let mut request = CaptureRequest::new(CaptureTemplate::StillCapture);
        request.targets.push(still_target);
        request.ae_mode = repeating.ae_mode;
        request.af_mode = repeating.af_mode;
        request.jpeg_orientation = Some(orientation::media_orientation(
            self.device_orientation,
            self.capabilities.sensor_orientation,
            self.capabilities.lens_facing,
        ));
        mode_policy::apply_flash(&mut request, self.flash);

        let epoch = self.epoch;
        let frame_listener = still_frame_listener(core, epoch, Arc::clone(&pending));
        if let Some(reader) = self.still_reader.as_mut() {
            reader.set_frame_listener(Some(frame_listener));
        }

        let listener = still_capture_listener(core, epoch, Arc::clone(&pending));
        let submit = match self.session.as_mut() {
            Some(session) => session
                .stop_repeating()
                .and_then(|_| session.capture(request, Some(listener))),
            None => Err(CameraError::NotOpen),
        };
        if let Err(e) = submit {
            self.resolve_pending(deferred, Err(e));
            self.unlock_focus(core);
        }
    }

    /// The unlock sequence, run after every still capture, success or
    /// failure: cancel the AF trigger, reapply mode policy, resume the
    /// repeating preview request, clear the pending slot. Submission errors
    /// here are logged, never escalated — the preview must recover.
    pub(crate) fn unlock_focus(&mut self, core: &Arc<SharedCore>) {
        let listener = capture_listener(core, self.epoch);

        if let Some(request) = self.repeating.as_mut() {
            request.af_trigger = Some(AfTrigger::Cancel);
            let cancel_shot = request.clone();
            if let Some(session) = self.session.as_mut() {
                if let Err(e) = session.capture(cancel_shot, Some(Arc::clone(&listener))) {
                    log::error!("failed to cancel autofocus trigger: {}", e);
                }
            }
        }

        if let Some(request) = self.repeating.as_mut() {
            self.autofocus = mode_policy::apply_autofocus(request, self.autofocus, &self.capabilities);
            mode_policy::apply_flash(request, self.flash);
            request.af_trigger = Some(AfTrigger::Idle);
            let resumed = request.clone();
            if let Some(session) = self.session.as_mut() {
                if let Err(e) = session.set_repeating(resumed, Some(listener)) {
                    log::error!("failed to restart camera preview: {}", e);
                }
            }
        }

        self.lock.reset();
        self.pending_capture = None;
    }

    fn resolve_pending(&mut self, deferred: &mut Deferred, result: Result<PathBuf, CameraError>) {
        if let Some(pending) = self.pending_capture.as_ref() {
            let pending = Arc::clone(pending);
            deferred.push(move || pending.resolve(result));
        }
    }
}

/// Listener for the final one-shot capture: completion runs the unlock
/// sequence, failure routes a categorized reason to the pending request and
/// still unlocks.
fn still_capture_listener(
    core: &Arc<SharedCore>,
    epoch: u64,
    pending: Arc<PendingCapture>,
) -> CaptureListener {
    let weak = Arc::downgrade(core);
    Arc::new(move |event| {
        let Some(core) = weak.upgrade() else {
            return;
        };
        match event {
            CaptureEvent::Completed { .. } => core.enter(|inner, _deferred| {
                if epoch == inner.epoch {
                    inner.unlock_focus(&core);
                }
            }),
            CaptureEvent::Failed(reason) => core.enter(|inner, deferred| {
                if epoch != inner.epoch {
                    return;
                }
                let pending = Arc::clone(&pending);
                deferred.push(move || {
                    pending.resolve(Err(CameraError::CaptureFailed(reason)));
                });
                inner.unlock_focus(&core);
            }),
            CaptureEvent::Progressed(_) => {}
        }
    })
}

/// Frame-available listener on the still reader: pull the image bytes under
/// the lock, write the file and resolve the responder outside it.
fn still_frame_listener(
    core: &Arc<SharedCore>,
    epoch: u64,
    pending: Arc<PendingCapture>,
) -> FrameListener {
    let weak = Arc::downgrade(core);
    Arc::new(move || {
        let Some(core) = weak.upgrade() else {
            return;
        };
        if pending.is_resolved() {
            return;
        }
        let bytes = core.enter(|inner, _deferred| {
            if epoch != inner.epoch {
                return None;
            }
            let reader = inner.still_reader.as_mut()?;
            let frame = reader.acquire_latest()?;
            let image = frame_extractor::extract_frame(frame.as_ref());
            // Hardware buffer released here when `frame` drops.
            image.planes.into_iter().next().map(|plane| plane.bytes)
        });
        let Some(bytes) = bytes else {
            return;
        };
        let result = image_writer::write_image(&pending.path, &bytes).map(|_| pending.path.clone());
        pending.resolve(result);
    })
}
