//! Manual focus/metering: a one-shot, user-triggered AF re-targeting
//! sequence, guarded against overlap by a single-flight flag and correlated
//! to its own hardware results by a unique sequence tag.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::controls::{metering, orientation};
use crate::models::camera_models::NormalizedPoint;
use crate::models::error::CameraError;
use crate::models::request::{AfTrigger, AutoFocusMode, ControlMode};
use crate::session::camera::{CameraController, FocusResponder, SharedCore};
use crate::traits::capture_session::{CaptureEvent, CaptureListener};

/// Resolve-once holder for the per-call focus result channel.
struct PendingFocus {
    responder: Mutex<Option<FocusResponder>>,
}

impl PendingFocus {
    fn new(responder: FocusResponder) -> Self {
        Self {
            responder: Mutex::new(Some(responder)),
        }
    }

    fn resolve(&self, result: Result<(), CameraError>) {
        if let Some(responder) = self.responder.lock().take() {
            responder(result);
        }
    }
}

impl CameraController {
    /// Re-target autofocus at a normalized UI-space point.
    ///
    /// A no-op success while a previous acquisition is still in flight
    /// (single-flight guard, not a queue). Otherwise cancels the current AF
    /// state, installs a clamped metering region when the device supports
    /// region AF, restarts AF with a correlation tag, and resolves the
    /// responder when the tagged result (or a failure) arrives.
    pub fn acquire_focus(&self, point: NormalizedPoint, radius: i32, responder: FocusResponder) {
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            if inner.focus_in_flight {
                deferred.push(move || responder(Ok(())));
                return;
            }
            if inner.session.is_none() || inner.repeating.is_none() {
                deferred.push(move || responder(Err(CameraError::NotOpen)));
                return;
            }

            let sensor_point =
                orientation::map_point_to_sensor(point, inner.capabilities.sensor_orientation);
            let (x, y) =
                metering::sensor_coordinates(sensor_point, inner.capabilities.active_array);

            inner.focus_seq += 1;
            let seq = inner.focus_seq;
            let epoch = inner.epoch;
            let pending = Arc::new(PendingFocus::new(responder));
            let listener = focus_listener(&core, epoch, seq, Arc::clone(&pending));

            let submit = (|| -> Result<(), CameraError> {
                if let Some(session) = inner.session.as_mut() {
                    session.stop_repeating()?;
                }

                // Cancel whatever AF state the preview was running.
                let cancel_shot = match inner.repeating.as_mut() {
                    Some(request) => {
                        request.af_trigger = Some(AfTrigger::Cancel);
                        request.af_mode = AutoFocusMode::Off;
                        request.clone()
                    }
                    None => return Err(CameraError::NotOpen),
                };
                if let Some(session) = inner.session.as_mut() {
                    session.capture(cancel_shot, Some(Arc::clone(&listener)))?;
                }

                // Re-arm AF at the touched region, tagged for correlation.
                let start_shot = match inner.repeating.as_mut() {
                    Some(request) => {
                        if inner.capabilities.supports_metering_af() {
                            request.af_regions = Some(vec![metering::focus_region(
                                x,
                                y,
                                radius,
                                inner.capabilities.active_array,
                            )]);
                        }
                        request.control_mode = ControlMode::Auto;
                        request.af_mode = AutoFocusMode::Auto;
                        request.af_trigger = Some(AfTrigger::Start);
                        let mut shot = request.clone();
                        shot.tag = Some(seq);
                        shot
                    }
                    None => return Err(CameraError::NotOpen),
                };
                if let Some(session) = inner.session.as_mut() {
                    session.capture(start_shot, Some(listener))?;
                }
                Ok(())
            })();

            match submit {
                Ok(()) => inner.focus_in_flight = true,
                Err(e) => {
                    log::error!("failed to start manual focus: {}", e);
                    let error = CameraError::FocusFailed(e.to_string());
                    deferred.push(move || pending.resolve(Err(error)));
                }
            }
        });
    }
}

/// Listener shared by the cancel and start shots. Only a completion carrying
/// the matching tag settles the sequence; the untagged cancel shot passes
/// through. Failures of either shot end the sequence.
fn focus_listener(
    core: &Arc<SharedCore>,
    epoch: u64,
    seq: u64,
    pending: Arc<PendingFocus>,
) -> CaptureListener {
    let weak = Arc::downgrade(core);
    Arc::new(move |event| {
        let Some(core) = weak.upgrade() else {
            return;
        };
        match event {
            CaptureEvent::Completed { tag, .. } => {
                if tag != Some(seq) {
                    return;
                }
                core.enter(|inner, deferred| {
                    if epoch != inner.epoch {
                        return;
                    }
                    inner.focus_in_flight = false;

                    // Focus settled: drop the trigger entirely and resume the
                    // repeating request, leaving the AF mode in place.
                    if let Some(request) = inner.repeating.as_mut() {
                        request.af_trigger = None;
                        let resumed = request.clone();
                        if let Some(session) = inner.session.as_mut() {
                            if let Err(e) = session.set_repeating(resumed, None) {
                                inner.defer_error(deferred, e);
                            }
                        }
                    }

                    let pending = Arc::clone(&pending);
                    deferred.push(move || pending.resolve(Ok(())));
                });
            }
            CaptureEvent::Failed(reason) => core.enter(|inner, deferred| {
                if epoch != inner.epoch {
                    return;
                }
                inner.focus_in_flight = false;
                let error = CameraError::FocusFailed(format!("manual autofocus failure: {}", reason));
                inner.defer_error(deferred, error.clone());
                let pending = Arc::clone(&pending);
                deferred.push(move || pending.resolve(Err(error)));
            }),
            CaptureEvent::Progressed(_) => {}
        }
    })
}
