//! The still-capture lock sequence end-to-end: direct capture, the
//! precapture detour, failure paths, and the unlock sequence that always
//! brings the preview back.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::{
    AfTrigger, AutoExposureStatus, AutoFocusStatus, CameraCapabilities, CameraConfiguration,
    CameraController, CameraDelegate, CameraError, CameraHal, CaptureFailureReason, CaptureTemplate,
    CaptureUpdate, LockState, PictureResponder,
};
use camera_capture_virtual::{EventRecorder, FrameData, VirtualCameraHal};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn open_camera(hal: &Arc<VirtualCameraHal>) -> (CameraController, Arc<EventRecorder>) {
    init_logging();
    let delegate = Arc::new(EventRecorder::new());
    let target = hal.new_render_target();
    let camera = CameraController::new(
        Arc::clone(hal) as Arc<dyn CameraHal>,
        CameraConfiguration::default(),
        CameraCapabilities::default(),
        Box::new(target),
        Arc::clone(&delegate) as Arc<dyn CameraDelegate>,
    )
    .unwrap();
    camera.open().unwrap();
    hal.complete_session_configuration();
    (camera, delegate)
}

type CaptureOutcome = Arc<Mutex<Option<Result<PathBuf, CameraError>>>>;

fn capture_responder() -> (CaptureOutcome, PictureResponder) {
    let outcome: CaptureOutcome = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&outcome);
    (outcome, Box::new(move |result| *slot.lock() = Some(result)))
}

fn temp_file_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("camera_capture_test_{}", name))
}

fn update(af: Option<AutoFocusStatus>, ae: Option<AutoExposureStatus>) -> CaptureUpdate {
    CaptureUpdate::new(af, ae)
}

#[test]
fn converged_device_captures_without_precapture() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = open_camera(&hal);
    let path = temp_file_path("still_direct.jpg");
    fs::remove_file(&path).ok();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);

    // The AF trigger one-shot is in flight, lens still working.
    assert_eq!(camera.lock_state(), LockState::WaitingLock);
    assert_eq!(
        hal.capture_request(0).af_trigger,
        Some(AfTrigger::Start)
    );
    hal.complete_capture(0, update(Some(AutoFocusStatus::ActiveScan), None));
    assert_eq!(camera.lock_state(), LockState::WaitingLock);

    // Lens locked, exposure converged: straight to the final capture.
    hal.deliver_repeating_update(update(
        Some(AutoFocusStatus::FocusedLocked),
        Some(AutoExposureStatus::Converged),
    ));
    assert_eq!(camera.lock_state(), LockState::Captured);
    assert_eq!(hal.stop_repeating_count(), 1);

    let still = hal.last_capture_request();
    assert_eq!(still.template, CaptureTemplate::StillCapture);
    assert!(still.jpeg_orientation.is_some());

    // The image lands and the file is written.
    hal.push_frame(FrameData::jpeg(1920, 1080, vec![0xFF, 0xD8, 0xAB, 0xFF, 0xD9]));
    assert_eq!(outcome.lock().clone(), Some(Ok(path.clone())));
    assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xAB, 0xFF, 0xD9]);

    // Completion runs the unlock sequence: cancel shot, preview resumed.
    let final_index = hal.capture_count() - 1;
    hal.complete_capture(final_index, update(None, None));
    assert_eq!(camera.lock_state(), LockState::Preview);
    assert_eq!(
        hal.last_capture_request().af_trigger,
        Some(AfTrigger::Cancel)
    );
    let repeating = hal.repeating_request().unwrap();
    assert_eq!(repeating.af_trigger, Some(AfTrigger::Idle));
    assert!(hal.repeating_active());
    assert!(delegate.errors().is_empty());

    fs::remove_file(&path).ok();
}

#[test]
fn flash_device_walks_the_precapture_states() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_precapture.jpg");
    fs::remove_file(&path).ok();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);
    assert_eq!(camera.lock_state(), LockState::WaitingLock);

    // Locked but the exposure wants a precapture pass.
    hal.complete_capture(0, update(
        Some(AutoFocusStatus::FocusedLocked),
        Some(AutoExposureStatus::FlashRequired),
    ));
    assert_eq!(camera.lock_state(), LockState::WaitingPrecapture);
    // The precapture one-shot carries the start trigger.
    let precapture = hal.capture_request(1);
    assert!(precapture.ae_precapture_trigger.is_some());

    hal.complete_capture(1, update(None, Some(AutoExposureStatus::Precapture)));
    assert_eq!(camera.lock_state(), LockState::WaitingPrecaptureDone);

    // No file yet: the write happens only after the final capture.
    assert!(!path.exists());

    hal.deliver_repeating_update(update(None, Some(AutoExposureStatus::Converged)));
    assert_eq!(camera.lock_state(), LockState::Captured);

    hal.push_frame(FrameData::jpeg(1920, 1080, vec![1, 2, 3]));
    assert_eq!(outcome.lock().clone(), Some(Ok(path.clone())));
    assert!(path.exists());

    fs::remove_file(&path).ok();
}

#[test]
fn existing_destination_never_touches_hardware() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_collision.jpg");
    fs::write(&path, b"already here").unwrap();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);

    assert!(matches!(
        outcome.lock().clone(),
        Some(Err(CameraError::DestinationExists(_)))
    ));
    assert_eq!(camera.lock_state(), LockState::Preview);
    assert_eq!(hal.capture_count(), 0);
    assert_eq!(fs::read(&path).unwrap(), b"already here");

    fs::remove_file(&path).ok();
}

#[test]
fn second_capture_while_pending_is_rejected() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let first = temp_file_path("still_pending_a.jpg");
    let second = temp_file_path("still_pending_b.jpg");
    fs::remove_file(&first).ok();
    fs::remove_file(&second).ok();

    let (_first_outcome, responder) = capture_responder();
    camera.take_picture(&first, responder);

    let (second_outcome, responder) = capture_responder();
    camera.take_picture(&second, responder);
    assert_eq!(
        second_outcome.lock().clone(),
        Some(Err(CameraError::CaptureInProgress))
    );
    // Only the first sequence's trigger shot exists.
    assert_eq!(hal.capture_count(), 1);
}

#[test]
fn capture_failure_reports_reason_and_recovers_preview() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_failed.jpg");
    fs::remove_file(&path).ok();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);

    hal.complete_capture(0, update(Some(AutoFocusStatus::FocusedLocked), None));
    assert_eq!(camera.lock_state(), LockState::Captured);

    // The final high-resolution capture dies in the driver.
    let final_index = hal.capture_count() - 1;
    hal.fail_capture(final_index, CaptureFailureReason::Driver);

    assert_eq!(
        outcome.lock().clone(),
        Some(Err(CameraError::CaptureFailed(CaptureFailureReason::Driver)))
    );
    // The unlock sequence still ran: preview state and repeating restored.
    assert_eq!(camera.lock_state(), LockState::Preview);
    assert!(hal.repeating_active());
    assert!(!path.exists());

    // And a new capture can start cleanly.
    let (_outcome2, responder) = capture_responder();
    camera.take_picture(&path, responder);
    assert_eq!(camera.lock_state(), LockState::WaitingLock);
}

#[test]
fn preview_resumes_exactly_once_per_sequence() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_resume_once.jpg");
    fs::remove_file(&path).ok();

    let baseline = hal.set_repeating_count();

    let (_outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);
    hal.complete_capture(0, update(Some(AutoFocusStatus::FocusedLocked), None));
    hal.push_frame(FrameData::jpeg(1920, 1080, vec![9]));
    let final_index = hal.capture_count() - 1;
    hal.complete_capture(final_index, update(None, None));

    assert_eq!(camera.lock_state(), LockState::Preview);
    assert_eq!(hal.set_repeating_count(), baseline + 1);

    fs::remove_file(&path).ok();
}

#[test]
fn results_from_a_superseded_sequence_are_discarded() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_stale.jpg");
    fs::remove_file(&path).ok();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);
    let trigger_index = hal.capture_count() - 1;

    // A recording start replaces the session mid-sequence.
    let video = temp_file_path("still_stale.mp4");
    fs::remove_file(&video).ok();
    camera.start_video_recording(&video).unwrap();

    // The replaced sequence resolved as aborted...
    assert_eq!(
        outcome.lock().clone(),
        Some(Err(CameraError::CaptureFailed(CaptureFailureReason::Aborted)))
    );
    assert_eq!(camera.lock_state(), LockState::Preview);

    // ...and its late convergence result is recognized as stale: no final
    // capture is submitted against the new session.
    hal.complete_capture(trigger_index, update(Some(AutoFocusStatus::FocusedLocked), None));
    assert_eq!(camera.lock_state(), LockState::Preview);

    fs::remove_file(video.with_extension("metadata.json")).ok();
}

#[test]
fn unwritable_destination_surfaces_a_storage_error() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("no_such_dir").join("still.jpg");

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);
    hal.complete_capture(0, update(Some(AutoFocusStatus::FocusedLocked), None));
    hal.push_frame(FrameData::jpeg(1920, 1080, vec![7]));

    assert!(matches!(
        outcome.lock().clone(),
        Some(Err(CameraError::StorageError(_)))
    ));
}

#[test]
fn refused_trigger_submission_fails_fast_and_recovers() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_refused.jpg");
    fs::remove_file(&path).ok();

    hal.fail_next_capture_submission();
    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);

    assert!(matches!(
        outcome.lock().clone(),
        Some(Err(CameraError::Access(_)))
    ));
    // The unlock sequence ran; a fresh capture is possible.
    assert_eq!(camera.lock_state(), LockState::Preview);
    let (_outcome2, responder) = capture_responder();
    camera.take_picture(&path, responder);
    assert_eq!(camera.lock_state(), LockState::WaitingLock);
}

#[test]
fn close_aborts_a_pending_capture() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);
    let path = temp_file_path("still_closed.jpg");
    fs::remove_file(&path).ok();

    let (outcome, responder) = capture_responder();
    camera.take_picture(&path, responder);
    camera.close();

    assert_eq!(
        outcome.lock().clone(),
        Some(Err(CameraError::CaptureFailed(CaptureFailureReason::Aborted)))
    );
}
