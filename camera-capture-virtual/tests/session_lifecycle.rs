//! Open/close lifecycle, session reconfiguration, and the transactional
//! flash/autofocus setters, driven end-to-end through the virtual backend.

use std::sync::Arc;

use camera_capture_core::{
    AutoExposureMode, AutoFocusMode, CameraCapabilities, CameraConfiguration, CameraController,
    CameraDelegate, CameraError, CameraHal, CaptureTemplate, DeviceEvent, DeviceFault, FlashControl,
    FlashMode, FrameSize, PixelFormat,
};
use camera_capture_virtual::{EventRecorder, VirtualCameraHal};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_camera(
    hal: &Arc<VirtualCameraHal>,
    capabilities: CameraCapabilities,
) -> (CameraController, Arc<EventRecorder>) {
    init_logging();
    let delegate = Arc::new(EventRecorder::new());
    let target = hal.new_render_target();
    let camera = CameraController::new(
        Arc::clone(hal) as Arc<dyn CameraHal>,
        CameraConfiguration::default(),
        capabilities,
        Box::new(target),
        Arc::clone(&delegate) as Arc<dyn CameraDelegate>,
    )
    .unwrap();
    (camera, delegate)
}

fn open_camera(hal: &Arc<VirtualCameraHal>) -> (CameraController, Arc<EventRecorder>) {
    let (camera, delegate) = build_camera(hal, CameraCapabilities::default());
    camera.open().unwrap();
    hal.complete_session_configuration();
    (camera, delegate)
}

#[test]
fn open_establishes_preview_session() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = build_camera(&hal, CameraCapabilities::default());

    let reply = camera.open().unwrap();
    assert_eq!(reply.preview_size, FrameSize::new(1280, 720));

    // Both readers exist before the device opens: stills at capture size,
    // the stream at preview size.
    assert_eq!(hal.reader_size(PixelFormat::Jpeg), FrameSize::new(1920, 1080));
    assert_eq!(hal.reader_size(PixelFormat::Yuv420), FrameSize::new(1280, 720));
    assert_eq!(hal.render_target_buffer_size(), Some(FrameSize::new(1280, 720)));

    hal.complete_session_configuration();

    assert_eq!(hal.session_template(), Some(CaptureTemplate::Preview));
    // The preview session binds the still reader's target alongside the
    // render target, but the repeating request only draws to the preview.
    assert_eq!(hal.session_targets().len(), 2);
    let repeating = hal.repeating_request().unwrap();
    assert_eq!(repeating.targets.len(), 1);
    assert!(hal.repeating_active());

    // Default settings: flash off, autofocus on.
    assert_eq!(repeating.flash, FlashControl::Off);
    assert_eq!(repeating.ae_mode, AutoExposureMode::On);
    assert_eq!(repeating.af_mode, AutoFocusMode::ContinuousPicture);
    assert!(delegate.errors().is_empty());
}

#[test]
fn open_twice_is_rejected() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);

    let err = camera.open().unwrap_err();
    assert!(matches!(err, CameraError::Access(_)));
}

#[test]
fn failed_device_open_releases_readers() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = build_camera(&hal, CameraCapabilities::default());
    hal.fail_open();

    let err = camera.open().unwrap_err();
    assert_eq!(err, CameraError::DeviceFault(DeviceFault::InUse));
    assert!(!camera.is_open());
    assert!(hal.reader_closed(PixelFormat::Jpeg));
    assert!(hal.reader_closed(PixelFormat::Yuv420));
}

#[test]
fn session_configuration_failure_surfaces_on_event_sink() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = build_camera(&hal, CameraCapabilities::default());
    hal.fail_next_session_configuration();

    camera.open().unwrap();
    hal.complete_session_configuration();

    let errors = delegate.errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CameraError::ConfigurationFailed(_)));
}

#[test]
fn configuration_completing_after_close_is_discarded() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = build_camera(&hal, CameraCapabilities::default());

    camera.open().unwrap();
    camera.close();
    // The stale configuration result arrives after the device is gone.
    hal.complete_session_configuration();

    assert!(!camera.is_open());
    assert!(delegate.errors().is_empty());
}

#[test]
fn close_is_idempotent_and_safe_when_never_opened() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = build_camera(&hal, CameraCapabilities::default());

    camera.close();

    let (camera, _) = open_camera(&hal);
    camera.close();
    camera.close();

    assert!(!camera.is_open());
    assert_eq!(hal.device_close_count(), 1);
    assert!(hal.reader_closed(PixelFormat::Jpeg));
    assert!(delegate.errors().is_empty());
}

#[test]
fn disconnect_forces_close_and_reports() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = open_camera(&hal);

    hal.emit_device_event(DeviceEvent::Disconnected);

    assert!(!camera.is_open());
    assert_eq!(delegate.errors(), vec![CameraError::Disconnected]);
}

#[test]
fn device_fault_closes_with_categorized_error() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = open_camera(&hal);

    hal.emit_device_event(DeviceEvent::Fault(DeviceFault::Service));

    assert!(!camera.is_open());
    assert_eq!(
        delegate.errors(),
        vec![CameraError::DeviceFault(DeviceFault::Service)]
    );
}

#[test]
fn closed_event_reaches_the_delegate() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, delegate) = open_camera(&hal);

    camera.close();
    hal.emit_device_event(DeviceEvent::Closed);

    assert_eq!(delegate.closing_count(), 1);
}

#[test]
fn set_flash_rewrites_the_repeating_request() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);

    camera.set_flash(FlashMode::Torch).unwrap();

    let repeating = hal.repeating_request().unwrap();
    assert_eq!(repeating.flash, FlashControl::Torch);
    assert_eq!(repeating.ae_mode, AutoExposureMode::On);
    assert_eq!(camera.flash(), FlashMode::Torch);

    camera.set_flash(FlashMode::On).unwrap();
    let repeating = hal.repeating_request().unwrap();
    assert_eq!(repeating.flash, FlashControl::Single);
    assert_eq!(repeating.ae_mode, AutoExposureMode::OnAlwaysFlash);
}

#[test]
fn failed_flash_submission_rolls_the_setting_back() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);

    hal.fail_next_repeating_submission();
    let err = camera.set_flash(FlashMode::Auto).unwrap_err();
    assert!(matches!(err, CameraError::Access(_)));

    // Observable setting matches what is active on hardware.
    assert_eq!(camera.flash(), FlashMode::Off);
    let repeating = hal.repeating_request().unwrap();
    assert_eq!(repeating.flash, FlashControl::Off);
    assert_eq!(repeating.ae_mode, AutoExposureMode::On);
}

#[test]
fn set_autofocus_toggles_the_af_mode() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);

    camera.set_autofocus(false).unwrap();
    assert!(!camera.autofocus_enabled());
    assert_eq!(hal.repeating_request().unwrap().af_mode, AutoFocusMode::Off);

    camera.set_autofocus(true).unwrap();
    assert!(camera.autofocus_enabled());
    assert_eq!(
        hal.repeating_request().unwrap().af_mode,
        AutoFocusMode::ContinuousPicture
    );
}

#[test]
fn autofocus_downgrades_silently_without_usable_af() {
    let hal = Arc::new(VirtualCameraHal::new());
    let capabilities = CameraCapabilities {
        af_available_modes: vec![AutoFocusMode::Off],
        ..CameraCapabilities::default()
    };
    let (camera, delegate) = build_camera(&hal, capabilities);
    camera.open().unwrap();
    hal.complete_session_configuration();

    // The preview session already resolved the setting against capability.
    assert!(!camera.autofocus_enabled());
    assert_eq!(hal.repeating_request().unwrap().af_mode, AutoFocusMode::Off);

    // Asking again stays a success, still downgraded, no error event.
    camera.set_autofocus(true).unwrap();
    assert!(!camera.autofocus_enabled());
    assert_eq!(hal.repeating_request().unwrap().af_mode, AutoFocusMode::Off);
    assert!(delegate.errors().is_empty());
}

#[test]
fn failed_autofocus_submission_rolls_back() {
    let hal = Arc::new(VirtualCameraHal::new());
    let (camera, _delegate) = open_camera(&hal);

    hal.fail_next_repeating_submission();
    let err = camera.set_autofocus(false).unwrap_err();
    assert!(matches!(err, CameraError::Access(_)));

    assert!(camera.autofocus_enabled());
    assert_eq!(
        hal.repeating_request().unwrap().af_mode,
        AutoFocusMode::ContinuousPicture
    );
}
