use super::camera_models::TargetHandle;

/// Named intent a capture session (and its requests) is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTemplate {
    Preview,
    StillCapture,
    Record,
}

/// 3A control mode applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Off,
    Auto,
}

/// Autofocus mode requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFocusMode {
    Off,
    Auto,
    Macro,
    ContinuousVideo,
    ContinuousPicture,
    Edof,
}

/// Auto-exposure mode requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoExposureMode {
    Off,
    On,
    OnAutoFlash,
    OnAlwaysFlash,
}

/// How the flash unit is driven for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashControl {
    Off,
    Single,
    Torch,
}

/// One-shot autofocus trigger carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfTrigger {
    Idle,
    Start,
    Cancel,
}

/// One-shot auto-exposure precapture trigger carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecaptureTrigger {
    Idle,
    Start,
}

/// Maximum metering weight for a focus/metering region.
pub const METERING_WEIGHT_MAX: i32 = 1000;

/// A weighted metering region in sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteringRectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub weight: i32,
}

/// The full parameter set submitted to the device for one capture, and the
/// shape of the continuously resubmitted repeating request.
///
/// This is a plain value: policy and the convergence machines rewrite it in
/// memory, and only the session manager submits it to hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub template: CaptureTemplate,
    /// Targets this request renders into. A session may bind more targets
    /// than any single request addresses.
    pub targets: Vec<TargetHandle>,
    pub control_mode: ControlMode,
    pub af_mode: AutoFocusMode,
    pub ae_mode: AutoExposureMode,
    pub flash: FlashControl,
    pub af_trigger: Option<AfTrigger>,
    pub ae_precapture_trigger: Option<PrecaptureTrigger>,
    pub af_regions: Option<Vec<MeteringRectangle>>,
    /// Orientation hint baked into JPEG output, degrees clockwise.
    pub jpeg_orientation: Option<i32>,
    /// Correlation tag echoed back in capture events for this request.
    pub tag: Option<u64>,
}

impl CaptureRequest {
    pub fn new(template: CaptureTemplate) -> Self {
        Self {
            template,
            targets: Vec::new(),
            control_mode: ControlMode::Auto,
            af_mode: AutoFocusMode::Off,
            ae_mode: AutoExposureMode::On,
            flash: FlashControl::Off,
            af_trigger: None,
            ae_precapture_trigger: None,
            af_regions: None,
            jpeg_orientation: None,
            tag: None,
        }
    }
}

/// Autofocus convergence state reported in a capture result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFocusStatus {
    Inactive,
    PassiveScan,
    PassiveFocused,
    PassiveUnfocused,
    ActiveScan,
    FocusedLocked,
    NotFocusedLocked,
}

/// Auto-exposure convergence state reported in a capture result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoExposureStatus {
    Inactive,
    Searching,
    Converged,
    Locked,
    FlashRequired,
    Precapture,
}

/// The 3A fields of one hardware capture result.
///
/// Either field may be absent when the device did not report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureUpdate {
    pub af: Option<AutoFocusStatus>,
    pub ae: Option<AutoExposureStatus>,
}

impl CaptureUpdate {
    pub fn new(af: Option<AutoFocusStatus>, ae: Option<AutoExposureStatus>) -> Self {
        Self { af, ae }
    }
}
