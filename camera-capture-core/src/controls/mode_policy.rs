//! Pure mapping from user-facing settings to capture request parameters.
//!
//! Applying a policy only rewrites a [`CaptureRequest`] in memory; the
//! session manager is responsible for resubmitting it to hardware.

use crate::models::camera_models::FlashMode;
use crate::models::config::CameraCapabilities;
use crate::models::request::{AutoExposureMode, AutoFocusMode, CaptureRequest, FlashControl};

/// Concrete exposure/flash parameters for one flash setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashPolicy {
    pub ae_mode: AutoExposureMode,
    pub flash: FlashControl,
}

/// Resolve a flash setting to auto-exposure mode and flash control.
pub fn flash_policy(mode: FlashMode) -> FlashPolicy {
    match mode {
        FlashMode::Off => FlashPolicy {
            ae_mode: AutoExposureMode::On,
            flash: FlashControl::Off,
        },
        FlashMode::On => FlashPolicy {
            ae_mode: AutoExposureMode::OnAlwaysFlash,
            flash: FlashControl::Single,
        },
        FlashMode::Torch => FlashPolicy {
            ae_mode: AutoExposureMode::On,
            flash: FlashControl::Torch,
        },
        FlashMode::Auto => FlashPolicy {
            ae_mode: AutoExposureMode::OnAutoFlash,
            flash: FlashControl::Off,
        },
    }
}

/// Resolve the autofocus setting against device capability.
///
/// Returns the AF mode to request and the effective setting. A device with
/// no usable AF mode silently downgrades an enabled setting to disabled;
/// this is an automatic downgrade, not an error.
pub fn autofocus_policy(enabled: bool, capabilities: &CameraCapabilities) -> (AutoFocusMode, bool) {
    if enabled && capabilities.has_usable_autofocus() {
        (AutoFocusMode::ContinuousPicture, true)
    } else {
        (AutoFocusMode::Off, false)
    }
}

/// Rewrite the flash-related fields of `request` for `mode`.
pub fn apply_flash(request: &mut CaptureRequest, mode: FlashMode) {
    let policy = flash_policy(mode);
    request.ae_mode = policy.ae_mode;
    request.flash = policy.flash;
}

/// Rewrite the AF mode of `request` for the `enabled` setting, returning the
/// effective setting after any capability downgrade.
pub fn apply_autofocus(
    request: &mut CaptureRequest,
    enabled: bool,
    capabilities: &CameraCapabilities,
) -> bool {
    let (mode, effective) = autofocus_policy(enabled, capabilities);
    request.af_mode = mode;
    effective
}
