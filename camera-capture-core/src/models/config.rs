use super::camera_models::{FrameSize, LensFacing, SensorRect};
use super::request::AutoFocusMode;

/// Encoding profile for video recording, negotiated externally for a quality
/// tier and consumed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingProfile {
    pub frame_size: FrameSize,
    pub video_bit_rate: u32,
    pub video_frame_rate: u32,
    pub audio_bit_rate: u32,
    pub audio_sample_rate: u32,
}

impl Default for RecordingProfile {
    fn default() -> Self {
        Self {
            frame_size: FrameSize::new(1920, 1080),
            video_bit_rate: 8_000_000,
            video_frame_rate: 30,
            audio_bit_rate: 128_000,
            audio_sample_rate: 44_100,
        }
    }
}

/// Configuration for a camera session.
///
/// Preview and capture sizes come from the external resolution provider;
/// the recording profile from the external profile provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConfiguration {
    /// Size of the live preview buffers (render target and frame stream).
    pub preview_size: FrameSize,

    /// Size of still-capture output.
    pub capture_size: FrameSize,

    /// Encoding profile used for video recording.
    pub recording_profile: RecordingProfile,

    /// Record an audio track alongside video.
    pub enable_audio: bool,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.preview_size.width == 0 || self.preview_size.height == 0 {
            return Err("preview size must be non-zero".into());
        }
        if self.capture_size.width == 0 || self.capture_size.height == 0 {
            return Err("capture size must be non-zero".into());
        }
        if self.recording_profile.video_bit_rate == 0 {
            return Err("video bit rate must be positive".into());
        }
        if self.recording_profile.video_frame_rate == 0 {
            return Err("video frame rate must be positive".into());
        }
        Ok(())
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            preview_size: FrameSize::new(1280, 720),
            capture_size: FrameSize::new(1920, 1080),
            recording_profile: RecordingProfile::default(),
            enable_audio: true,
        }
    }
}

/// Device-reported capability table, queried once at construction and
/// consumed read-only by policy and the focus controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraCapabilities {
    /// Clockwise angle of the sensor relative to the device's natural
    /// orientation: 0, 90, 180 or 270.
    pub sensor_orientation: i32,

    pub lens_facing: LensFacing,

    /// Bounds of the active pixel array in sensor coordinates.
    pub active_array: SensorRect,

    /// Autofocus modes the device reports.
    pub af_available_modes: Vec<AutoFocusMode>,

    /// Maximum number of autofocus metering regions, 0 when unsupported.
    pub max_af_regions: u32,

    /// Whether the encoder pipeline supports pausing and resuming.
    pub supports_pause_resume: bool,
}

impl CameraCapabilities {
    /// Whether region-based autofocus metering can be used.
    pub fn supports_metering_af(&self) -> bool {
        self.max_af_regions >= 1
    }

    /// Whether the device has any real autofocus mode. A device that reports
    /// no modes, or only `Off`, cannot focus.
    pub fn has_usable_autofocus(&self) -> bool {
        match self.af_available_modes.as_slice() {
            [] => false,
            [AutoFocusMode::Off] => false,
            _ => true,
        }
    }
}

impl Default for CameraCapabilities {
    fn default() -> Self {
        Self {
            sensor_orientation: 90,
            lens_facing: LensFacing::Back,
            active_array: SensorRect::new(0, 0, 4032, 3024),
            af_available_modes: vec![
                AutoFocusMode::Auto,
                AutoFocusMode::ContinuousPicture,
                AutoFocusMode::ContinuousVideo,
            ],
            max_af_regions: 1,
            supports_pause_resume: true,
        }
    }
}
