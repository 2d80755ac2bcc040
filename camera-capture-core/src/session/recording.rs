//! Video recording lifecycle: start/pause/resume/stop of an encoder
//! pipeline sharing the capture session with the live preview target.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::controls::orientation;
use crate::models::error::CameraError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::request::CaptureTemplate;
use crate::models::state::RecordingState;
use crate::session::camera::{CameraController, SessionReady};
use crate::storage::{image_writer, metadata};

impl CameraController {
    /// Start recording video to `path`.
    ///
    /// Rejected when `path` exists or a recording is already active. The
    /// encoder is prepared first, then the session is rebuilt with the
    /// record template and the encoder's input as an extra target; the
    /// encoder starts only once the session is live, so it never runs
    /// against an unconfigured session. The recording state flips to
    /// `Recording` only after the encoder start succeeds.
    pub fn start_video_recording(&self, path: impl Into<PathBuf>) -> Result<(), CameraError> {
        let path = path.into();
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            image_writer::destination_available(&path)?;
            if !inner.recording.is_idle() {
                return Err(CameraError::RecordingFailed(
                    "a recording is already active".into(),
                ));
            }
            if inner.device.is_none() {
                return Err(CameraError::NotOpen);
            }

            let mut encoder = inner.hal.new_video_encoder()?;
            let hint = orientation::media_orientation(
                inner.device_orientation,
                inner.capabilities.sensor_orientation,
                inner.capabilities.lens_facing,
            );
            encoder.prepare(
                &inner.config.recording_profile,
                &path,
                hint,
                inner.config.enable_audio,
            )?;
            let encoder_target = encoder.target();

            if let Some(mut previous) = inner.encoder.take() {
                previous.reset();
            }
            inner.encoder = Some(encoder);
            inner.recording_path = Some(path);

            let on_ready: SessionReady = Box::new(|inner, deferred| {
                let started = match inner.encoder.as_mut() {
                    Some(encoder) => encoder.start(),
                    None => return,
                };
                match started {
                    Ok(()) => {
                        inner.recording = RecordingState::Recording;
                        inner.recording_started = Some(Instant::now());
                        inner.paused_total = Duration::ZERO;
                        inner.pause_started = None;
                        log::debug!("video recording started");
                    }
                    Err(e) => {
                        inner.recording_path = None;
                        inner.defer_error(deferred, e);
                    }
                }
            });

            if let Err(e) = inner.reconfigure(
                &core,
                deferred,
                CaptureTemplate::Record,
                vec![encoder_target],
                Some(on_ready),
            ) {
                if let Some(mut encoder) = inner.encoder.take() {
                    encoder.reset();
                }
                inner.recording_path = None;
                return Err(CameraError::RecordingFailed(e.to_string()));
            }
            Ok(())
        })
    }

    /// Stop the active recording and return to plain preview.
    ///
    /// A success no-op returning `None` while idle. On success the result
    /// carries the finished file, its active duration (paused time
    /// excluded), and sidecar metadata.
    pub fn stop_video_recording(&self) -> Result<Option<RecordingResult>, CameraError> {
        let core = Arc::clone(&self.core);
        self.enter(|inner, deferred| {
            if inner.recording.is_idle() {
                return Ok(None);
            }

            // Settle pause accounting before reading the clock.
            if let Some(paused_at) = inner.pause_started.take() {
                inner.paused_total += paused_at.elapsed();
            }

            let stopped = match inner.encoder.as_mut() {
                Some(encoder) => encoder.stop(),
                None => Ok(()),
            };
            if let Some(encoder) = inner.encoder.as_mut() {
                encoder.reset();
            }
            inner.recording = RecordingState::Idle;

            let paused = std::mem::replace(&mut inner.paused_total, Duration::ZERO);
            let active = inner
                .recording_started
                .take()
                .map(|started| started.elapsed().checked_sub(paused).unwrap_or_default())
                .unwrap_or_default();
            let path = inner.recording_path.take().unwrap_or_default();

            if let Err(e) = stopped {
                // Nothing recoverable remains in the encoder; recover the
                // preview and surface the failure.
                if let Err(preview) = inner.start_preview_session(&core, deferred, None) {
                    log::error!("failed to restart preview after recording error: {}", preview);
                }
                return Err(e);
            }

            let duration_secs = active.as_secs_f64();
            let meta = RecordingMetadata::new(
                duration_secs,
                &path,
                &inner.config.recording_profile,
                inner.config.enable_audio,
            );
            if let Err(e) = metadata::write_metadata(&meta, &path) {
                log::warn!("failed to write recording metadata: {}", e);
            }

            inner
                .start_preview_session(&core, deferred, None)
                .map_err(|e| CameraError::RecordingFailed(e.to_string()))?;

            log::debug!("video recording stopped after {:.2}s", duration_secs);
            Ok(Some(RecordingResult {
                file_path: path,
                duration_secs,
                metadata: meta,
            }))
        })
    }

    /// Pause the active recording. A success no-op unless recording;
    /// rejected when the platform cannot pause.
    pub fn pause_video_recording(&self) -> Result<(), CameraError> {
        self.enter(|inner, _deferred| {
            if !inner.recording.is_recording() {
                return Ok(());
            }
            if !inner.capabilities.supports_pause_resume {
                return Err(CameraError::RecordingFailed(
                    "pausing a recording is not supported by this device".into(),
                ));
            }
            match inner.encoder.as_mut() {
                Some(encoder) => encoder.pause()?,
                None => return Ok(()),
            }
            inner.pause_started = Some(Instant::now());
            inner.recording = RecordingState::Paused;
            Ok(())
        })
    }

    /// Resume a paused recording. A success no-op unless paused.
    pub fn resume_video_recording(&self) -> Result<(), CameraError> {
        self.enter(|inner, _deferred| {
            if !inner.recording.is_paused() {
                return Ok(());
            }
            if !inner.capabilities.supports_pause_resume {
                return Err(CameraError::RecordingFailed(
                    "resuming a recording is not supported by this device".into(),
                ));
            }
            match inner.encoder.as_mut() {
                Some(encoder) => encoder.resume()?,
                None => return Ok(()),
            }
            if let Some(paused_at) = inner.pause_started.take() {
                inner.paused_total += paused_at.elapsed();
            }
            inner.recording = RecordingState::Recording;
            Ok(())
        })
    }
}
