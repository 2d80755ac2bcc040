use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::RecordingProfile;

/// Result returned when a video recording stops successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a finished recording.
///
/// Serializable for JSON sidecar export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub duration_secs: f64,
    pub file_path: String,
    pub created_at: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub video_bit_rate: u32,
    pub video_frame_rate: u32,
    pub has_audio: bool,
}

impl RecordingMetadata {
    pub fn new(
        duration_secs: f64,
        file_path: &Path,
        profile: &RecordingProfile,
        has_audio: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            duration_secs,
            file_path: file_path.to_string_lossy().into_owned(),
            created_at: chrono::Utc::now().to_rfc3339(),
            frame_width: profile.frame_size.width,
            frame_height: profile.frame_size.height,
            video_bit_rate: profile.video_bit_rate,
            video_frame_rate: profile.video_frame_rate,
            has_audio,
        }
    }
}
