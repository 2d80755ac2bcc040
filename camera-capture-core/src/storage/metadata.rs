use std::fs;
use std::path::Path;

use crate::models::error::CameraError;
use crate::models::recording_result::RecordingMetadata;

/// Write recording metadata as a JSON sidecar file.
///
/// Creates `{recording_path}.metadata.json` alongside the recording.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), CameraError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CameraError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json)
        .map_err(|e| CameraError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CameraError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| CameraError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: RecordingMetadata = serde_json::from_str(&json)
        .map_err(|e| CameraError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecordingProfile;
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("camera_capture_test_{}", name))
    }

    #[test]
    fn sidecar_round_trip() {
        let recording = temp_file_path("metadata_clip.mp4");
        let metadata = RecordingMetadata::new(
            12.5,
            &recording,
            &RecordingProfile::default(),
            true,
        );

        write_metadata(&metadata, &recording).unwrap();
        let loaded = read_metadata(&recording).unwrap();

        assert_eq!(loaded, metadata);
        assert!(loaded.has_audio);
        assert_eq!(loaded.frame_width, 1920);

        fs::remove_file(recording.with_extension("metadata.json")).ok();
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let recording = temp_file_path("metadata_absent.mp4");
        let err = read_metadata(&recording).unwrap_err();
        assert!(matches!(err, CameraError::StorageError(_)));
    }
}
