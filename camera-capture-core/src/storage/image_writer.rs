use std::fs;
use std::path::Path;

use crate::models::error::CameraError;

/// Pre-flight check that `path` is free. Capturing to an existing file is a
/// caller error, rejected before any hardware interaction.
pub fn destination_available(path: &Path) -> Result<(), CameraError> {
    if path.exists() {
        return Err(CameraError::DestinationExists(
            path.to_string_lossy().into_owned(),
        ));
    }
    Ok(())
}

/// Write captured image bytes to `path`.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<(), CameraError> {
    fs::write(path, bytes)
        .map_err(|e| CameraError::StorageError(format!("failed to save image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("camera_capture_test_{}", name))
    }

    #[test]
    fn free_destination_is_accepted() {
        let path = temp_file_path("image_writer_free.jpg");
        fs::remove_file(&path).ok();
        assert!(destination_available(&path).is_ok());
    }

    #[test]
    fn existing_destination_is_rejected() {
        let path = temp_file_path("image_writer_taken.jpg");
        fs::write(&path, b"taken").unwrap();

        let err = destination_available(&path).unwrap_err();
        assert!(matches!(err, CameraError::DestinationExists(_)));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn writes_bytes_to_destination() {
        let path = temp_file_path("image_writer_out.jpg");
        fs::remove_file(&path).ok();

        write_image(&path, &[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn unwritable_destination_is_a_storage_error() {
        let path = temp_file_path("no_such_dir").join("image.jpg");
        let err = write_image(&path, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CameraError::StorageError(_)));
    }
}
