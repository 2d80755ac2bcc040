//! Converts a hardware-delivered frame into a transport-ready structure.
//!
//! Stateless, invoked once per frame. Copies every plane so the hardware
//! buffer can be released immediately after extraction.

use crate::models::camera_models::{FrameImage, FramePlane};
use crate::traits::frame_reader::HardwareFrame;

/// Extract dimensions, format, and all planes from `frame`.
pub fn extract_frame(frame: &dyn HardwareFrame) -> FrameImage {
    let planes = (0..frame.plane_count())
        .map(|index| {
            let plane = frame.plane(index);
            FramePlane {
                bytes_per_row: plane.bytes_per_row,
                bytes_per_pixel: plane.bytes_per_pixel,
                bytes: plane.bytes.to_vec(),
            }
        })
        .collect();

    FrameImage {
        width: frame.width(),
        height: frame.height(),
        format: frame.format(),
        planes,
    }
}
