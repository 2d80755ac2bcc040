//! Focus metering geometry: converting a sensor-space point into a weighted
//! metering rectangle clamped to the active pixel array.

use crate::models::camera_models::{NormalizedPoint, SensorRect};
use crate::models::request::{MeteringRectangle, METERING_WEIGHT_MAX};

/// Convert a normalized sensor-space point into pixel coordinates on the
/// active array.
pub fn sensor_coordinates(point: NormalizedPoint, active_array: SensorRect) -> (i32, i32) {
    let x = active_array.x + (point.x * active_array.width as f32) as i32;
    let y = active_array.y + (point.y * active_array.height as f32) as i32;
    (x, y)
}

/// Build the metering rectangle for a touch at `(center_x, center_y)` with
/// the given radius, clamped to the active array bounds.
pub fn focus_region(
    center_x: i32,
    center_y: i32,
    radius: i32,
    active_array: SensorRect,
) -> MeteringRectangle {
    let left = (center_x - radius).clamp(active_array.x, active_array.right());
    let top = (center_y - radius).clamp(active_array.y, active_array.bottom());
    let right = (center_x + radius).clamp(active_array.x, active_array.right());
    let bottom = (center_y + radius).clamp(active_array.y, active_array.bottom());
    MeteringRectangle {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
        weight: METERING_WEIGHT_MAX,
    }
}
