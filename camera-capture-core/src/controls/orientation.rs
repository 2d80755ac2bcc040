//! Orientation arithmetic: cardinal rounding of the device angle, mapping
//! UI-space touch points into sensor space, and the orientation hint baked
//! into captured media.

use crate::models::camera_models::{LensFacing, NormalizedPoint};

/// Round a raw orientation angle to the nearest multiple of 90 degrees,
/// normalized into `0..360`.
pub fn round_to_cardinal(degrees: i32) -> i32 {
    ((degrees as f64 / 90.0).round() as i32 * 90).rem_euclid(360)
}

/// Map a normalized UI-space point onto the sensor's coordinate frame for a
/// given sensor orientation.
pub fn map_point_to_sensor(point: NormalizedPoint, sensor_orientation: i32) -> NormalizedPoint {
    match sensor_orientation.rem_euclid(360) {
        90 => NormalizedPoint::new(point.y, 1.0 - point.x),
        180 => NormalizedPoint::new(1.0 - point.x, 1.0 - point.y),
        270 => NormalizedPoint::new(1.0 - point.y, point.x),
        _ => point,
    }
}

/// Clockwise orientation hint for captured media.
///
/// `device_orientation` is the rounded cardinal device angle, `None` while
/// unknown; front-facing lenses rotate against the device.
pub fn media_orientation(
    device_orientation: Option<i32>,
    sensor_orientation: i32,
    facing: LensFacing,
) -> i32 {
    let offset = match device_orientation {
        None => 0,
        Some(angle) if facing == LensFacing::Front => -angle,
        Some(angle) => angle,
    };
    (offset + sensor_orientation + 360).rem_euclid(360)
}
