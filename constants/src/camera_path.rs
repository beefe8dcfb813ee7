use bevy::math::Vec3;
use std::f32::consts::PI;

/// Progress values where camera segments start, followed by the final end (1.0).
/// Segment `i` covers `[SEGMENT_BOUNDARIES[i], SEGMENT_BOUNDARIES[i + 1])`.
pub const SEGMENT_BOUNDARIES: [f32; 5] = [0.0, 0.27, 0.5, 0.85, 1.0];

/// Camera position at progress 0, before the approach to the archive.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 40.0);

/// Fallback for the `archive` waypoint while the city model is not resolved.
pub const FALLBACK_ARCHIVE: Vec3 = Vec3::new(5.0, -36.0, 51.0);

/// Fallback for the `archive_about` waypoint.
pub const FALLBACK_ARCHIVE_ABOUT: Vec3 = Vec3::new(25.0, -36.0, 0.0);

/// Fallback for the `about` waypoint.
pub const FALLBACK_ABOUT: Vec3 = Vec3::new(56.0, -37.0, -43.0);

/// Fallback for the `connect` waypoint.
pub const FALLBACK_CONNECT: Vec3 = Vec3::new(96.0, -38.0, -117.0);

/// Yaw at progress 0.
pub const ROTATION_START: f32 = 0.0;

/// Yaw on arrival at the archive (40 degrees).
pub const ROTATION_ARCHIVE: f32 = PI * (40.0 / 180.0);

/// Yaw after the sharp turn towards the about section (22.5 + 90 degrees).
pub const ROTATION_TURN: f32 = PI / 8.0 + PI / 2.0;

/// Yaw on arrival at the connect section (-30 degrees).
pub const ROTATION_CONNECT: f32 = -PI / 6.0;
