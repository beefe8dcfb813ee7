use bevy::prelude::*;
use constants::camera_path::{
    CAMERA_START, ROTATION_ARCHIVE, ROTATION_CONNECT, ROTATION_START, ROTATION_TURN,
    SEGMENT_BOUNDARIES,
};

use super::waypoints::{ResolvedWaypoints, Waypoint};

/// Easing applied to a segment's normalised progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseOutCubic,
}

impl Curve {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Curve::Linear => t,
            Curve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Segment endpoint: a fixed coordinate or a named waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathPoint {
    Fixed(Vec3),
    Waypoint(Waypoint),
}

impl PathPoint {
    pub fn resolve(self, waypoints: &ResolvedWaypoints) -> Vec3 {
        match self {
            PathPoint::Fixed(position) => position,
            PathPoint::Waypoint(waypoint) => waypoints
                .resolve(waypoint)
                .unwrap_or_else(|| waypoint.fallback()),
        }
    }
}

/// Yaw behaviour over a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YawTrack {
    Lerp { from: f32, to: f32 },
    Hold(f32),
}

impl YawTrack {
    fn sample(self, t: f32) -> f32 {
        match self {
            YawTrack::Lerp { from, to } => from + (to - from) * t,
            YawTrack::Hold(yaw) => yaw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f32,
    pub end: f32,
    pub curve: Curve,
    pub from: PathPoint,
    pub to: PathPoint,
    pub yaw: YawTrack,
}

impl Segment {
    /// Position of `progress` inside this segment, in `[0, 1]`.
    pub fn normalise(&self, progress: f32) -> f32 {
        ((progress - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }
}

/// Planet approach, archive glide, turn towards about, dive to connect.
pub const SEGMENTS: [Segment; 4] = [
    Segment {
        start: SEGMENT_BOUNDARIES[0],
        end: SEGMENT_BOUNDARIES[1],
        curve: Curve::EaseOutCubic,
        from: PathPoint::Fixed(CAMERA_START),
        to: PathPoint::Waypoint(Waypoint::Archive),
        yaw: YawTrack::Lerp {
            from: ROTATION_START,
            to: ROTATION_ARCHIVE,
        },
    },
    Segment {
        start: SEGMENT_BOUNDARIES[1],
        end: SEGMENT_BOUNDARIES[2],
        curve: Curve::Linear,
        from: PathPoint::Waypoint(Waypoint::Archive),
        to: PathPoint::Waypoint(Waypoint::ArchiveAbout),
        yaw: YawTrack::Lerp {
            from: ROTATION_ARCHIVE,
            to: ROTATION_TURN,
        },
    },
    Segment {
        start: SEGMENT_BOUNDARIES[2],
        end: SEGMENT_BOUNDARIES[3],
        curve: Curve::Linear,
        from: PathPoint::Waypoint(Waypoint::ArchiveAbout),
        to: PathPoint::Waypoint(Waypoint::About),
        yaw: YawTrack::Hold(ROTATION_TURN),
    },
    Segment {
        start: SEGMENT_BOUNDARIES[3],
        end: SEGMENT_BOUNDARIES[4],
        curve: Curve::Linear,
        from: PathPoint::Waypoint(Waypoint::About),
        to: PathPoint::Waypoint(Waypoint::Connect),
        yaw: YawTrack::Lerp {
            from: ROTATION_TURN,
            to: ROTATION_CONNECT,
        },
    },
];

/// Camera position plus Euler XYZ rotation in radians (`rotation.y` is yaw).
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl CameraPose {
    pub fn to_transform(self) -> Transform {
        Transform::from_translation(self.position).with_rotation(Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        ))
    }
}

/// NaN maps to the start of the path; everything else is clamped into `[0, 1]`.
pub fn sanitise_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Index of the segment owning `progress`. A boundary belongs to the segment it opens.
pub fn segment_index(progress: f32) -> usize {
    let progress = sanitise_progress(progress);
    SEGMENTS[..SEGMENTS.len() - 1]
        .iter()
        .position(|segment| progress < segment.end)
        .unwrap_or(SEGMENTS.len() - 1)
}

pub fn compute_camera(progress: f32, waypoints: &ResolvedWaypoints) -> CameraPose {
    let progress = sanitise_progress(progress);
    let segment = &SEGMENTS[segment_index(progress)];
    let t = segment.curve.apply(segment.normalise(progress));

    let from = segment.from.resolve(waypoints);
    let to = segment.to.resolve(waypoints);

    CameraPose {
        position: from.lerp(to, t),
        rotation: Vec3::new(0.0, segment.yaw.sample(t), 0.0),
    }
}
