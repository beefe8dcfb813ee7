use bevy::core_pipeline::bloom::Bloom;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use constants::camera_path::CAMERA_START;
use constants::render_settings::{
    BASE_FOV_DEGREES, BLOOM_INTENSITY, CAMERA_FAR, CAMERA_NEAR, MAX_FOV_DEGREES,
};

use crate::engine::core::device::DeviceProfile;

/// The one camera the choreography drives.
#[derive(Component)]
pub struct SceneCamera;

/// Vertical field of view in degrees. Portrait viewports widen it so the
/// horizontal framing of the landscape layout survives.
pub fn fov_for_aspect(aspect: f32) -> f32 {
    if !aspect.is_finite() || aspect <= 0.0 || aspect >= 1.0 {
        return BASE_FOV_DEGREES;
    }
    (BASE_FOV_DEGREES / aspect).min(MAX_FOV_DEGREES)
}

pub fn spawn_scene_camera(
    mut commands: Commands,
    profile: Res<DeviceProfile>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let aspect = windows
        .single()
        .map(|window| window.width() / window.height().max(1.0))
        .unwrap_or(1.0);

    let mut camera = commands.spawn((
        Name::new("Scene Camera"),
        SceneCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: fov_for_aspect(aspect).to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_START),
    ));

    if profile.is_desktop() {
        camera.insert((
            Camera {
                hdr: true,
                ..default()
            },
            Bloom {
                intensity: BLOOM_INTENSITY,
                ..Bloom::NATURAL
            },
        ));
    }

    info!("✓ Scene camera ready ({:?})", *profile);
}

pub fn fit_fov_to_window(
    mut resized: EventReader<WindowResized>,
    mut projections: Query<&mut Projection, With<SceneCamera>>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    if event.height <= 0.0 {
        return;
    }
    let fov = fov_for_aspect(event.width / event.height).to_radians();
    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = fov;
        }
    }
}
