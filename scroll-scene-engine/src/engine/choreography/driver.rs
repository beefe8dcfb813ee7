use bevy::prelude::*;

use super::camera_path::{CameraPose, compute_camera};
use super::visibility::{SceneStates, compute_state};
use super::warmup::{WarmupSequencer, run_warmup};
use super::waypoints::{ResolvedWaypoints, resolve_waypoints};
use crate::engine::core::app_state::AppState;
use crate::engine::input::scroll::{ScrollProgress, step_scroll_smoother};
use crate::engine::scene::camera::SceneCamera;

/// Per-frame driver stages, run in this order every frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverSet {
    Input,
    Resolve,
    Camera,
    Visibility,
    SubScenes,
    Effects,
}

/// Progress the driver acts on this frame. Normally a copy of the scroll
/// source; during warmup the sequencer substitutes its sample progress.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ChoreographyFrame {
    pub progress: f32,
    pub velocity: f32,
    pub warmup: bool,
}

impl ChoreographyFrame {
    pub fn begin_warmup(&mut self, progress: f32) {
        self.progress = progress;
        self.velocity = 0.0;
        self.warmup = true;
    }

    pub fn end_warmup(&mut self) {
        self.warmup = false;
    }

    /// Haptics, overlay and HUD output are muted while warming up.
    pub fn effects_enabled(&self) -> bool {
        !self.warmup
    }
}

pub struct ChoreographyPlugin;

impl Plugin for ChoreographyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChoreographyFrame>()
            .init_resource::<ResolvedWaypoints>()
            .init_resource::<CameraPose>()
            .init_resource::<SceneStates>()
            .init_resource::<WarmupSequencer>()
            .configure_sets(
                Update,
                (
                    DriverSet::Input,
                    DriverSet::Resolve,
                    DriverSet::Camera,
                    DriverSet::Visibility,
                    DriverSet::SubScenes,
                    DriverSet::Effects,
                )
                    .chain()
                    .run_if(driver_enabled),
            )
            .add_systems(
                Update,
                (
                    sample_frame_input,
                    run_warmup.run_if(in_state(AppState::Warmup)),
                )
                    .chain()
                    .after(step_scroll_smoother)
                    .in_set(DriverSet::Input),
            )
            .add_systems(Update, resolve_waypoints.in_set(DriverSet::Resolve))
            .add_systems(Update, drive_camera.in_set(DriverSet::Camera))
            .add_systems(Update, compute_scene_states.in_set(DriverSet::Visibility));
    }
}

/// The driver never runs after a fatal boot failure.
pub fn driver_enabled(state: Res<State<AppState>>) -> bool {
    *state.get() != AppState::Failed
}

pub fn sample_frame_input(scroll: Res<ScrollProgress>, mut frame: ResMut<ChoreographyFrame>) {
    frame.set_if_neq(ChoreographyFrame {
        progress: scroll.progress,
        velocity: scroll.velocity,
        warmup: false,
    });
}

/// Sole writer of the scene camera transform.
pub fn drive_camera(
    frame: Res<ChoreographyFrame>,
    waypoints: Res<ResolvedWaypoints>,
    mut pose: ResMut<CameraPose>,
    mut cameras: Query<&mut Transform, With<SceneCamera>>,
) {
    let next = compute_camera(frame.progress, &waypoints);
    pose.set_if_neq(next);

    let target = next.to_transform();
    for mut transform in &mut cameras {
        transform.translation = target.translation;
        transform.rotation = target.rotation;
    }
}

pub fn compute_scene_states(frame: Res<ChoreographyFrame>, mut states: ResMut<SceneStates>) {
    states.set_if_neq(compute_state(frame.progress));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;
    use constants::camera_path::FALLBACK_ARCHIVE_ABOUT;

    #[test]
    fn camera_follows_the_frame_progress() {
        let mut world = World::new();
        world.insert_resource(ChoreographyFrame {
            progress: 0.5,
            velocity: 0.0,
            warmup: false,
        });
        world.init_resource::<ResolvedWaypoints>();
        world.init_resource::<CameraPose>();
        let camera = world.spawn((SceneCamera, Transform::default())).id();

        world.run_system_once(drive_camera).expect("camera system runs");

        let transform = world.get::<Transform>(camera).expect("camera transform");
        assert_eq!(transform.translation, FALLBACK_ARCHIVE_ABOUT);
        let (_, yaw, _) = transform.rotation.to_euler(EulerRot::YXZ);
        assert_relative_eq!(yaw, 112.5_f32.to_radians(), epsilon = 1e-4);
        assert_eq!(world.resource::<CameraPose>().position, FALLBACK_ARCHIVE_ABOUT);
    }

    #[test]
    fn warmup_frames_mute_effects() {
        let mut frame = ChoreographyFrame::default();
        assert!(frame.effects_enabled());
        frame.begin_warmup(0.3);
        assert!(!frame.effects_enabled());
        assert_eq!(frame.progress, 0.3);
        frame.end_warmup();
        assert!(frame.effects_enabled());
    }
}
