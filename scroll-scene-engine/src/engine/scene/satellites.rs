use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use rand::Rng;

use super::handle::{
    SubSceneHandle, SubSceneResource, apply_material_state, flat_unlit, restyle_scene_materials,
    set_visible,
};
use super::{SceneRng, SpawnSubScene};
use crate::engine::assets::scene_manifest::{SatelliteConfig, SceneManifest};
use crate::engine::choreography::visibility::{SceneStates, SubScene};
use crate::engine::core::device::DeviceProfile;

/// Orbit clock advance per 60 Hz tick.
const ORBIT_CLOCK_PER_TICK: f32 = 0.016;
const SATELLITE_ALPHA: f32 = 0.5;

#[derive(Resource)]
pub struct SatelliteFleet {
    pub handle: SubSceneHandle,
    orbit_clock: f32,
}

impl Default for SatelliteFleet {
    fn default() -> Self {
        Self {
            handle: SubSceneHandle::with_base_alpha(SATELLITE_ALPHA),
            orbit_clock: 0.0,
        }
    }
}

impl SubSceneResource for SatelliteFleet {
    const KIND: SubScene = SubScene::Satellites;

    fn handle(&self) -> &SubSceneHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut SubSceneHandle {
        &mut self.handle
    }
}

/// Orbit group; its translation follows the orbit.
#[derive(Component, Debug, Clone, Copy)]
pub struct SatelliteOrbit(pub SatelliteConfig);

/// The model inside an orbit group, tumbling at its own rate.
#[derive(Component, Debug, Clone, Copy)]
pub struct SatelliteSpin(pub f32);

/// Orbit position at `clock`: a flattened ellipse around the planet.
pub fn orbit_position(config: &SatelliteConfig, clock: f32) -> Vec3 {
    let angle = clock * config.orbit_speed + config.orbit_offset;
    Vec3::new(
        angle.cos() * config.orbit_radius,
        angle.sin() * config.orbit_radius * 0.3,
        config.z_offset,
    )
}

pub fn spawn_satellites(
    mut requests: EventReader<SpawnSubScene>,
    manifest: Option<Res<SceneManifest>>,
    profile: Res<DeviceProfile>,
    asset_server: Res<AssetServer>,
    mut rng: ResMut<SceneRng>,
    mut fleet: ResMut<SatelliteFleet>,
    mut commands: Commands,
) {
    let requested = requests
        .read()
        .any(|request| request.0 == SubScene::Satellites);
    let Some(manifest) = manifest else {
        return;
    };
    if !requested || !fleet.handle.is_idle() {
        return;
    }

    let path = manifest.models.satellite.clone();
    info!(
        "→ Loading {} satellites from {}",
        manifest.satellites.len(),
        path
    );

    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    fleet.handle.begin_loading(manifest.satellites.len());
    if !manifest.satellites.is_empty() {
        fleet.handle.track_source(asset_server.load(path));
    }

    for (index, config) in manifest.satellites.iter().enumerate() {
        let orbit = commands
            .spawn((
                Name::new(format!("Satellite Orbit {}", index)),
                SatelliteOrbit(*config),
                Transform::from_translation(orbit_position(config, 0.0)),
                Visibility::Inherited,
            ))
            .id();
        commands
            .spawn((
                Name::new(format!("Satellite {}", index)),
                SatelliteSpin(rng.0.gen_range(0.15..0.35)),
                SceneRoot(scene.clone()),
                Transform::from_scale(Vec3::splat(config.scale * profile.satellite_scale())),
                ChildOf(orbit),
            ))
            .observe(on_satellite_ready);
        fleet.handle.add_root(orbit);
    }
}

fn on_satellite_ready(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut fleet: ResMut<SatelliteFleet>,
) {
    let restyled = restyle_scene_materials(
        trigger.target(),
        &children,
        &mesh_materials,
        &mut materials,
        &mut commands,
        |_| flat_unlit(Color::srgb_u8(0x88, 0x88, 0x88), SATELLITE_ALPHA),
    );
    fleet.handle.add_materials(restyled);
    fleet.handle.instance_ready();
    if fleet.handle.is_ready() {
        info!("✓ Satellite fleet loaded");
    }
}

pub fn apply_satellite_state(
    states: Res<SceneStates>,
    mut fleet: ResMut<SatelliteFleet>,
    mut visibility: Query<&mut Visibility>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    set_visible(&mut visibility, fleet.handle.roots(), states.satellites.visible);
    if fleet.handle.take_changed_state(states.satellites) {
        apply_material_state(&mut materials, &fleet.handle, &states.satellites);
    }
}

pub fn update_satellites(
    time: Res<Time>,
    mut fleet: ResMut<SatelliteFleet>,
    mut orbits: Query<(&mut Transform, &SatelliteOrbit), Without<SatelliteSpin>>,
    mut models: Query<(&mut Transform, &SatelliteSpin), Without<SatelliteOrbit>>,
) {
    let ticks = time.delta_secs() * 60.0;
    fleet.orbit_clock += ORBIT_CLOCK_PER_TICK * ticks;

    for (mut transform, orbit) in &mut orbits {
        transform.translation = orbit_position(&orbit.0, fleet.orbit_clock);
    }
    for (mut transform, spin) in &mut models {
        transform.rotate_local_y(spin.0 * 0.01 * ticks);
        transform.rotate_local_x(spin.0 * 0.005 * ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn config() -> SatelliteConfig {
        SatelliteConfig {
            orbit_radius: 50.0,
            orbit_speed: 0.5,
            orbit_offset: 0.0,
            z_offset: -5.0,
            scale: 0.45,
        }
    }

    #[test]
    fn orbit_starts_at_its_offset() {
        let position = orbit_position(&config(), 0.0);
        assert_relative_eq!(position.x, 50.0);
        assert_relative_eq!(position.y, 0.0);
        assert_relative_eq!(position.z, -5.0);
    }

    #[test]
    fn orbit_is_flattened_vertically() {
        let position = orbit_position(&config(), FRAC_PI_2 / 0.5);
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 15.0, epsilon = 1e-4);
    }

    #[test]
    fn empty_fleets_settle_immediately() {
        let mut fleet = SatelliteFleet::default();
        fleet.handle.begin_loading(0);
        assert!(fleet.handle.is_settled());
    }
}
