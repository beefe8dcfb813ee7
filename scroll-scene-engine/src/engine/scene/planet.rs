use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use constants::scene_layout::{PLANET_SCALE, PLANET_TILT_DEGREES, PLANET_Y};

use super::handle::{
    SubSceneHandle, SubSceneResource, apply_material_state, restyle_scene_materials, set_visible,
    unlit_from,
};
use super::{SpawnSubScene, frame_lerp_factor};
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::choreography::driver::ChoreographyFrame;
use crate::engine::choreography::visibility::{SceneStates, SubScene};
use crate::engine::effects::audio::{AudioEnergy, NavPulse, PulseEnvelope};
use crate::engine::input::pointer::PointerState;

const IDLE_SPIN_PER_TICK: f32 = 0.0005;
/// Extra spin per pixel scrolled this frame.
const SCROLL_SPIN_PER_PX: f32 = 0.0005;
const PARALLAX_RANGE: f32 = 0.1;
const PARALLAX_RATE: f32 = 0.05;
const AUDIO_SCALE_RATE: f32 = 0.1;

#[derive(Resource)]
pub struct PlanetScene {
    pub handle: SubSceneHandle,
    spin: f32,
    /// Pitch and yaw offsets following the pointer.
    parallax: Vec2,
    audio_scale: f32,
    pulse: PulseEnvelope,
}

impl Default for PlanetScene {
    fn default() -> Self {
        Self {
            handle: SubSceneHandle::default(),
            spin: 0.0,
            parallax: Vec2::ZERO,
            audio_scale: 1.0,
            pulse: PulseEnvelope::default(),
        }
    }
}

impl SubSceneResource for PlanetScene {
    const KIND: SubScene = SubScene::Planet;

    fn handle(&self) -> &SubSceneHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut SubSceneHandle {
        &mut self.handle
    }
}

#[derive(Component)]
pub struct PlanetModel;

pub fn planet_rotation(spin: f32, parallax: Vec2) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        parallax.x,
        spin + parallax.y,
        PLANET_TILT_DEGREES.to_radians(),
    )
}

pub fn spawn_planet(
    mut requests: EventReader<SpawnSubScene>,
    manifest: Option<Res<SceneManifest>>,
    states: Res<SceneStates>,
    asset_server: Res<AssetServer>,
    mut planet: ResMut<PlanetScene>,
    mut commands: Commands,
) {
    let requested = requests.read().any(|request| request.0 == SubScene::Planet);
    let Some(manifest) = manifest else {
        return;
    };
    if !requested || !planet.handle.is_idle() {
        return;
    }

    let path = manifest.models.planet.clone();
    info!("→ Loading planet from {}", path);

    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    let root = commands
        .spawn((
            Name::new("Planet"),
            PlanetModel,
            SceneRoot(scene),
            Transform::from_xyz(0.0, PLANET_Y, states.planet_z)
                .with_scale(Vec3::splat(PLANET_SCALE))
                .with_rotation(planet_rotation(0.0, Vec2::ZERO)),
            Visibility::Inherited,
        ))
        .observe(on_planet_ready)
        .id();

    planet.handle.begin_loading(1);
    planet.handle.track_source(asset_server.load(path));
    planet.handle.add_root(root);
}

fn on_planet_ready(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut planet: ResMut<PlanetScene>,
) {
    let restyled = restyle_scene_materials(
        trigger.target(),
        &children,
        &mesh_materials,
        &mut materials,
        &mut commands,
        |source| unlit_from(source, 1.0),
    );
    planet.handle.add_materials(restyled);
    planet.handle.instance_ready();
    info!("✓ Planet loaded");
}

pub fn apply_planet_state(
    states: Res<SceneStates>,
    mut planet: ResMut<PlanetScene>,
    mut visibility: Query<&mut Visibility>,
    mut transforms: Query<&mut Transform, With<PlanetModel>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    set_visible(&mut visibility, planet.handle.roots(), states.planet.visible);
    for mut transform in &mut transforms {
        transform.translation.z = states.planet_z;
    }
    if planet.handle.take_changed_state(states.planet) {
        apply_material_state(&mut materials, &planet.handle, &states.planet);
    }
}

/// Idle spin, pointer parallax and audio-driven scale.
pub fn update_planet(
    time: Res<Time>,
    frame: Res<ChoreographyFrame>,
    audio: Res<AudioEnergy>,
    pointer: Res<PointerState>,
    mut pulses: EventReader<NavPulse>,
    mut planet: ResMut<PlanetScene>,
    mut transforms: Query<&mut Transform, With<PlanetModel>>,
) {
    let dt = time.delta_secs();
    let ticks = dt * 60.0;

    for pulse in pulses.read() {
        planet.pulse.trigger(pulse.intensity);
    }
    let pulse_scale = planet.pulse.tick(dt);

    planet.spin += IDLE_SPIN_PER_TICK * ticks + frame.velocity.abs() * SCROLL_SPIN_PER_PX;

    let parallax_target = Vec2::new(pointer.ndc.y, pointer.ndc.x) * PARALLAX_RANGE;
    let parallax = planet.parallax;
    planet.parallax = parallax.lerp(parallax_target, frame_lerp_factor(PARALLAX_RATE, dt));

    let audio_scale = planet.audio_scale;
    planet.audio_scale +=
        (audio.target_scale() - audio_scale) * frame_lerp_factor(AUDIO_SCALE_RATE, dt);

    let rotation = planet_rotation(planet.spin, planet.parallax);
    let scale = Vec3::splat(PLANET_SCALE * planet.audio_scale * pulse_scale);
    for mut transform in &mut transforms {
        transform.rotation = rotation;
        transform.scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    #[test]
    fn rest_rotation_is_the_axial_tilt() {
        let (x, y, z) = planet_rotation(0.0, Vec2::ZERO).to_euler(EulerRot::XYZ);
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(z, 23.5_f32.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn loud_audio_grows_the_planet() {
        let mut world = World::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 60.0));
        world.insert_resource(time);
        world.insert_resource(ChoreographyFrame::default());
        let mut audio = AudioEnergy::default();
        audio.set(1.0);
        world.insert_resource(audio);
        world.insert_resource(PointerState::default());
        world.init_resource::<Events<NavPulse>>();
        world.insert_resource(PlanetScene::default());
        let planet = world
            .spawn((PlanetModel, Transform::from_scale(Vec3::splat(PLANET_SCALE))))
            .id();

        world.run_system_once(update_planet).expect("planet update runs");

        let scale = world.get::<Transform>(planet).map(|t| t.scale.x);
        let expected = PLANET_SCALE * (1.0 + 0.1 * 0.15);
        assert_relative_eq!(scale.unwrap_or_default(), expected, epsilon = 1e-3);
    }
}
