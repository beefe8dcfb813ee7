use bevy::prelude::*;
use constants::scene_layout::{STAR_FIELD_RADIUS, STAR_SEED};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use super::SpawnSubScene;
use super::handle::{
    SubSceneHandle, SubSceneResource, apply_material_state, flat_unlit, set_visible,
};
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::choreography::visibility::{SceneStates, SubScene};

const STAR_RADIUS: f32 = 0.35;
const STAR_INNER_RADIUS: f32 = 150.0;
const TWINKLE_DEPTH: f32 = 0.35;

#[derive(Resource, Default)]
pub struct Starfield {
    pub handle: SubSceneHandle,
}

impl SubSceneResource for Starfield {
    const KIND: SubScene = SubScene::Debris;

    fn handle(&self) -> &SubSceneHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut SubSceneHandle {
        &mut self.handle
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub base_scale: f32,
    pub speed: f32,
    pub phase: f32,
}

/// Deterministic star placement on a shell around the scene.
pub fn star_layout(count: usize, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalize_or(Vec3::Y);
            Star {
                position: direction * rng.gen_range(STAR_INNER_RADIUS..STAR_FIELD_RADIUS),
                base_scale: rng.gen_range(0.5..1.5),
                speed: rng.gen_range(0.5..2.5),
                phase: rng.gen_range(0.0..TAU),
            }
        })
        .collect()
}

pub fn twinkle_scale(star: &Star, seconds: f32) -> f32 {
    star.base_scale * (1.0 + TWINKLE_DEPTH * (seconds * star.speed + star.phase).sin())
}

pub fn spawn_starfield(
    mut requests: EventReader<SpawnSubScene>,
    manifest: Option<Res<SceneManifest>>,
    mut starfield: ResMut<Starfield>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let requested = requests.read().any(|request| request.0 == SubScene::Debris);
    let Some(manifest) = manifest else {
        return;
    };
    if !requested || !starfield.handle.is_idle() {
        return;
    }

    let mesh = meshes.add(Sphere::new(STAR_RADIUS).mesh().uv(8, 6));
    let material = materials.add(flat_unlit(Color::WHITE, 1.0));
    let stars = star_layout(manifest.star_count, STAR_SEED);

    let root = commands
        .spawn((Name::new("Starfield"), Transform::default(), Visibility::Inherited))
        .with_children(|parent| {
            for star in &stars {
                parent.spawn((
                    *star,
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(star.position)
                        .with_scale(Vec3::splat(star.base_scale)),
                ));
            }
        })
        .id();

    starfield.handle.mark_ready();
    starfield.handle.add_root(root);
    starfield.handle.add_mesh(mesh);
    starfield.handle.add_materials([material]);
    info!("✓ Starfield spawned with {} stars", stars.len());
}

pub fn apply_starfield_state(
    states: Res<SceneStates>,
    mut starfield: ResMut<Starfield>,
    mut visibility: Query<&mut Visibility>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    set_visible(&mut visibility, starfield.handle.roots(), states.debris.visible);
    if starfield.handle.take_changed_state(states.debris) {
        apply_material_state(&mut materials, &starfield.handle, &states.debris);
    }
}

pub fn twinkle_stars(time: Res<Time>, mut stars: Query<(&mut Transform, &Star)>) {
    let seconds = time.elapsed_secs();
    for (mut transform, star) in &mut stars {
        transform.scale = Vec3::splat(twinkle_scale(star, seconds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn layout_is_deterministic_per_seed() {
        assert_eq!(star_layout(32, 7), star_layout(32, 7));
        assert_ne!(star_layout(32, 7), star_layout(32, 8));
        assert!(star_layout(0, 7).is_empty());
    }

    #[test]
    fn stars_sit_on_the_shell() {
        for star in star_layout(200, STAR_SEED) {
            let distance = star.position.length();
            assert!(distance >= STAR_INNER_RADIUS - 1e-3);
            assert!(distance <= STAR_FIELD_RADIUS + 1e-3);
        }
    }

    #[test]
    fn twinkle_starts_from_the_phase() {
        let star = Star {
            position: Vec3::ZERO,
            base_scale: 2.0,
            speed: 1.0,
            phase: 0.0,
        };
        assert_relative_eq!(twinkle_scale(&star, 0.0), 2.0);
    }

    proptest! {
        #[test]
        fn twinkle_stays_within_its_depth(seconds in 0.0f32..10_000.0) {
            for star in star_layout(16, STAR_SEED) {
                let scale = twinkle_scale(&star, seconds);
                prop_assert!(scale >= star.base_scale * (1.0 - TWINKLE_DEPTH) - 1e-4);
                prop_assert!(scale <= star.base_scale * (1.0 + TWINKLE_DEPTH) + 1e-4);
            }
        }
    }
}
