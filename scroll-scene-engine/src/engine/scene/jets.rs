use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use constants::scene_layout::JET_WRAP_X;
use rand::Rng;
use rand::rngs::StdRng;
use std::f32::consts::FRAC_PI_2;
use std::ops::Range;

use super::SceneRng;
use super::city::CityScene;
use super::handle::{flat_unlit, restyle_scene_materials};

/// Flight direction of each jet: two left to right, one right to left.
const JET_DIRECTIONS: [f32; 3] = [1.0, 1.0, -1.0];
const JET_SPEED: Range<f32> = 0.3..0.7;
const JET_HEIGHT: Range<f32> = 10.0..22.0;
const JET_DEPTH: Range<f32> = -90.0..-30.0;
/// Extra distance past the far edge a wrapped jet re-enters from.
const JET_REENTRY_SPREAD: Range<f32> = 0.0..50.0;
const JET_GREY: Color = Color::srgb(0.55, 0.58, 0.62);
const JET_ALPHA: f32 = 0.6;

/// Signed speed along world X, units per 60 Hz tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct Jet {
    pub velocity: f32,
}

/// Move a jet along X. `None` once it has flown past the edge it is heading for.
pub fn advance_jet(x: f32, velocity: f32, ticks: f32) -> Option<f32> {
    let next = x + velocity * ticks;
    let past_edge =
        (velocity > 0.0 && next > JET_WRAP_X) || (velocity < 0.0 && next < -JET_WRAP_X);
    (!past_edge).then_some(next)
}

/// X a jet re-enters from after leaving the field, `overshoot` beyond the far edge.
pub fn reentry_x(velocity: f32, overshoot: f32) -> f32 {
    -velocity.signum() * (JET_WRAP_X + overshoot)
}

/// Random world-space start inside the flight corridor.
fn jet_start(rng: &mut StdRng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-JET_WRAP_X..JET_WRAP_X),
        rng.gen_range(JET_HEIGHT),
        rng.gen_range(JET_DEPTH),
    )
}

/// Spawn the squadron as world-space roots. Returns the jet roots.
pub fn spawn_jets(
    commands: &mut Commands,
    scene: Handle<Scene>,
    scale: f32,
    rng: &mut StdRng,
) -> Vec<Entity> {
    JET_DIRECTIONS
        .iter()
        .enumerate()
        .map(|(index, &direction)| {
            commands
                .spawn((
                    Name::new(format!("Jet {}", index)),
                    Jet {
                        velocity: rng.gen_range(JET_SPEED) * direction,
                    },
                    SceneRoot(scene.clone()),
                    Transform::from_translation(jet_start(rng))
                        .with_rotation(Quat::from_rotation_y(direction * FRAC_PI_2))
                        .with_scale(Vec3::splat(scale)),
                    Visibility::Hidden,
                ))
                .observe(on_jet_ready)
                .id()
        })
        .collect()
}

fn on_jet_ready(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut city: ResMut<CityScene>,
) {
    let restyled = restyle_scene_materials(
        trigger.target(),
        &children,
        &mesh_materials,
        &mut materials,
        &mut commands,
        |_| flat_unlit(JET_GREY, JET_ALPHA),
    );
    city.jets.add_materials(restyled);
    city.jets.instance_ready();
    if city.jets.is_ready() {
        debug!("Jets ready");
    }
}

pub fn fly_jets(
    time: Res<Time>,
    mut rng: ResMut<SceneRng>,
    mut jets: Query<(&mut Transform, &Jet)>,
) {
    let ticks = time.delta_secs() * 60.0;
    for (mut transform, jet) in &mut jets {
        match advance_jet(transform.translation.x, jet.velocity, ticks) {
            Some(x) => transform.translation.x = x,
            None => {
                let overshoot = rng.0.gen_range(JET_REENTRY_SPREAD);
                transform.translation.x = reentry_x(jet.velocity, overshoot);
                transform.translation.y = rng.0.gen_range(JET_HEIGHT);
                transform.translation.z = rng.0.gen_range(JET_DEPTH);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::CommandQueue;
    use rand::SeedableRng;

    #[test]
    fn jets_move_by_speed_per_tick() {
        assert_eq!(advance_jet(0.0, 0.5, 2.0), Some(1.0));
        assert_eq!(advance_jet(0.0, -0.5, 2.0), Some(-1.0));
        assert_eq!(advance_jet(150.0, 0.0, 1.0), Some(150.0));
    }

    #[test]
    fn jets_leave_past_the_edge_they_head_for() {
        assert_eq!(advance_jet(149.8, 0.5, 1.0), None);
        assert_eq!(advance_jet(-149.8, -0.5, 1.0), None);
        assert_eq!(advance_jet(-100.0, 0.5, 1.0), Some(-99.5));
    }

    #[test]
    fn wrapped_jets_reenter_beyond_the_far_edge() {
        assert_eq!(reentry_x(0.5, 0.0), -JET_WRAP_X);
        assert_eq!(reentry_x(0.5, 30.0), -(JET_WRAP_X + 30.0));
        assert_eq!(reentry_x(-0.4, 12.5), JET_WRAP_X + 12.5);
    }

    #[test]
    fn jets_fly_in_world_space_at_their_cruising_height() {
        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let mut rng = StdRng::seed_from_u64(7);
        let jets = {
            let mut commands = Commands::new(&mut queue, &world);
            spawn_jets(&mut commands, Handle::default(), 0.2, &mut rng)
        };
        queue.apply(&mut world);

        assert_eq!(jets.len(), JET_DIRECTIONS.len());
        for jet in jets {
            assert!(world.get::<ChildOf>(jet).is_none());
            let transform = world.get::<Transform>(jet).expect("jet transform");
            assert!(JET_HEIGHT.contains(&transform.translation.y));
            assert!(JET_DEPTH.contains(&transform.translation.z));
            let heading = transform.rotation * Vec3::Z;
            let velocity = world.get::<Jet>(jet).expect("jet").velocity;
            // Noses point along world X, the axis they fly on.
            assert!((heading.x.abs() - 1.0).abs() < 1e-5);
            assert_eq!(heading.x.signum(), velocity.signum());
        }
    }
}
