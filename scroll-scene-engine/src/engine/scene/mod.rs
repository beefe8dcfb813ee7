//! Sub-scenes composed into the cinematic world.
//!
//! Each sub-scene owns a [`handle::SubSceneHandle`] resource, spawns on a
//! [`SpawnSubScene`] request from the load chain, applies the visibility state
//! computed by the driver and releases everything on [`DisposeSubScene`].

/// Load bookkeeping, disposal and material helpers shared by sub-scenes.
pub mod handle;

/// Perspective camera, bloom and portrait field of view.
pub mod camera;

/// Earth model with tilt, idle spin, cursor parallax and audio pulse.
pub mod planet;

/// City model, hotspot anchors and the fade-in ramp.
pub mod city;

/// Fighter jets crossing the city.
pub mod jets;

/// Orbiting satellite fleet.
pub mod satellites;

/// Seeded twinkling starfield.
pub mod debris;

/// Project cards billboarded in front of the camera.
pub mod cards;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::engine::choreography::driver::{DriverSet, compute_scene_states};
use crate::engine::choreography::visibility::SubScene;
use handle::{dispose_sub_scene, watch_sub_scene_load};

/// Request from the load chain to start loading a sub-scene.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSubScene(pub SubScene);

/// Despawn a sub-scene and release its assets.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposeSubScene(pub SubScene);

/// Randomness for animation details that need not repeat between runs.
#[derive(Resource)]
pub struct SceneRng(pub StdRng);

impl Default for SceneRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Fraction to close per frame at `rate` per 60 Hz tick, for a frame of `dt` seconds.
pub fn frame_lerp_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(dt.max(0.0) * 60.0)
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnSubScene>()
            .add_event::<DisposeSubScene>()
            .init_resource::<SceneRng>()
            .init_resource::<planet::PlanetScene>()
            .init_resource::<city::CityScene>()
            .init_resource::<satellites::SatelliteFleet>()
            .init_resource::<debris::Starfield>()
            .init_resource::<cards::CardDeck>()
            .init_resource::<cards::CardHover>()
            .add_systems(Startup, camera::spawn_scene_camera)
            .add_systems(
                Update,
                (
                    planet::spawn_planet,
                    city::spawn_city,
                    satellites::spawn_satellites,
                    debris::spawn_starfield,
                    cards::spawn_cards,
                ),
            )
            .add_systems(
                Update,
                (
                    watch_sub_scene_load::<planet::PlanetScene>,
                    watch_sub_scene_load::<city::CityScene>,
                    watch_sub_scene_load::<satellites::SatelliteFleet>,
                    city::watch_jet_load,
                ),
            )
            .add_systems(
                Update,
                (
                    dispose_sub_scene::<planet::PlanetScene>,
                    dispose_sub_scene::<city::CityScene>,
                    dispose_sub_scene::<satellites::SatelliteFleet>,
                    dispose_sub_scene::<debris::Starfield>,
                    dispose_sub_scene::<cards::CardDeck>,
                )
                    .before(DriverSet::Input),
            )
            .add_systems(
                Update,
                (
                    planet::apply_planet_state,
                    city::apply_city_state,
                    satellites::apply_satellite_state,
                    debris::apply_starfield_state,
                    cards::apply_card_state,
                )
                    .after(compute_scene_states)
                    .in_set(DriverSet::Visibility),
            )
            .add_systems(
                Update,
                (
                    camera::fit_fov_to_window,
                    planet::update_planet,
                    jets::fly_jets,
                    satellites::update_satellites,
                    debris::twinkle_stars,
                    cards::update_cards,
                )
                    .in_set(DriverSet::SubScenes),
            );
    }
}
