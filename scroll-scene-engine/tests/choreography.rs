//! End-to-end driver behaviour on a headless app: scroll progress in, camera
//! transform and sub-scene states out, plus the warmup handoff.

use approx::assert_relative_eq;
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use bevy::state::app::StatesPlugin;
use constants::camera_path::{CAMERA_START, FALLBACK_ARCHIVE_ABOUT, FALLBACK_CONNECT, ROTATION_TURN};
use scroll_scene_engine::engine::choreography::camera_path::compute_camera;
use scroll_scene_engine::engine::choreography::driver::{
    ChoreographyFrame, ChoreographyPlugin, compute_scene_states,
};
use scroll_scene_engine::engine::choreography::visibility::{SceneStates, compute_state};
use scroll_scene_engine::engine::choreography::waypoints::ResolvedWaypoints;
use scroll_scene_engine::engine::core::app_state::AppState;
use scroll_scene_engine::engine::input::scroll::ScrollProgress;
use scroll_scene_engine::engine::loading::progress::{LoadPhase, PhaseCompleted};
use scroll_scene_engine::engine::scene::camera::SceneCamera;
use scroll_scene_engine::engine::scene::city::CityScene;
use scroll_scene_engine::engine::scene::planet::{PlanetScene, apply_planet_state};

fn driver_app(state: AppState) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_state(state)
        .init_resource::<ScrollProgress>()
        .init_resource::<CityScene>()
        .add_event::<PhaseCompleted>()
        .add_plugins(ChoreographyPlugin);
    let camera = app
        .world_mut()
        .spawn((SceneCamera, Transform::default()))
        .id();
    (app, camera)
}

fn scroll_to(app: &mut App, progress: f32) {
    app.world_mut().insert_resource(ScrollProgress {
        progress,
        velocity: 0.0,
    });
    app.update();
}

fn camera_translation(app: &App, camera: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(camera)
        .map(|transform| transform.translation)
        .unwrap_or(Vec3::NAN)
}

#[test]
fn camera_starts_at_the_planet_approach() {
    let (mut app, camera) = driver_app(AppState::Running);
    scroll_to(&mut app, 0.0);

    assert_eq!(camera_translation(&app, camera), CAMERA_START);
    let states = *app.world().resource::<SceneStates>();
    assert!(states.planet.visible);
    assert!(!states.city.visible);
    assert!(states.satellites.visible);
}

#[test]
fn unresolved_waypoints_fall_back_mid_scroll() {
    let (mut app, camera) = driver_app(AppState::Running);
    scroll_to(&mut app, 0.5);

    assert_eq!(camera_translation(&app, camera), FALLBACK_ARCHIVE_ABOUT);
    let rotation = app
        .world()
        .get::<Transform>(camera)
        .map(|transform| transform.rotation)
        .unwrap_or(Quat::NAN);
    assert_relative_eq!(
        rotation.dot(Quat::from_rotation_y(ROTATION_TURN)).abs(),
        1.0,
        epsilon = 1e-5
    );

    let states = *app.world().resource::<SceneStates>();
    assert!(!states.planet.visible);
    assert!(!states.cards.visible);
    assert!(states.city.visible);
    assert_eq!(states.city.opacity, 1.0);
}

#[test]
fn end_of_scroll_reaches_connect_and_stays_there() {
    let (mut app, camera) = driver_app(AppState::Running);
    scroll_to(&mut app, 1.0);
    assert_eq!(camera_translation(&app, camera), FALLBACK_CONNECT);

    scroll_to(&mut app, 3.0);
    assert_eq!(camera_translation(&app, camera), FALLBACK_CONNECT);
}

#[test]
fn the_driver_never_runs_after_a_failed_boot() {
    let (mut app, camera) = driver_app(AppState::Failed);
    scroll_to(&mut app, 0.5);
    assert_eq!(camera_translation(&app, camera), Vec3::ZERO);
}

#[test]
fn warmup_renders_its_samples_then_hands_off() {
    let (mut app, camera) = driver_app(AppState::Warmup);
    app.init_resource::<Assets<StandardMaterial>>()
        .init_resource::<PlanetScene>()
        .add_systems(Update, apply_planet_state.after(compute_scene_states));
    let planet_material = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>()
        .add(StandardMaterial::default());
    {
        let mut planet = app.world_mut().resource_mut::<PlanetScene>();
        planet.handle.mark_ready();
        planet.handle.add_materials([planet_material.clone()]);
    }
    let mesh = app
        .world_mut()
        .spawn((Mesh3d(Handle::default()), Transform::default()))
        .id();
    let pinned = app
        .world_mut()
        .spawn((Mesh3d(Handle::default()), NoFrustumCulling))
        .id();

    app.update();
    let frame = *app.world().resource::<ChoreographyFrame>();
    assert!(frame.warmup);
    assert_eq!(frame.progress, 0.1);
    assert!(app.world().get::<NoFrustumCulling>(mesh).is_some());
    assert_eq!(*app.world().resource::<SceneStates>(), compute_state(0.1));
    let expected = compute_camera(0.1, &ResolvedWaypoints::default()).position;
    assert_relative_eq!(camera_translation(&app, camera).z, expected.z, epsilon = 1e-4);
    let warm_mode = app
        .world()
        .resource::<Assets<StandardMaterial>>()
        .get(&planet_material)
        .map(|material| material.alpha_mode);
    assert_eq!(warm_mode, Some(AlphaMode::Blend));

    let mut phases = app
        .world()
        .resource::<Events<PhaseCompleted>>()
        .get_cursor();
    let mut completed = Vec::new();
    for _ in 0..10 {
        app.update();
        let events = app.world().resource::<Events<PhaseCompleted>>();
        completed.extend(phases.read(events).map(|event| event.0));
        if *app.world().resource::<State<AppState>>().get() == AppState::Running {
            break;
        }
    }

    assert_eq!(
        *app.world().resource::<State<AppState>>().get(),
        AppState::Running
    );
    assert_eq!(completed, vec![LoadPhase::Warmup]);
    assert!(!app.world().resource::<ChoreographyFrame>().warmup);
    assert!(app.world().get::<NoFrustumCulling>(mesh).is_none());
    assert!(app.world().get::<NoFrustumCulling>(pinned).is_some());
    assert_eq!(camera_translation(&app, camera), CAMERA_START);

    // The live frame after handoff restores the opening states and materials.
    let opening = compute_state(0.0);
    assert_eq!(*app.world().resource::<SceneStates>(), opening);
    let material = app
        .world()
        .resource::<Assets<StandardMaterial>>()
        .get(&planet_material)
        .cloned()
        .expect("planet material");
    assert_eq!(material.alpha_mode, AlphaMode::Opaque);
    assert_relative_eq!(material.base_color.alpha(), opening.planet.opacity);
}
