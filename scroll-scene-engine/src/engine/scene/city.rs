use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use constants::scene_layout::{CITY_DIM, CITY_GROUP_Z, CITY_MODEL_OFFSET};
use std::f32::consts::PI;

use super::handle::{
    SubSceneHandle, SubSceneResource, apply_material_state, restyle_scene_materials, set_visible,
    unlit_from,
};
use super::jets::spawn_jets;
use super::{SceneRng, SpawnSubScene};
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::choreography::visibility::{SceneStates, SubScene};
use crate::engine::choreography::waypoints::{Waypoint, WaypointAnchor};
use crate::engine::core::device::DeviceProfile;

/// City group yaw, 30 degrees.
const CITY_YAW: f32 = PI / 6.0;

#[derive(Resource, Default)]
pub struct CityScene {
    pub handle: SubSceneHandle,
    /// Jets fly inside the city group but load on their own.
    pub jets: SubSceneHandle,
}

impl SubSceneResource for CityScene {
    const KIND: SubScene = SubScene::City;

    fn handle(&self) -> &SubSceneHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut SubSceneHandle {
        &mut self.handle
    }

    fn dispose_extra(
        &mut self,
        commands: &mut Commands,
        materials: &mut Assets<StandardMaterial>,
        meshes: &mut Assets<Mesh>,
    ) {
        self.jets.dispose(commands, materials, meshes);
    }
}

#[derive(Component)]
pub struct CityModel;

pub fn city_group_transform(profile: DeviceProfile) -> Transform {
    Transform::from_xyz(0.0, profile.city_base_y(), CITY_GROUP_Z)
        .with_rotation(Quat::from_rotation_y(CITY_YAW))
}

pub fn spawn_city(
    mut requests: EventReader<SpawnSubScene>,
    manifest: Option<Res<SceneManifest>>,
    profile: Res<DeviceProfile>,
    asset_server: Res<AssetServer>,
    mut rng: ResMut<SceneRng>,
    mut city: ResMut<CityScene>,
    mut commands: Commands,
) {
    let requested = requests.read().any(|request| request.0 == SubScene::City);
    let Some(manifest) = manifest else {
        return;
    };
    if !requested || !city.handle.is_idle() {
        return;
    }

    let path = manifest.models.city.clone();
    info!("→ Loading city from {}", path);

    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    let group = commands
        .spawn((
            Name::new("City"),
            city_group_transform(*profile),
            Visibility::Hidden,
        ))
        .id();
    commands.spawn((
        Name::new("City Model"),
        CityModel,
        SceneRoot(scene),
        Transform::from_translation(CITY_MODEL_OFFSET)
            .with_scale(Vec3::splat(profile.city_scale())),
        ChildOf(group),
    ))
    .observe(on_city_ready);

    city.handle.begin_loading(1);
    city.handle.track_source(asset_server.load(path));
    city.handle.add_root(group);

    let jet_path = manifest.models.jet.clone();
    let jet_scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(jet_path.clone()));
    let jets = spawn_jets(&mut commands, jet_scene, profile.jet_scale(), &mut rng.0);
    city.jets.begin_loading(jets.len());
    city.jets.track_source(asset_server.load(jet_path));
    for jet in jets {
        city.jets.add_root(jet);
    }
}

/// Dim the city into unlit translucent materials and drop the hotspot anchors
/// into model space.
fn on_city_ready(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    manifest: Option<Res<SceneManifest>>,
    mut city: ResMut<CityScene>,
) {
    let model = trigger.target();
    let restyled = restyle_scene_materials(
        model,
        &children,
        &mesh_materials,
        &mut materials,
        &mut commands,
        |source| {
            let mut material = unlit_from(source, CITY_DIM);
            material.base_color.set_alpha(0.0);
            material.alpha_mode = AlphaMode::Blend;
            material
        },
    );
    city.handle.add_materials(restyled);

    let fallback = SceneManifest::default();
    let manifest = manifest.as_deref().unwrap_or(&fallback);
    for waypoint in Waypoint::ALL {
        commands.spawn((
            Name::new(format!("Hotspot {}", waypoint.key())),
            WaypointAnchor(waypoint),
            Transform::from_translation(manifest.hotspot(waypoint)),
            ChildOf(model),
        ));
    }

    city.handle.instance_ready();
    info!("✓ City loaded with {} hotspots", Waypoint::ALL.len());
}

pub fn watch_jet_load(asset_server: Res<AssetServer>, mut city: ResMut<CityScene>) {
    if let Some(error) = city.jets.poll_failure(&asset_server) {
        warn!("Jets failed to load ({}), the city flies without them", error);
    }
}

pub fn apply_city_state(
    states: Res<SceneStates>,
    mut city: ResMut<CityScene>,
    mut visibility: Query<&mut Visibility>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    set_visible(&mut visibility, city.handle.roots(), states.city.visible);
    set_visible(&mut visibility, city.jets.roots(), states.jets_visible);
    if city.handle.take_changed_state(states.city) {
        apply_material_state(&mut materials, &city.handle, &states.city);
    }
}
