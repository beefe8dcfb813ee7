use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use std::collections::HashMap;

use super::DisposeSubScene;
use crate::engine::choreography::visibility::{SubScene, SubSceneState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
    Disposed,
}

/// Bookkeeping shared by every sub-scene: spawned roots, owned assets, load
/// progress and the last state applied to its materials.
#[derive(Debug)]
pub struct SubSceneHandle {
    status: LoadStatus,
    roots: Vec<Entity>,
    materials: Vec<Handle<StandardMaterial>>,
    meshes: Vec<Handle<Mesh>>,
    sources: Vec<Handle<Gltf>>,
    expected: usize,
    ready: usize,
    failed: usize,
    /// Material alpha at full opacity.
    base_alpha: f32,
    applied: Option<SubSceneState>,
}

impl Default for SubSceneHandle {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            roots: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            sources: Vec::new(),
            expected: 0,
            ready: 0,
            failed: 0,
            base_alpha: 1.0,
            applied: None,
        }
    }
}

impl SubSceneHandle {
    pub fn with_base_alpha(base_alpha: f32) -> Self {
        Self {
            base_alpha,
            ..default()
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == LoadStatus::Idle
    }

    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    /// Loaded, failed or disposed: nothing further will arrive.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            LoadStatus::Ready | LoadStatus::Failed | LoadStatus::Disposed
        )
    }

    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn materials(&self) -> &[Handle<StandardMaterial>] {
        &self.materials
    }

    pub fn base_alpha(&self) -> f32 {
        self.base_alpha
    }

    /// Start waiting for `expected` scene instances.
    pub fn begin_loading(&mut self, expected: usize) {
        self.status = LoadStatus::Loading;
        self.expected = expected;
        self.ready = 0;
        self.failed = 0;
        self.settle();
    }

    /// Procedural sub-scenes are ready as soon as they are spawned.
    pub fn mark_ready(&mut self) {
        self.begin_loading(0);
    }

    pub fn track_source(&mut self, source: Handle<Gltf>) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn add_root(&mut self, root: Entity) {
        self.roots.push(root);
    }

    pub fn add_materials(&mut self, materials: impl IntoIterator<Item = Handle<StandardMaterial>>) {
        self.materials.extend(materials);
        // New materials start from their loaded state.
        self.applied = None;
    }

    pub fn add_mesh(&mut self, mesh: Handle<Mesh>) {
        self.meshes.push(mesh);
    }

    pub fn instance_ready(&mut self) {
        if self.status != LoadStatus::Loading {
            return;
        }
        self.ready += 1;
        self.settle();
    }

    /// Every instance still pending is counted as failed.
    pub fn fail_remaining(&mut self) {
        if self.status != LoadStatus::Loading {
            return;
        }
        self.failed = self.expected.saturating_sub(self.ready);
        self.settle();
    }

    fn settle(&mut self) {
        if self.status != LoadStatus::Loading || self.ready + self.failed < self.expected {
            return;
        }
        self.status = if self.ready > 0 || self.expected == 0 {
            LoadStatus::Ready
        } else {
            LoadStatus::Failed
        };
    }

    /// Record `state` as applied. Returns `false` when it already was.
    pub fn take_changed_state(&mut self, state: SubSceneState) -> bool {
        if self.applied == Some(state) {
            return false;
        }
        self.applied = Some(state);
        true
    }

    /// Despawn every root and release owned assets. Returns `false` when
    /// there was nothing to dispose.
    pub fn dispose(
        &mut self,
        commands: &mut Commands,
        materials: &mut Assets<StandardMaterial>,
        meshes: &mut Assets<Mesh>,
    ) -> bool {
        if matches!(self.status, LoadStatus::Idle | LoadStatus::Disposed) {
            return false;
        }
        for root in self.roots.drain(..) {
            commands.entity(root).try_despawn();
        }
        for material in self.materials.drain(..) {
            materials.remove(&material);
        }
        for mesh in self.meshes.drain(..) {
            meshes.remove(&mesh);
        }
        self.sources.clear();
        self.applied = None;
        self.status = LoadStatus::Disposed;
        true
    }

    /// Returns the load error when a tracked source failed this frame.
    pub fn poll_failure(&mut self, asset_server: &AssetServer) -> Option<String> {
        if self.status != LoadStatus::Loading {
            return None;
        }
        let error = self.sources.iter().find_map(|source| {
            match asset_server.get_load_state(source) {
                Some(LoadState::Failed(err)) => Some(err.to_string()),
                _ => None,
            }
        })?;
        self.fail_remaining();
        Some(error)
    }
}

/// Resource owning one sub-scene.
pub trait SubSceneResource: Resource {
    const KIND: SubScene;

    fn handle(&self) -> &SubSceneHandle;

    fn handle_mut(&mut self) -> &mut SubSceneHandle;

    /// Release anything owned outside the main handle.
    fn dispose_extra(
        &mut self,
        _commands: &mut Commands,
        _materials: &mut Assets<StandardMaterial>,
        _meshes: &mut Assets<Mesh>,
    ) {
    }
}

pub fn watch_sub_scene_load<R: SubSceneResource>(
    asset_server: Res<AssetServer>,
    mut scene: ResMut<R>,
) {
    if let Some(error) = scene.handle_mut().poll_failure(&asset_server) {
        warn!(
            "{} failed to load ({}), continuing without it",
            R::KIND.name(),
            error
        );
    }
}

pub fn dispose_sub_scene<R: SubSceneResource>(
    mut requests: EventReader<DisposeSubScene>,
    mut scene: ResMut<R>,
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for request in requests.read() {
        if request.0 != R::KIND {
            continue;
        }
        let disposed = scene
            .handle_mut()
            .dispose(&mut commands, &mut materials, &mut meshes);
        scene.dispose_extra(&mut commands, &mut materials, &mut meshes);
        if disposed {
            info!("{} disposed", R::KIND.name());
        }
    }
}

/// Unlit, double-sided copy of `source` with its colour scaled by `tint`.
pub fn unlit_from(source: Option<&StandardMaterial>, tint: f32) -> StandardMaterial {
    let (base_color, texture) = source
        .map(|material| (material.base_color, material.base_color_texture.clone()))
        .unwrap_or((Color::WHITE, None));
    let linear = base_color.to_linear();

    StandardMaterial {
        base_color: Color::LinearRgba(LinearRgba::new(
            linear.red * tint,
            linear.green * tint,
            linear.blue * tint,
            linear.alpha,
        )),
        base_color_texture: texture,
        ..flat_unlit(Color::WHITE, 1.0)
    }
}

/// Untextured unlit material.
pub fn flat_unlit(colour: Color, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: colour.with_alpha(alpha),
        unlit: true,
        double_sided: true,
        cull_mode: None::<Face>,
        alpha_mode: if alpha < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        ..default()
    }
}

/// Replace every mesh material below `root` with `restyle(loaded)`. Meshes
/// that shared a material keep sharing the replacement.
pub fn restyle_scene_materials(
    root: Entity,
    children: &Query<&Children>,
    mesh_materials: &Query<&MeshMaterial3d<StandardMaterial>>,
    materials: &mut Assets<StandardMaterial>,
    commands: &mut Commands,
    restyle: impl Fn(Option<&StandardMaterial>) -> StandardMaterial,
) -> Vec<Handle<StandardMaterial>> {
    let mut replaced: HashMap<AssetId<StandardMaterial>, Handle<StandardMaterial>> =
        HashMap::new();

    for entity in children.iter_descendants(root) {
        let Ok(MeshMaterial3d(loaded)) = mesh_materials.get(entity) else {
            continue;
        };
        let replacement = replaced
            .entry(loaded.id())
            .or_insert_with(|| {
                let restyled = restyle(materials.get(loaded));
                materials.add(restyled)
            })
            .clone();
        commands
            .entity(entity)
            .insert(MeshMaterial3d(replacement));
    }

    replaced.into_values().collect()
}

/// Bevy only writes depth for opaque materials, so depth writing follows solidity.
pub fn alpha_mode_for(state: &SubSceneState, base_alpha: f32) -> AlphaMode {
    if state.transparent || base_alpha < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

pub fn apply_material_state(
    materials: &mut Assets<StandardMaterial>,
    handle: &SubSceneHandle,
    state: &SubSceneState,
) {
    let alpha_mode = alpha_mode_for(state, handle.base_alpha());
    for material_handle in handle.materials() {
        if let Some(material) = materials.get_mut(material_handle) {
            material.base_color.set_alpha(state.opacity * handle.base_alpha());
            material.alpha_mode = alpha_mode;
        }
    }
}

pub fn set_visible(visibility: &mut Query<&mut Visibility>, entities: &[Entity], visible: bool) {
    let target = if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for &entity in entities {
        if let Ok(mut current) = visibility.get_mut(entity) {
            current.set_if_neq(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_model_settles_on_ready_or_failure() {
        let mut handle = SubSceneHandle::default();
        assert!(!handle.is_settled());
        handle.begin_loading(1);
        assert!(!handle.is_settled());
        handle.instance_ready();
        assert!(handle.is_ready());

        let mut failing = SubSceneHandle::default();
        failing.begin_loading(1);
        failing.fail_remaining();
        assert!(failing.is_settled());
        assert!(!failing.is_ready());
        assert_eq!(failing.status(), LoadStatus::Failed);
    }

    #[test]
    fn fleets_settle_once_every_instance_reports() {
        let mut handle = SubSceneHandle::default();
        handle.begin_loading(3);
        handle.instance_ready();
        handle.instance_ready();
        assert!(!handle.is_settled());
        handle.fail_remaining();
        assert!(handle.is_ready());
    }

    #[test]
    fn empty_and_procedural_scenes_are_ready_immediately() {
        let mut handle = SubSceneHandle::default();
        handle.mark_ready();
        assert!(handle.is_ready());
    }

    #[test]
    fn applied_state_is_only_reported_when_it_changes() {
        let mut handle = SubSceneHandle::default();
        assert!(handle.take_changed_state(SubSceneState::SOLID));
        assert!(!handle.take_changed_state(SubSceneState::SOLID));
        assert!(handle.take_changed_state(SubSceneState::HIDDEN));
        handle.add_materials([]);
        assert!(handle.take_changed_state(SubSceneState::HIDDEN));
    }

    #[test]
    fn translucent_states_blend() {
        let fading = SubSceneState {
            opacity: 0.5,
            transparent: true,
            depth_write: false,
            ..SubSceneState::SOLID
        };
        assert_eq!(alpha_mode_for(&SubSceneState::SOLID, 1.0), AlphaMode::Opaque);
        assert_eq!(alpha_mode_for(&fading, 1.0), AlphaMode::Blend);
        assert_eq!(alpha_mode_for(&SubSceneState::SOLID, 0.5), AlphaMode::Blend);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut world = World::new();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<Mesh>>();
        let root = world.spawn(Transform::default()).id();
        let material = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(flat_unlit(Color::WHITE, 1.0));

        let mut handle = SubSceneHandle::default();
        handle.mark_ready();
        handle.add_root(root);
        handle.add_materials([material.clone()]);

        let mut first = false;
        let mut second = true;
        world.resource_scope(|world, mut materials: Mut<Assets<StandardMaterial>>| {
            world.resource_scope(|world, mut meshes: Mut<Assets<Mesh>>| {
                let mut queue = bevy::ecs::world::CommandQueue::default();
                let mut commands = Commands::new(&mut queue, world);
                first = handle.dispose(&mut commands, &mut materials, &mut meshes);
                second = handle.dispose(&mut commands, &mut materials, &mut meshes);
                queue.apply(world);
            });
        });

        assert!(first);
        assert!(!second);
        assert_eq!(handle.status(), LoadStatus::Disposed);
        assert!(handle.is_settled());
        assert!(world.get_entity(root).is_err());
        assert!(world.resource::<Assets<StandardMaterial>>().get(&material).is_none());
    }
}
