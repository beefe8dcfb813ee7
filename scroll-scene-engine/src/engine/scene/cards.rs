use bevy::prelude::*;
use constants::scene_layout::{CARD_COUNT, CARD_DISTANCE};

use super::camera::SceneCamera;
use super::handle::{
    SubSceneHandle, SubSceneResource, apply_material_state, flat_unlit, set_visible,
};
use super::{SpawnSubScene, frame_lerp_factor};
use crate::engine::choreography::driver::ChoreographyFrame;
use crate::engine::choreography::visibility::{SceneStates, SubScene};
use crate::engine::core::device::DeviceProfile;
use crate::engine::effects::haptics::HapticFeedback;

const CARD_SIZE: Vec3 = Vec3::new(2.8, 1.8, 0.05);
const CARD_SPACING_X: f32 = 3.2;
const CARD_SPACING_Y: f32 = 2.2;
const DECK_SCALE_DESKTOP: f32 = 0.95;
const DECK_SCALE_MOBILE: f32 = 1.6;
const HOVER_SCALE: f32 = 1.05;
const HOVER_LIFT: f32 = 0.2;
const HOVER_RATE: f32 = 0.1;
/// Vertical squash reached halfway through disintegration.
const SQUASH_DEPTH: f32 = 0.9;

const CARD_TINTS: [Color; CARD_COUNT] = [
    Color::srgb(0.35, 0.8, 0.95),
    Color::srgb(0.95, 0.7, 0.3),
    Color::srgb(0.85, 0.4, 0.9),
];

/// Index of the card under the host page's pointer, if any.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CardHover(pub Option<usize>);

#[derive(Resource)]
pub struct CardDeck {
    pub handle: SubSceneHandle,
    base_scale: f32,
}

impl Default for CardDeck {
    fn default() -> Self {
        Self {
            handle: SubSceneHandle::default(),
            base_scale: DECK_SCALE_DESKTOP,
        }
    }
}

impl SubSceneResource for CardDeck {
    const KIND: SubScene = SubScene::Cards;

    fn handle(&self) -> &SubSceneHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut SubSceneHandle {
        &mut self.handle
    }
}

/// Container billboarded in front of the camera.
#[derive(Component)]
pub struct CardDeckRoot;

#[derive(Component, Debug, Clone, Copy)]
pub struct ProjectCard {
    pub index: usize,
    pub slot: Vec3,
}

pub fn deck_base_scale(profile: DeviceProfile) -> f32 {
    if profile.is_mobile_layout() {
        DECK_SCALE_MOBILE
    } else {
        DECK_SCALE_DESKTOP
    }
}

/// Rest position of a card inside the deck: a row on wide screens, a column
/// on phones.
pub fn card_slot(index: usize, mobile: bool) -> Vec3 {
    let offset = index as f32 - (CARD_COUNT as f32 - 1.0) / 2.0;
    if mobile {
        Vec3::new(0.0, -offset * CARD_SPACING_Y, 0.0)
    } else {
        Vec3::new(offset * CARD_SPACING_X, 0.0, 0.0)
    }
}

/// Container scale for a disintegration factor: the first half squashes it
/// flat, the second half shrinks what is left to nothing.
pub fn deck_scale(base: f32, disintegration: f32) -> Vec3 {
    let d = disintegration.clamp(0.0, 1.0);
    let squash = (d * 2.0).min(1.0);
    let shrink = ((d - 0.5) * 2.0).clamp(0.0, 1.0);
    let size = base * (1.0 - shrink);
    Vec3::new(size, size * (1.0 - SQUASH_DEPTH * squash), size)
}

pub fn spawn_cards(
    mut requests: EventReader<SpawnSubScene>,
    profile: Res<DeviceProfile>,
    mut deck: ResMut<CardDeck>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let requested = requests.read().any(|request| request.0 == SubScene::Cards);
    if !requested || !deck.handle.is_idle() {
        return;
    }

    let mobile = profile.is_mobile_layout();
    deck.base_scale = deck_base_scale(*profile);
    let mesh = meshes.add(Cuboid::from_size(CARD_SIZE));
    let card_materials: Vec<_> = CARD_TINTS
        .iter()
        .map(|&tint| materials.add(flat_unlit(tint, 1.0)))
        .collect();

    let root = commands
        .spawn((
            Name::new("Project Cards"),
            CardDeckRoot,
            Transform::from_scale(Vec3::splat(deck.base_scale)),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            for (index, material) in card_materials.iter().enumerate() {
                let slot = card_slot(index, mobile);
                parent.spawn((
                    Name::new(format!("Project Card {}", index)),
                    ProjectCard { index, slot },
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(slot),
                ));
            }
        })
        .id();

    deck.handle.mark_ready();
    deck.handle.add_root(root);
    deck.handle.add_mesh(mesh);
    deck.handle.add_materials(card_materials);
    info!("✓ Project cards spawned");
}

pub fn apply_card_state(
    states: Res<SceneStates>,
    mut deck: ResMut<CardDeck>,
    mut visibility: Query<&mut Visibility>,
    mut roots: Query<&mut Transform, With<CardDeckRoot>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    set_visible(&mut visibility, deck.handle.roots(), states.cards.visible);
    let scale = deck_scale(deck.base_scale, states.cards_disintegration);
    for mut transform in &mut roots {
        transform.scale = scale;
    }
    if deck.handle.take_changed_state(states.cards) {
        apply_material_state(&mut materials, &deck.handle, &states.cards);
    }
}

/// Keep the deck facing the camera and ease cards toward their hover pose.
#[allow(clippy::type_complexity)]
pub fn update_cards(
    time: Res<Time>,
    frame: Res<ChoreographyFrame>,
    hover: Res<CardHover>,
    haptics: Res<HapticFeedback>,
    cameras: Query<&Transform, (With<SceneCamera>, Without<CardDeckRoot>, Without<ProjectCard>)>,
    mut roots: Query<&mut Transform, (With<CardDeckRoot>, Without<SceneCamera>, Without<ProjectCard>)>,
    mut cards: Query<(&mut Transform, &ProjectCard), (Without<CardDeckRoot>, Without<SceneCamera>)>,
) {
    if hover.is_changed() && hover.0.is_some() && frame.effects_enabled() {
        haptics.card_hover();
    }

    if let Ok(camera) = cameras.single() {
        for mut root in &mut roots {
            root.translation = camera.translation + camera.forward() * CARD_DISTANCE;
            root.rotation = camera.rotation;
        }
    }

    let factor = frame_lerp_factor(HOVER_RATE, time.delta_secs());
    for (mut transform, card) in &mut cards {
        let hovered = hover.0 == Some(card.index);
        let (target_scale, target_z) = if hovered {
            (HOVER_SCALE, card.slot.z + HOVER_LIFT)
        } else {
            (1.0, card.slot.z)
        };
        let scale = transform.scale.x;
        transform.scale = Vec3::splat(scale + (target_scale - scale) * factor);
        let z = transform.translation.z;
        transform.translation.z = z + (target_z - z) * factor;
    }
}
