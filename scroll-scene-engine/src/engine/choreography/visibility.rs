use bevy::prelude::*;
use constants::visibility::*;
use serde::{Deserialize, Serialize};

use super::camera_path::sanitise_progress;

/// Sub-scenes whose visibility is coordinated by scroll progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubScene {
    Planet,
    City,
    Satellites,
    Cards,
    Debris,
}

impl SubScene {
    pub const ALL: [SubScene; 5] = [
        SubScene::Planet,
        SubScene::City,
        SubScene::Satellites,
        SubScene::Cards,
        SubScene::Debris,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SubScene::Planet => "planet",
            SubScene::City => "city",
            SubScene::Satellites => "satellites",
            SubScene::Cards => "cards",
            SubScene::Debris => "debris",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubSceneState {
    pub visible: bool,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
}

impl SubSceneState {
    pub const SOLID: Self = Self {
        visible: true,
        opacity: 1.0,
        transparent: false,
        depth_write: true,
    };

    pub const HIDDEN: Self = Self {
        visible: false,
        ..Self::SOLID
    };

    fn solid(visible: bool) -> Self {
        Self {
            visible,
            ..Self::SOLID
        }
    }
}

/// Everything the visibility systems apply for one progress value.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneStates {
    pub planet: SubSceneState,
    pub city: SubSceneState,
    pub satellites: SubSceneState,
    pub cards: SubSceneState,
    pub debris: SubSceneState,
    /// Planet flythrough depth.
    pub planet_z: f32,
    /// City reveal factor in `[0, 1]`.
    pub city_appearance: f32,
    pub jets_visible: bool,
    /// Card squash/shrink factor in `[0, 1]`.
    pub cards_disintegration: f32,
}

impl Default for SceneStates {
    fn default() -> Self {
        compute_state(0.0)
    }
}

impl SceneStates {
    pub fn get(&self, kind: SubScene) -> &SubSceneState {
        match kind {
            SubScene::Planet => &self.planet,
            SubScene::City => &self.city,
            SubScene::Satellites => &self.satellites,
            SubScene::Cards => &self.cards,
            SubScene::Debris => &self.debris,
        }
    }
}

fn unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

fn planet_state(progress: f32) -> SubSceneState {
    let fade = unit((progress - PLANET_FADE_START) / (PLANET_FADE_END - PLANET_FADE_START));
    let opacity = 1.0 - fade;
    let solid = opacity > PLANET_SOLID_OPACITY;
    SubSceneState {
        visible: progress < PLANET_VISIBLE_BELOW,
        opacity,
        transparent: !solid,
        depth_write: solid,
    }
}

fn city_appearance(progress: f32) -> f32 {
    unit((progress - CITY_APPEAR_START) / CITY_APPEAR_SPAN)
}

fn city_state(appearance: f32, progress: f32) -> SubSceneState {
    SubSceneState {
        visible: progress > CITY_VISIBLE_ABOVE,
        opacity: appearance,
        transparent: appearance < 1.0,
        depth_write: true,
    }
}

fn cards_disintegration(progress: f32) -> f32 {
    let local = (progress - CARDS_VISIBLE_FROM) / (CARDS_VISIBLE_UNTIL - CARDS_VISIBLE_FROM);
    unit((local - CARDS_DISINTEGRATE_FROM) / (1.0 - CARDS_DISINTEGRATE_FROM))
}

fn cards_state(progress: f32, disintegration: f32) -> SubSceneState {
    let transparent = disintegration > 0.0;
    SubSceneState {
        visible: (CARDS_VISIBLE_FROM..CARDS_VISIBLE_UNTIL).contains(&progress),
        opacity: 1.0 - disintegration,
        transparent,
        depth_write: !transparent,
    }
}

pub fn compute_state(progress: f32) -> SceneStates {
    let progress = sanitise_progress(progress);
    let appearance = city_appearance(progress);
    let disintegration = cards_disintegration(progress);
    let flythrough = unit(progress / PLANET_VISIBLE_BELOW);

    SceneStates {
        planet: planet_state(progress),
        city: city_state(appearance, progress),
        satellites: SubSceneState::solid(progress < SATELLITES_VISIBLE_BELOW),
        cards: cards_state(progress, disintegration),
        debris: SubSceneState::SOLID,
        planet_z: PLANET_Z_START + (PLANET_Z_END - PLANET_Z_START) * flythrough,
        city_appearance: appearance,
        jets_visible: appearance > JETS_APPEARANCE_THRESHOLD,
        cards_disintegration: disintegration,
    }
}
