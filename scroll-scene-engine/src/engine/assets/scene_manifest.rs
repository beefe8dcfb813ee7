use bevy::prelude::*;
use constants::scene_layout::{
    CITY_MODEL, JET_MODEL, MAX_STAR_COUNT, PLANET_MODEL, SATELLITE_BASE_RADIUS, SATELLITE_MODEL,
    STAR_COUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::PI;
use thiserror::Error;

use crate::engine::choreography::waypoints::Waypoint;

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("unknown waypoint key '{0}' in city hotspots")]
    UnknownWaypoint(String),
    #[error("non-finite value in {0}")]
    NonFinite(String),
    #[error("model path for {0} is empty")]
    EmptyModelPath(&'static str),
    #[error("star_count {0} exceeds the limit of {}", MAX_STAR_COUNT)]
    TooManyStars(usize),
}

/// glTF model paths relative to the asset root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelPaths {
    pub planet: String,
    pub city: String,
    pub jet: String,
    pub satellite: String,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            planet: PLANET_MODEL.to_string(),
            city: CITY_MODEL.to_string(),
            jet: JET_MODEL.to_string(),
            satellite: SATELLITE_MODEL.to_string(),
        }
    }
}

/// One orbiting satellite. Speed is radians per 60 Hz tick of the orbit clock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SatelliteConfig {
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    pub orbit_offset: f32,
    pub z_offset: f32,
    pub scale: f32,
}

impl SatelliteConfig {
    fn new(radius_extra: f32, speed: f32, offset_turns: f32, z_offset: f32, scale: f32) -> Self {
        Self {
            orbit_radius: SATELLITE_BASE_RADIUS + radius_extra,
            orbit_speed: speed,
            orbit_offset: PI * offset_turns,
            z_offset,
            scale,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.orbit_radius,
            self.orbit_speed,
            self.orbit_offset,
            self.z_offset,
            self.scale,
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

pub fn default_satellite_fleet() -> Vec<SatelliteConfig> {
    vec![
        SatelliteConfig::new(0.0, 0.005, 0.0, -5.0, 0.45),
        SatelliteConfig::new(15.0, 0.004, 0.33, -10.0, 0.5),
        SatelliteConfig::new(8.0, 0.006, 0.66, 0.0, 0.4),
        SatelliteConfig::new(25.0, 0.003, 1.0, -8.0, 0.55),
        SatelliteConfig::new(5.0, 0.0055, 1.33, 5.0, 0.42),
        SatelliteConfig::new(20.0, 0.0045, 1.66, -3.0, 0.48),
        SatelliteConfig::new(30.0, 0.0025, 0.5, 8.0, 0.35),
        SatelliteConfig::new(12.0, 0.005, 1.16, -12.0, 0.52),
    ]
}

/// Scene configuration loaded from `scene/manifest.json`. Every field is
/// optional in the file and falls back to the compiled layout.
#[derive(Asset, TypePath, Resource, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneManifest {
    pub models: ModelPaths,
    /// City-model-space anchor positions keyed by waypoint name.
    pub hotspots: BTreeMap<String, [f32; 3]>,
    pub satellites: Vec<SatelliteConfig>,
    pub star_count: usize,
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            models: ModelPaths::default(),
            hotspots: BTreeMap::new(),
            satellites: default_satellite_fleet(),
            star_count: STAR_COUNT,
        }
    }
}

impl SceneManifest {
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (key, position) in &self.hotspots {
            if Waypoint::from_key(key).is_none() {
                return Err(ManifestError::UnknownWaypoint(key.clone()));
            }
            if !position.iter().all(|value| value.is_finite()) {
                return Err(ManifestError::NonFinite(format!("hotspots.{}", key)));
            }
        }

        for (index, satellite) in self.satellites.iter().enumerate() {
            if !satellite.is_finite() {
                return Err(ManifestError::NonFinite(format!("satellites[{}]", index)));
            }
        }

        let paths = [
            ("planet", &self.models.planet),
            ("city", &self.models.city),
            ("jet", &self.models.jet),
            ("satellite", &self.models.satellite),
        ];
        for (name, path) in paths {
            if path.trim().is_empty() {
                return Err(ManifestError::EmptyModelPath(name));
            }
        }

        if self.star_count > MAX_STAR_COUNT {
            return Err(ManifestError::TooManyStars(self.star_count));
        }

        Ok(())
    }

    /// Anchor position for `waypoint` in city model space.
    pub fn hotspot(&self, waypoint: Waypoint) -> Vec3 {
        self.hotspots
            .get(waypoint.key())
            .map(|&position| Vec3::from_array(position))
            .unwrap_or_else(|| waypoint.default_hotspot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::scene_layout::HOTSPOT_CONNECT;

    #[test]
    fn empty_document_uses_compiled_defaults() {
        let manifest: SceneManifest = serde_json::from_str("{}").expect("empty manifest parses");
        assert_eq!(manifest, SceneManifest::default());
        assert_eq!(manifest.satellites.len(), 8);
        assert_eq!(manifest.hotspot(Waypoint::Connect), HOTSPOT_CONNECT);
        assert_eq!(manifest.validate(), Ok(()));
    }

    #[test]
    fn partial_documents_override_only_what_they_name() {
        let manifest: SceneManifest = serde_json::from_str(
            r#"{ "models": { "city": "city-lite.glb" }, "hotspots": { "about": [1.0, 2.0, 3.0] } }"#,
        )
        .expect("partial manifest parses");
        assert_eq!(manifest.models.city, "city-lite.glb");
        assert_eq!(manifest.models.planet, PLANET_MODEL);
        assert_eq!(manifest.hotspot(Waypoint::About), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            manifest.hotspot(Waypoint::Archive),
            Waypoint::Archive.default_hotspot()
        );
    }

    #[test]
    fn unknown_hotspot_keys_fail_validation() {
        let mut manifest = SceneManifest::default();
        manifest.hotspots.insert("rooftop".to_string(), [0.0; 3]);
        assert_eq!(
            manifest.validate(),
            Err(ManifestError::UnknownWaypoint("rooftop".to_string()))
        );
    }

    #[test]
    fn empty_fleet_is_allowed_but_nan_orbits_are_not() {
        let mut manifest = SceneManifest {
            satellites: Vec::new(),
            ..default()
        };
        assert_eq!(manifest.validate(), Ok(()));

        let mut broken = default_satellite_fleet()[0];
        broken.orbit_radius = f32::NAN;
        manifest.satellites.push(broken);
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::NonFinite(_))
        ));
    }

    #[test]
    fn star_count_is_capped() {
        let at_limit = SceneManifest {
            star_count: MAX_STAR_COUNT,
            ..default()
        };
        assert_eq!(at_limit.validate(), Ok(()));

        let manifest: SceneManifest =
            serde_json::from_str(r#"{ "star_count": 4000000000 }"#).expect("manifest parses");
        assert_eq!(
            manifest.validate(),
            Err(ManifestError::TooManyStars(4_000_000_000))
        );
    }
}
