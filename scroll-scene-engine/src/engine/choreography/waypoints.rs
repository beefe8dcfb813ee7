use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;
use constants::camera_path::{
    FALLBACK_ABOUT, FALLBACK_ARCHIVE, FALLBACK_ARCHIVE_ABOUT, FALLBACK_CONNECT,
};
use constants::scene_layout::{
    HOTSPOT_ABOUT, HOTSPOT_ARCHIVE, HOTSPOT_ARCHIVE_ABOUT, HOTSPOT_CONNECT,
};
use serde::{Deserialize, Serialize};

use crate::engine::scene::city::CityScene;

/// Named camera destination inside the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    Archive,
    ArchiveAbout,
    About,
    Connect,
}

impl Waypoint {
    pub const ALL: [Waypoint; 4] = [
        Waypoint::Archive,
        Waypoint::ArchiveAbout,
        Waypoint::About,
        Waypoint::Connect,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "archive" => Some(Self::Archive),
            "archive_about" => Some(Self::ArchiveAbout),
            "about" => Some(Self::About),
            "connect" => Some(Self::Connect),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::ArchiveAbout => "archive_about",
            Self::About => "about",
            Self::Connect => "connect",
        }
    }

    /// Anchor position in city model space when the manifest does not override it.
    pub fn default_hotspot(self) -> Vec3 {
        match self {
            Self::Archive => HOTSPOT_ARCHIVE,
            Self::ArchiveAbout => HOTSPOT_ARCHIVE_ABOUT,
            Self::About => HOTSPOT_ABOUT,
            Self::Connect => HOTSPOT_CONNECT,
        }
    }

    /// World position used by the camera path while the anchor is unresolved.
    pub fn fallback(self) -> Vec3 {
        match self {
            Self::Archive => FALLBACK_ARCHIVE,
            Self::ArchiveAbout => FALLBACK_ARCHIVE_ABOUT,
            Self::About => FALLBACK_ABOUT,
            Self::Connect => FALLBACK_CONNECT,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Archive => 0,
            Self::ArchiveAbout => 1,
            Self::About => 2,
            Self::Connect => 3,
        }
    }
}

/// Invisible marker parented under the city model. Its global translation is
/// the waypoint's world position.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaypointAnchor(pub Waypoint);

/// World-space waypoint positions captured at the start of the frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedWaypoints {
    slots: [Option<Vec3>; 4],
}

impl ResolvedWaypoints {
    pub fn resolve(&self, waypoint: Waypoint) -> Option<Vec3> {
        self.slots[waypoint.slot()]
    }

    /// Lookup by name. Unknown names resolve to `None`.
    pub fn resolve_key(&self, key: &str) -> Option<Vec3> {
        Waypoint::from_key(key).and_then(|waypoint| self.resolve(waypoint))
    }

    pub fn set(&mut self, waypoint: Waypoint, position: Option<Vec3>) {
        self.slots[waypoint.slot()] = position;
    }

    pub fn with(mut self, waypoint: Waypoint, position: Vec3) -> Self {
        self.set(waypoint, Some(position));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Snapshot every anchor's world position. Anchors only count once the city
/// has finished loading; before that every waypoint stays unresolved.
pub fn resolve_waypoints(
    city: Res<CityScene>,
    anchors: Query<(Entity, &WaypointAnchor)>,
    transform_helper: TransformHelper,
    mut resolved: ResMut<ResolvedWaypoints>,
) {
    let mut snapshot = ResolvedWaypoints::default();

    if city.handle.is_ready() {
        for (entity, anchor) in &anchors {
            match transform_helper.compute_global_transform(entity) {
                Ok(global) => snapshot.set(anchor.0, Some(global.translation())),
                Err(err) => debug!("Waypoint {} unresolved: {:?}", anchor.0.key(), err),
            }
        }
    }

    if *resolved != snapshot {
        if resolved.is_empty() && !snapshot.is_empty() {
            info!("City waypoints resolved");
        }
        *resolved = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn keys_round_trip_and_unknown_keys_are_rejected() {
        for waypoint in Waypoint::ALL {
            assert_eq!(Waypoint::from_key(waypoint.key()), Some(waypoint));
        }
        assert_eq!(Waypoint::from_key("lobby"), None);
        assert_eq!(Waypoint::from_key(""), None);
    }

    #[test]
    fn unknown_key_resolves_to_none() {
        let resolved = ResolvedWaypoints::default().with(Waypoint::Archive, Vec3::ONE);
        assert_eq!(resolved.resolve_key("archive"), Some(Vec3::ONE));
        assert_eq!(resolved.resolve_key("rooftop"), None);
        assert_eq!(resolved.resolve_key("connect"), None);
    }

    fn world_with_city(ready: bool) -> (World, Entity) {
        let mut world = World::new();
        let mut city = CityScene::default();
        if ready {
            city.handle.mark_ready();
        }
        world.insert_resource(city);
        world.init_resource::<ResolvedWaypoints>();

        let group = world
            .spawn(Transform::from_xyz(0.0, -50.0, -50.0))
            .id();
        let model = world
            .spawn((
                Transform::from_xyz(7.0, 0.0, 1.0).with_scale(Vec3::splat(15.0)),
                ChildOf(group),
            ))
            .id();
        world.spawn((
            WaypointAnchor(Waypoint::Archive),
            Transform::from_translation(Vec3::new(1.0, 0.0, -1.0)),
            ChildOf(model),
        ));
        (world, model)
    }

    #[test]
    fn anchors_bake_in_parent_transforms() {
        let (mut world, _) = world_with_city(true);
        world
            .run_system_once(resolve_waypoints)
            .expect("resolve system runs");

        let resolved = world.resource::<ResolvedWaypoints>();
        let archive = resolved.resolve(Waypoint::Archive).expect("archive resolved");
        assert_relative_eq!(archive.x, 22.0, epsilon = 1e-4);
        assert_relative_eq!(archive.y, -50.0, epsilon = 1e-4);
        assert_relative_eq!(archive.z, -64.0, epsilon = 1e-4);
        assert_eq!(resolved.resolve(Waypoint::Connect), None);
    }

    #[test]
    fn anchors_are_ignored_until_the_city_is_ready() {
        let (mut world, _) = world_with_city(false);
        world
            .run_system_once(resolve_waypoints)
            .expect("resolve system runs");
        assert!(world.resource::<ResolvedWaypoints>().is_empty());
    }
}
