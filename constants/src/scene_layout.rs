use bevy::math::Vec3;

/// Hotspot positions in city model space. Anchors are spawned here and read
/// back in world space once the model has been placed.
pub const HOTSPOT_ARCHIVE: Vec3 = Vec3::new(1.672_301_3, 0.131_770_62, -0.661_440_7);
pub const HOTSPOT_ARCHIVE_ABOUT: Vec3 = Vec3::new(2.007_325_2, 0.352_054_87, -4.763_940_8);
pub const HOTSPOT_ABOUT: Vec3 = Vec3::new(-2.505_293_2, 0.150_090_1, -3.903_155_1);
pub const HOTSPOT_CONNECT: Vec3 = Vec3::new(-3.420, 1.788, -2.774);

pub const PLANET_MODEL: &str = "earth.glb";
pub const CITY_MODEL: &str = "scene-compressed.glb";
pub const JET_MODEL: &str = "f35-small.glb";
pub const SATELLITE_MODEL: &str = "satellite.glb";

pub const PLANET_SCALE: f32 = 25.0;
pub const PLANET_Y: f32 = -5.0;
pub const PLANET_TILT_DEGREES: f32 = 23.5;

pub const CITY_BASE_Y_DESKTOP: f32 = -50.0;
pub const CITY_BASE_Y_MOBILE: f32 = -40.0;
pub const CITY_GROUP_Z: f32 = -50.0;
pub const CITY_SCALE_DESKTOP: f32 = 15.0;
pub const CITY_SCALE_MOBILE: f32 = 3.75;
pub const CITY_MODEL_OFFSET: Vec3 = Vec3::new(7.0, 0.0, 1.0);
/// Multiplier applied to city base colours.
pub const CITY_DIM: f32 = 0.4;

pub const JET_SCALE_DESKTOP: f32 = 1.2;
pub const JET_SCALE_MOBILE: f32 = 0.6;
pub const JET_WRAP_X: f32 = 150.0;

pub const SATELLITE_BASE_RADIUS: f32 = 50.0;
pub const SATELLITE_MOBILE_SCALE: f32 = 0.6;

pub const STAR_COUNT: usize = 600;
/// Largest star field a manifest may ask for.
pub const MAX_STAR_COUNT: usize = 20_000;
pub const STAR_FIELD_RADIUS: f32 = 400.0;
pub const STAR_SEED: u64 = 0x5EED_57A2;

/// Distance of the card billboard in front of the camera.
pub const CARD_DISTANCE: f32 = 8.0;
pub const CARD_COUNT: usize = 3;
