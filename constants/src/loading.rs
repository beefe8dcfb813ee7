/// Loader milestones shown by the host page: percent and status line.
pub const PLANET_MILESTONE: (u8, &str) = (10, "ESTABLISHING_NEURAL_UPLINK");
pub const CITY_MILESTONE: (u8, &str) = (40, "CALIBRATING_CITY_GRID");
pub const ORBITALS_MILESTONE: (u8, &str) = (70, "SCANNING_ORBITAL_OBJECTS");
pub const WARMUP_MILESTONE: (u8, &str) = (85, "OPTIMIZING_TRANSITIONS");
pub const COMPLETE_MILESTONE: (u8, &str) = (100, "NEURAL_LINK_SYNCHRONIZED");

/// Progress samples rendered during GPU warmup. Each one produces a materially
/// different transparent/opaque combination.
pub const WARMUP_SAMPLES: [f32; 3] = [0.1, 0.3, 0.9];

/// Scroll input stays locked this long after boot (seconds).
pub const IGNITION_LOCK_SECS: f32 = 2.5;

/// Relative path of the runtime scene manifest.
pub const MANIFEST_PATH: &str = "scene/manifest.json";
