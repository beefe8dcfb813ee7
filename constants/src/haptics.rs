/// Progress values that trigger a section-entry pulse.
pub const SECTION_BOUNDARIES: [f32; 5] = [0.0, 0.27, 0.5, 0.8, 1.0];

/// Distance from a boundary that still counts as "on" it.
pub const SECTION_TOLERANCE: f32 = 0.005;

/// Grid mode (archive) is active strictly inside this range.
pub const GRID_MODE_RANGE: (f32, f32) = (0.25, 0.45);

/// Immersive mode (about) is active strictly inside this range.
pub const IMMERSIVE_MODE_RANGE: (f32, f32) = (0.5, 0.8);

/// Scroll tick throttle in milliseconds for fast and regular scrolling.
pub const FAST_SCROLL_THROTTLE_MS: f64 = 60.0;
pub const SCROLL_THROTTLE_MS: f64 = 120.0;

/// Scroll delta (pixels per frame) treated as fast scrolling.
pub const FAST_SCROLL_DELTA: f32 = 50.0;

// Vibration patterns in milliseconds.
pub const LIGHT_TAP: &[u32] = &[8];
pub const HEAVY_TAP: &[u32] = &[25];
pub const SCROLL_TICK: &[u32] = &[5];
pub const SCROLL_MOMENTUM: &[u32] = &[3, 20, 3];
pub const SECTION_ENTER: &[u32] = &[15, 40, 25];
pub const GRID_CLUNK: &[u32] = &[10, 30, 10];
pub const GRID_TICK: &[u32] = &[5];
pub const GRID_TICK_FAST: &[u32] = &[10];
pub const IMMERSIVE_SWELL: &[u32] = &[2, 5, 2];
pub const CARD_HOVER: &[u32] = &[6];
