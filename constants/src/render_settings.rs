/// Vertical field of view for landscape viewports (degrees).
pub const BASE_FOV_DEGREES: f32 = 75.0;

/// Upper bound for the widened portrait field of view (degrees).
pub const MAX_FOV_DEGREES: f32 = 120.0;

pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Scene background, `#050505`.
pub const CLEAR_COLOUR_SRGB: [u8; 3] = [5, 5, 5];

/// Bloom on desktop only.
pub const BLOOM_INTENSITY: f32 = 0.3;

/// Viewports narrower than this use the mobile scene layout (pixels).
pub const MOBILE_LAYOUT_WIDTH: f32 = 768.0;

/// Viewports narrower than this use snappier scroll damping and skip bloom.
pub const MOBILE_INPUT_WIDTH: f32 = 1025.0;

/// Scroll damping factors (fraction per 60 Hz frame).
pub const SCROLL_LERP_DESKTOP: f32 = 0.05;
pub const SCROLL_LERP_MOBILE: f32 = 0.1;

/// Native builds have no document; this is the virtual scroll length in pixels.
pub const NATIVE_SCROLL_LENGTH: f32 = 8000.0;

/// Duration of navigation scroll tweens (seconds).
pub const NAV_SCROLL_SECS: f32 = 1.5;

/// Canvas element the wasm build mounts into.
pub const CANVAS_SELECTOR: &str = "#gl-canvas";
