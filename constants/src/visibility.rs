/// Planet stays in the scene graph below this progress.
pub const PLANET_VISIBLE_BELOW: f32 = 0.15;

/// Planet fade starts here...
pub const PLANET_FADE_START: f32 = 0.05;

/// ...and reaches zero opacity here.
pub const PLANET_FADE_END: f32 = 0.12;

/// Above this opacity the planet is treated as a solid, depth-writing object.
pub const PLANET_SOLID_OPACITY: f32 = 0.95;

/// Planet flythrough: Z travel over `[0, PLANET_VISIBLE_BELOW]`.
pub const PLANET_Z_START: f32 = -30.0;
pub const PLANET_Z_END: f32 = 20.0;

/// City becomes visible above this progress.
pub const CITY_VISIBLE_ABOVE: f32 = 0.05;

/// City appearance ramp, fully solid by `CITY_APPEAR_START + CITY_APPEAR_SPAN`.
pub const CITY_APPEAR_START: f32 = 0.05;
pub const CITY_APPEAR_SPAN: f32 = 0.15;

/// Jets fly once the city appearance factor exceeds this.
pub const JETS_APPEARANCE_THRESHOLD: f32 = 0.1;

/// Satellites are hidden once progress reaches this value.
pub const SATELLITES_VISIBLE_BELOW: f32 = 0.10;

/// Project cards live inside the archive section.
pub const CARDS_VISIBLE_FROM: f32 = 0.27;
pub const CARDS_VISIBLE_UNTIL: f32 = 0.5;

/// Local section progress where the cards start to disintegrate.
pub const CARDS_DISINTEGRATE_FROM: f32 = 0.5;
