//! App wiring: construction, the boot state machine and platform setup.

/// Builds the Bevy app with every engine plugin.
pub mod app_setup;

/// Top-level lifecycle states.
pub mod app_state;

/// Boot preconditions and the fatal error overlay.
pub mod boot;

/// Viewport class captured at boot.
pub mod device;

/// Window and default plugin configuration.
pub mod window_config;
