use bevy::prelude::*;

/// `Booting → Loading → Warmup → Running`, or `Failed` from boot.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Booting,
    /// Manifest and sub-scenes loading in chain order.
    Loading,
    /// Offscreen pre-render pass before the site is interactive.
    Warmup,
    Running,
    /// Boot failed. The driver never runs.
    Failed,
}
