//! Engine modules: app wiring, choreography core, input, loading and sub-scenes.

/// App construction, state machine, boot checks and window configuration.
pub mod core;

/// Scroll-to-scene choreography: waypoints, camera path, visibility, warmup and
/// the per-frame driver.
pub mod choreography;

/// Scroll progress source and pointer tracking.
pub mod input;

/// Staged loading pipeline and progress milestones.
pub mod loading;

/// Runtime scene manifest.
pub mod assets;

/// Independently loaded sub-scenes and the scene camera.
pub mod scene;

/// Auxiliary feedback: haptics, cinematic overlay and audio-reactive pulses.
pub mod effects;
