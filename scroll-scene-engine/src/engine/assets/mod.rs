//! Runtime configuration assets.

/// Scene manifest: model paths, city hotspots, satellite fleet and starfield size.
pub mod scene_manifest;
