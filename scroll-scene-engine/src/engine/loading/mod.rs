//! Staged loading: manifest, then planet, then city, then the orbital
//! sub-scenes, then warmup. Each stage starts once the previous one has
//! settled (loaded or failed).

/// Scene manifest loading with fallback to compiled defaults.
pub mod manifest_loader;

/// Loading flags, phases and the milestones reported to the host page.
pub mod progress;

/// Load chain sequencing between sub-scenes.
pub mod chain;
