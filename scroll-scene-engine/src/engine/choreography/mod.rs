//! Scroll-to-scene choreography.
//!
//! Everything here is a function of scroll progress. The camera path and the
//! visibility table are pure; the driver applies them to the world once per
//! frame in a fixed order.

/// Named camera anchors inside the city model and their per-frame snapshot.
pub mod waypoints;

/// Piecewise camera path over scroll progress.
pub mod camera_path;

/// Per sub-scene visibility, opacity and depth-write state.
pub mod visibility;

/// One-shot GPU warmup before handing control to the user.
pub mod warmup;

/// System sets and the per-frame driver.
pub mod driver;
