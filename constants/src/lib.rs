//! Hand-authored constants shared by the scene engine.
//!
//! The camera path, visibility thresholds and loading milestones are narrative
//! content. They are kept here as explicit tables instead of being derived from
//! asset data.

pub mod camera_path;
pub mod haptics;
pub mod loading;
pub mod render_settings;
pub mod scene_layout;
pub mod visibility;
