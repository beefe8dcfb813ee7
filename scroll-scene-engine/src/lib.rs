//! Scroll-driven cinematic scene engine.
//!
//! A single continuous 3D scene (planet, city, jets, satellites, starfield and
//! project cards) is choreographed against a normalised scroll progress in
//! `[0, 1]`. The choreography core lives in [`engine::choreography`]; the
//! sub-scenes it coordinates live in [`engine::scene`].

pub mod engine;
pub mod rpc;

pub use engine::core::app_setup::create_app;

use engine::core::boot;

/// Verify the boot preconditions, then build and run the app.
///
/// A failed precondition is fatal: it is reported to the user and the frame
/// loop never starts.
pub fn run() {
    match boot::preflight() {
        Ok(()) => {
            let mut app = create_app();
            app.run();
        }
        Err(err) => boot::report_preflight_failure(&err),
    }
}
