//! Feedback layered on top of the choreography. None of it feeds back into
//! the camera or visibility, and all of it is muted during warmup.

/// Host-supplied audio energy and navigation pulses.
pub mod audio;

/// Situational vibration feedback behind an injectable sink.
pub mod haptics;

/// Screen-space overlay parameters and the section HUD.
pub mod cinematic;

use bevy::prelude::*;

use crate::engine::choreography::driver::DriverSet;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<audio::NavPulse>()
            .init_resource::<audio::AudioEnergy>()
            .init_resource::<cinematic::CinematicOverlay>()
            .init_resource::<cinematic::SectionHud>()
            .insert_resource(haptics::HapticFeedback::for_platform())
            .add_systems(
                Update,
                (
                    haptics::drive_haptics,
                    cinematic::drive_cinematic_overlay,
                    cinematic::drive_section_hud,
                )
                    .chain()
                    .in_set(DriverSet::Effects),
            );
    }
}
