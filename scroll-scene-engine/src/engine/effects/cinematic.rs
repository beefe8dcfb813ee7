use bevy::prelude::*;
use serde::Serialize;
use std::f32::consts::{PI, TAU};

use super::audio::NavPulse;
use crate::engine::choreography::camera_path::segment_index;
use crate::engine::choreography::driver::ChoreographyFrame;
use crate::rpc::web_rpc::WebRpcInterface;

const PULSE_DECAY_SECS: f32 = 1.1;
const PULSE_MAX: f32 = 1.4;
/// Changes smaller than this are not re-published.
const PUBLISH_EPSILON: f32 = 1e-3;

/// Overlay parameters consumed by the host page's CSS layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub brightness: f32,
    pub halo: f32,
    pub drift: f32,
    /// Light source position in percent of the viewport.
    pub x: f32,
    pub y: f32,
    pub pulse: f32,
}

impl OverlayFrame {
    fn differs_from(&self, other: &OverlayFrame) -> bool {
        [
            self.brightness - other.brightness,
            self.halo - other.halo,
            self.drift - other.drift,
            self.x - other.x,
            self.y - other.y,
            self.pulse - other.pulse,
        ]
        .iter()
        .any(|delta| delta.abs() > PUBLISH_EPSILON)
    }
}

pub fn overlay_frame(progress: f32, velocity: f32, now_ms: f64) -> OverlayFrame {
    let speed = (velocity.abs() / 2000.0).min(0.9);
    // Keep the phase small before narrowing so the sine stays precise.
    let slow = ((now_ms * 0.0004) % std::f64::consts::TAU) as f32;
    let sway = ((now_ms * 0.0006) % std::f64::consts::TAU) as f32;

    OverlayFrame {
        brightness: (0.05 + progress * 0.4 + speed * 0.2).clamp(0.0, 0.85),
        halo: (progress * 0.35 + speed * 0.18).clamp(0.0, 0.65),
        drift: 0.35 + 0.18 * (slow + progress * TAU).sin(),
        x: 40.0 + 12.0 * sway.sin(),
        y: 47.0 + 10.0 * (progress * PI).cos(),
        pulse: 0.0,
    }
}

/// Expo-out decay of the navigation pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulseDecay {
    start: f32,
    elapsed: f32,
}

impl PulseDecay {
    pub fn value(&self) -> f32 {
        if self.elapsed >= PULSE_DECAY_SECS {
            0.0
        } else {
            self.start * 2f32.powf(-10.0 * self.elapsed / PULSE_DECAY_SECS)
        }
    }

    pub fn trigger(&mut self, intensity: f32) {
        self.start = self.value().max(intensity.min(PULSE_MAX));
        self.elapsed = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

#[derive(Resource, Debug, Default)]
pub struct CinematicOverlay {
    pub pulse: PulseDecay,
    last_sent: Option<OverlayFrame>,
}

impl CinematicOverlay {
    /// Returns the frame when it should be published.
    pub fn update(&mut self, mut frame: OverlayFrame) -> Option<OverlayFrame> {
        frame.pulse = self.pulse.value();
        if self
            .last_sent
            .is_some_and(|last| !frame.differs_from(&last))
        {
            return None;
        }
        self.last_sent = Some(frame);
        Some(frame)
    }
}

pub fn drive_cinematic_overlay(
    frame: Res<ChoreographyFrame>,
    time: Res<Time<Real>>,
    mut nav_pulses: EventReader<NavPulse>,
    mut overlay: ResMut<CinematicOverlay>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    overlay.pulse.tick(time.delta_secs());
    for pulse in nav_pulses.read() {
        overlay.pulse.trigger(pulse.intensity);
    }
    if !frame.effects_enabled() {
        return;
    }

    let now_ms = time.elapsed().as_secs_f64() * 1000.0;
    if let Some(published) = overlay.update(overlay_frame(frame.progress, frame.velocity, now_ms))
    {
        rpc.send_notification(
            "cinematic_overlay",
            serde_json::json!({
                "brightness": published.brightness,
                "halo": published.halo,
                "drift": published.drift,
                "x": published.x,
                "y": published.y,
                "pulse": published.pulse,
            }),
        );
    }
}

/// Section label overlay: hidden over the planet approach, shown afterwards.
#[derive(Resource, Debug, Default)]
pub struct SectionHud {
    visible: Option<bool>,
}

impl SectionHud {
    pub fn visible_for(progress: f32) -> bool {
        segment_index(progress) > 0
    }

    /// Returns the new visibility when it changed.
    pub fn update(&mut self, progress: f32) -> Option<bool> {
        let visible = Self::visible_for(progress);
        if self.visible == Some(visible) {
            return None;
        }
        self.visible = Some(visible);
        Some(visible)
    }
}

pub fn drive_section_hud(
    frame: Res<ChoreographyFrame>,
    mut hud: ResMut<SectionHud>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if !frame.effects_enabled() {
        return;
    }
    if let Some(visible) = hud.update(frame.progress) {
        debug!("Section HUD visible: {}", visible);
        rpc.send_notification("section_hud", serde_json::json!({ "visible": visible }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn overlay_brightens_along_the_path() {
        let start = overlay_frame(0.0, 0.0, 0.0);
        assert_relative_eq!(start.brightness, 0.05);
        assert_relative_eq!(start.halo, 0.0);
        assert_relative_eq!(start.x, 40.0);
        assert_relative_eq!(start.y, 57.0);

        let end = overlay_frame(1.0, 0.0, 0.0);
        assert_relative_eq!(end.brightness, 0.45);
        assert_relative_eq!(end.halo, 0.35);
        assert_relative_eq!(end.y, 37.0, epsilon = 1e-4);
    }

    #[test]
    fn overlay_values_are_clamped_at_high_speed() {
        let frame = overlay_frame(1.0, -1.0e6, 12_345.0);
        assert_relative_eq!(frame.brightness, 0.05 + 0.4 + 0.9 * 0.2, epsilon = 1e-5);
        assert!(frame.brightness <= 0.85);
        assert!(frame.halo <= 0.65);
        assert!((0.17..=0.53).contains(&frame.drift));
    }

    #[test]
    fn pulse_accumulates_and_decays() {
        let mut pulse = PulseDecay::default();
        assert_eq!(pulse.value(), 0.0);
        pulse.trigger(3.0);
        assert_eq!(pulse.value(), PULSE_MAX);

        pulse.tick(0.55);
        let half_way = pulse.value();
        assert!(half_way < 0.05);

        pulse.trigger(0.01);
        assert_eq!(pulse.value(), half_way);

        pulse.tick(PULSE_DECAY_SECS);
        assert_eq!(pulse.value(), 0.0);
    }

    #[test]
    fn unchanged_frames_are_not_republished() {
        let mut overlay = CinematicOverlay::default();
        let frame = overlay_frame(0.3, 0.0, 1000.0);
        assert!(overlay.update(frame).is_some());
        assert!(overlay.update(frame).is_none());
        assert!(overlay.update(overlay_frame(0.4, 0.0, 1000.0)).is_some());
    }

    #[test]
    fn hud_is_hidden_on_the_planet_approach_only() {
        let mut hud = SectionHud::default();
        assert_eq!(hud.update(0.1), Some(false));
        assert_eq!(hud.update(0.2), None);
        assert_eq!(hud.update(0.27), Some(true));
        assert_eq!(hud.update(0.9), None);
        assert_eq!(hud.update(0.0), Some(false));
    }
}
