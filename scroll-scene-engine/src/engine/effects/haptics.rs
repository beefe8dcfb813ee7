use bevy::prelude::*;
use constants::haptics::*;

use crate::engine::choreography::driver::ChoreographyFrame;

/// Vibration character for the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HapticMode {
    #[default]
    Neutral,
    /// The archive grid: short mechanical ticks.
    Grid,
    /// The about section: soft swells.
    Immersive,
}

impl HapticMode {
    pub fn for_progress(progress: f32) -> Self {
        let inside = |(low, high): (f32, f32)| progress > low && progress < high;
        if inside(GRID_MODE_RANGE) {
            HapticMode::Grid
        } else if inside(IMMERSIVE_MODE_RANGE) {
            HapticMode::Immersive
        } else {
            HapticMode::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HapticEvent {
    ModeChanged(HapticMode),
    SectionEntered { index: usize, mode: HapticMode },
    ScrollTick,
    ScrollMomentum,
    GridTick { fast: bool },
    ImmersiveSwell,
    NavPulse,
    CardHover,
}

impl HapticEvent {
    /// Vibration pattern in milliseconds (on, off, on, ...).
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            HapticEvent::ModeChanged(_) => LIGHT_TAP,
            HapticEvent::SectionEntered {
                mode: HapticMode::Grid,
                ..
            } => GRID_CLUNK,
            HapticEvent::SectionEntered { .. } => SECTION_ENTER,
            HapticEvent::ScrollTick => SCROLL_TICK,
            HapticEvent::ScrollMomentum => SCROLL_MOMENTUM,
            HapticEvent::GridTick { fast: true } => GRID_TICK_FAST,
            HapticEvent::GridTick { fast: false } => GRID_TICK,
            HapticEvent::ImmersiveSwell => IMMERSIVE_SWELL,
            HapticEvent::NavPulse => HEAVY_TAP,
            HapticEvent::CardHover => CARD_HOVER,
        }
    }
}

/// Receives haptic events. Implementations decide how (or whether) to play them.
pub trait HapticSink: Send + Sync + 'static {
    fn notify(&self, event: HapticEvent);
}

/// Browser vibration through `navigator.vibrate`.
pub struct VibrationSink {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    supported: bool,
}

impl VibrationSink {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let supported = web_sys::window()
                .map(|window| {
                    js_sys::Reflect::has(
                        &window.navigator(),
                        &wasm_bindgen::JsValue::from_str("vibrate"),
                    )
                    .unwrap_or(false)
                })
                .unwrap_or(false);
            Self { supported }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self { supported: false }
        }
    }
}

impl HapticSink for VibrationSink {
    fn notify(&self, event: HapticEvent) {
        #[cfg(target_arch = "wasm32")]
        {
            if !self.supported {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };
            let pattern = js_sys::Array::new();
            for duration in event.pattern() {
                pattern.push(&wasm_bindgen::JsValue::from(*duration));
            }
            window.navigator().vibrate_with_pattern(&pattern);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = event;
        }
    }
}

/// Native builds have no vibration motor; events are logged at debug level.
pub struct LogHapticSink;

impl HapticSink for LogHapticSink {
    fn notify(&self, event: HapticEvent) {
        debug!("Haptic {:?} {:?}", event, event.pattern());
    }
}

#[derive(Resource)]
pub struct HapticFeedback {
    sink: Box<dyn HapticSink>,
    mode: HapticMode,
    last_section: Option<usize>,
    last_tick_ms: Option<f64>,
}

impl HapticFeedback {
    pub fn new(sink: impl HapticSink) -> Self {
        Self {
            sink: Box::new(sink),
            mode: HapticMode::Neutral,
            last_section: None,
            last_tick_ms: None,
        }
    }

    pub fn for_platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(VibrationSink::new())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(LogHapticSink)
        }
    }

    pub fn mode(&self) -> HapticMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: HapticMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.sink.notify(HapticEvent::ModeChanged(mode));
    }

    /// Pulse once when progress lands on a section boundary. The same boundary
    /// does not fire twice in a row.
    pub fn on_scroll_progress(&mut self, progress: f32) {
        let Some(index) = SECTION_BOUNDARIES
            .iter()
            .position(|boundary| (progress - boundary).abs() < SECTION_TOLERANCE)
        else {
            return;
        };
        if self.last_section == Some(index) {
            return;
        }
        self.last_section = Some(index);
        self.sink.notify(HapticEvent::SectionEntered {
            index,
            mode: self.mode,
        });
    }

    /// Throttled scroll ticks; `delta` is the absolute scroll change in pixels.
    pub fn on_scroll_delta(&mut self, delta: f32, now_ms: f64) {
        let delta = delta.abs();
        let throttle = if delta > FAST_SCROLL_DELTA {
            FAST_SCROLL_THROTTLE_MS
        } else {
            SCROLL_THROTTLE_MS
        };
        if let Some(last) = self.last_tick_ms {
            if now_ms - last < throttle {
                return;
            }
        }
        self.last_tick_ms = Some(now_ms);

        let event = match self.mode {
            HapticMode::Grid => Some(HapticEvent::GridTick { fast: delta > 40.0 }),
            HapticMode::Immersive => (delta > 30.0).then_some(HapticEvent::ImmersiveSwell),
            HapticMode::Neutral if delta > 60.0 => Some(HapticEvent::ScrollMomentum),
            HapticMode::Neutral if delta > 20.0 => Some(HapticEvent::ScrollTick),
            HapticMode::Neutral => None,
        };
        if let Some(event) = event {
            self.sink.notify(event);
        }
    }

    pub fn nav_pulse(&self) {
        self.sink.notify(HapticEvent::NavPulse);
    }

    pub fn card_hover(&self) {
        self.sink.notify(HapticEvent::CardHover);
    }
}

/// Only moving scroll produces ticks.
const MIN_TICK_DELTA: f32 = 0.5;

pub fn drive_haptics(
    frame: Res<ChoreographyFrame>,
    time: Res<Time<Real>>,
    mut nav_pulses: EventReader<crate::engine::effects::audio::NavPulse>,
    mut haptics: ResMut<HapticFeedback>,
) {
    if !frame.effects_enabled() {
        nav_pulses.clear();
        return;
    }

    haptics.set_mode(HapticMode::for_progress(frame.progress));
    haptics.on_scroll_progress(frame.progress);
    if frame.velocity.abs() > MIN_TICK_DELTA {
        haptics.on_scroll_delta(frame.velocity, time.elapsed().as_secs_f64() * 1000.0);
    }
    if nav_pulses.read().count() > 0 {
        haptics.nav_pulse();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every event it receives.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink(pub Arc<Mutex<Vec<HapticEvent>>>);

    impl RecordingSink {
        pub(crate) fn events(&self) -> Vec<HapticEvent> {
            self.0.lock().map(|events| events.clone()).unwrap_or_default()
        }
    }

    impl HapticSink for RecordingSink {
        fn notify(&self, event: HapticEvent) {
            if let Ok(mut events) = self.0.lock() {
                events.push(event);
            }
        }
    }

    #[test]
    fn modes_follow_the_section_ranges() {
        assert_eq!(HapticMode::for_progress(0.1), HapticMode::Neutral);
        assert_eq!(HapticMode::for_progress(0.25), HapticMode::Neutral);
        assert_eq!(HapticMode::for_progress(0.3), HapticMode::Grid);
        assert_eq!(HapticMode::for_progress(0.5), HapticMode::Neutral);
        assert_eq!(HapticMode::for_progress(0.6), HapticMode::Immersive);
        assert_eq!(HapticMode::for_progress(0.9), HapticMode::Neutral);
    }

    #[test]
    fn mode_changes_tap_once() {
        let sink = RecordingSink::default();
        let mut haptics = HapticFeedback::new(sink.clone());
        haptics.set_mode(HapticMode::Grid);
        haptics.set_mode(HapticMode::Grid);
        assert_eq!(
            sink.events(),
            vec![HapticEvent::ModeChanged(HapticMode::Grid)]
        );
    }

    #[test]
    fn section_boundaries_fire_once_per_new_boundary() {
        let sink = RecordingSink::default();
        let mut haptics = HapticFeedback::new(sink.clone());
        haptics.on_scroll_progress(0.0);
        haptics.on_scroll_progress(0.002);
        haptics.on_scroll_progress(0.1);
        haptics.on_scroll_progress(0.268);
        haptics.on_scroll_progress(0.27);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            HapticEvent::SectionEntered {
                index: 1,
                mode: HapticMode::Neutral
            }
        );
    }

    #[test]
    fn grid_section_entry_uses_the_clunk() {
        let event = HapticEvent::SectionEntered {
            index: 1,
            mode: HapticMode::Grid,
        };
        assert_eq!(event.pattern(), GRID_CLUNK);
    }

    #[test]
    fn scroll_ticks_are_throttled_by_speed() {
        let sink = RecordingSink::default();
        let mut haptics = HapticFeedback::new(sink.clone());

        haptics.on_scroll_delta(30.0, 0.0);
        haptics.on_scroll_delta(30.0, 100.0);
        haptics.on_scroll_delta(30.0, 130.0);
        assert_eq!(sink.events().len(), 2);

        haptics.on_scroll_delta(80.0, 200.0);
        assert_eq!(sink.events().last(), Some(&HapticEvent::ScrollMomentum));
    }

    #[test]
    fn slow_immersive_scrolling_stays_silent() {
        let sink = RecordingSink::default();
        let mut haptics = HapticFeedback::new(sink.clone());
        haptics.set_mode(HapticMode::Immersive);
        haptics.on_scroll_delta(10.0, 0.0);
        haptics.on_scroll_delta(45.0, 500.0);
        assert_eq!(
            sink.events(),
            vec![
                HapticEvent::ModeChanged(HapticMode::Immersive),
                HapticEvent::ImmersiveSwell,
            ]
        );
    }
}
