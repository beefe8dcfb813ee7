use bevy::prelude::*;
use constants::camera_path::SEGMENT_BOUNDARIES;
use constants::loading::IGNITION_LOCK_SECS;
use constants::render_settings::NATIVE_SCROLL_LENGTH;

use crate::engine::choreography::camera_path::{Curve, sanitise_progress};
use crate::engine::choreography::driver::DriverSet;
use crate::engine::core::device::DeviceProfile;

/// Below this distance the smoothed offset snaps onto its target.
const SNAP_PX: f32 = 0.5;

/// Smoothed scroll state handed to the choreography each frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollProgress {
    pub progress: f32,
    /// Smoothed offset change since the previous frame, in pixels.
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollTween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

/// Damped scroll offset in pixels with optional eased jumps.
#[derive(Resource, Debug, Clone)]
pub struct ScrollSmoother {
    target: f32,
    current: f32,
    max_scroll: f32,
    lerp: f32,
    locked_for: f32,
    tween: Option<ScrollTween>,
}

impl ScrollSmoother {
    pub fn new(max_scroll: f32, lerp: f32) -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            max_scroll: max_scroll.max(0.0),
            lerp,
            locked_for: 0.0,
            tween: None,
        }
    }

    pub fn offset(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn max_scroll(&self) -> f32 {
        self.max_scroll
    }

    pub fn is_locked(&self) -> bool {
        self.locked_for > 0.0
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    /// Ignore all scroll input for `secs`.
    pub fn lock_for(&mut self, secs: f32) {
        self.locked_for = secs.max(0.0);
    }

    pub fn set_lerp(&mut self, lerp: f32) {
        self.lerp = lerp;
    }

    pub fn set_max_scroll(&mut self, max_scroll: f32) {
        self.max_scroll = max_scroll.max(0.0);
        self.target = self.target.clamp(0.0, self.max_scroll);
        self.current = self.current.clamp(0.0, self.max_scroll);
    }

    /// Absolute target offset, e.g. the page scroll position. Cancels a running tween.
    pub fn set_target(&mut self, offset: f32) {
        if self.is_locked() {
            return;
        }
        self.tween = None;
        self.target = offset.clamp(0.0, self.max_scroll);
    }

    /// Relative move from wheel or keys. Cancels a running tween.
    pub fn nudge(&mut self, delta: f32) {
        if self.is_locked() {
            return;
        }
        self.tween = None;
        self.target = (self.target + delta).clamp(0.0, self.max_scroll);
    }

    /// Eased jump to `progress`. A non-positive duration jumps immediately.
    /// Returns `false` while input is locked.
    pub fn scroll_to_progress(&mut self, progress: f32, duration: f32) -> bool {
        if self.is_locked() {
            return false;
        }
        let to = sanitise_progress(progress) * self.max_scroll;
        if duration <= 0.0 {
            self.tween = None;
            self.target = to;
            self.current = to;
        } else {
            self.tween = Some(ScrollTween {
                from: self.current,
                to,
                duration,
                elapsed: 0.0,
            });
        }
        true
    }

    pub fn step(&mut self, dt: f32) -> ScrollProgress {
        self.locked_for = (self.locked_for - dt).max(0.0);
        let previous = self.current;

        if let Some(mut tween) = self.tween {
            tween.elapsed += dt;
            let t = (tween.elapsed / tween.duration).min(1.0);
            self.current = tween.from + (tween.to - tween.from) * Curve::EaseOutCubic.apply(t);
            self.target = self.current;
            self.tween = (t < 1.0).then_some(tween);
        } else {
            let alpha = 1.0 - (-self.lerp * 60.0 * dt).exp();
            self.current += (self.target - self.current) * alpha;
            if (self.target - self.current).abs() < SNAP_PX {
                self.current = self.target;
            }
        }

        ScrollProgress {
            progress: self.progress(),
            velocity: self.current - previous,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.max_scroll > 0.0 {
            (self.current / self.max_scroll).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for ScrollSmoother {
    fn default() -> Self {
        Self::new(NATIVE_SCROLL_LENGTH, DeviceProfile::default().scroll_lerp())
    }
}

/// Offsets further than this from the last written position count as user scrolling.
const PAGE_DRIFT_PX: f32 = 2.0;

/// Keeps the browser page and the smoother in step while a tween drives the page.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PageScrollSync {
    written: Option<f32>,
}

impl PageScrollSync {
    /// Feeds the page offset read at the start of a frame into the smoother.
    pub fn read(&mut self, smoother: &mut ScrollSmoother, page_offset: f32) {
        if !smoother.is_tweening() {
            self.written = None;
            smoother.set_target(page_offset);
            return;
        }
        match self.written {
            Some(written) if (page_offset - written).abs() > PAGE_DRIFT_PX => {
                self.written = None;
                smoother.set_target(page_offset);
            }
            _ => {}
        }
    }

    /// Offset to write back to the page after the smoother stepped, if any.
    /// The landing position of a finished tween is written once.
    pub fn write(&mut self, smoother: &ScrollSmoother) -> Option<f32> {
        if smoother.is_tweening() {
            self.written = Some(smoother.offset());
            self.written
        } else {
            self.written.take().map(|_| smoother.offset())
        }
    }
}

/// Section start progress for digit key `n` (1-based).
pub fn section_start(section: usize) -> Option<f32> {
    SEGMENT_BOUNDARIES[..SEGMENT_BOUNDARIES.len() - 1]
        .get(section.checked_sub(1)?)
        .copied()
}

pub struct ScrollInputPlugin;

impl Plugin for ScrollInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScrollSmoother>()
            .init_resource::<ScrollProgress>()
            .add_systems(Startup, configure_scroll_source);

        #[cfg(target_arch = "wasm32")]
        app.init_resource::<PageScrollSync>().add_systems(
            Update,
            (
                read_page_scroll,
                step_scroll_smoother,
                write_page_scroll,
                release_page_lock,
            )
                .chain()
                .in_set(DriverSet::Input),
        );

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(
            Update,
            (native::read_scroll_input, step_scroll_smoother)
                .chain()
                .in_set(DriverSet::Input),
        );
    }
}

fn configure_scroll_source(profile: Res<DeviceProfile>, mut smoother: ResMut<ScrollSmoother>) {
    smoother.set_lerp(profile.scroll_lerp());
    smoother.lock_for(IGNITION_LOCK_SECS);

    #[cfg(target_arch = "wasm32")]
    {
        smoother.set_max_scroll(page::max_scroll().unwrap_or(0.0));
        page::set_overflow_locked(true);
    }

    info!(
        "Scroll source ready ({:?}, max scroll {} px, locked for {} s)",
        *profile,
        smoother.max_scroll(),
        IGNITION_LOCK_SECS
    );
}

pub fn step_scroll_smoother(
    time: Res<Time>,
    mut smoother: ResMut<ScrollSmoother>,
    mut progress: ResMut<ScrollProgress>,
) {
    let next = smoother.step(time.delta_secs());
    progress.set_if_neq(next);
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
    use bevy::prelude::*;
    use constants::render_settings::NAV_SCROLL_SECS;

    use super::{ScrollSmoother, section_start};
    use crate::engine::effects::audio::NavPulse;

    /// Pixels per wheel "line".
    const WHEEL_LINE_PX: f32 = 100.0;
    const ARROW_STEP_PX: f32 = 100.0;
    const PAGE_STEP_PX: f32 = 800.0;

    pub fn read_scroll_input(
        mut wheel_events: EventReader<MouseWheel>,
        keys: Res<ButtonInput<KeyCode>>,
        mut smoother: ResMut<ScrollSmoother>,
        mut nav_pulses: EventWriter<NavPulse>,
    ) {
        for event in wheel_events.read() {
            let delta = match event.unit {
                MouseScrollUnit::Line => event.y * WHEEL_LINE_PX,
                MouseScrollUnit::Pixel => event.y,
            };
            // Wheel up scrolls back towards the top.
            smoother.nudge(-delta);
        }

        if keys.just_pressed(KeyCode::ArrowDown) {
            smoother.nudge(ARROW_STEP_PX);
        }
        if keys.just_pressed(KeyCode::ArrowUp) {
            smoother.nudge(-ARROW_STEP_PX);
        }
        if keys.just_pressed(KeyCode::PageDown) || keys.just_pressed(KeyCode::Space) {
            smoother.nudge(PAGE_STEP_PX);
        }
        if keys.just_pressed(KeyCode::PageUp) {
            smoother.nudge(-PAGE_STEP_PX);
        }
        if keys.just_pressed(KeyCode::Home) {
            smoother.scroll_to_progress(0.0, NAV_SCROLL_SECS);
        }
        if keys.just_pressed(KeyCode::End) {
            smoother.scroll_to_progress(1.0, NAV_SCROLL_SECS);
        }

        let sections = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
        ];
        for (index, key) in sections.into_iter().enumerate() {
            if !keys.just_pressed(key) {
                continue;
            }
            if let Some(start) = section_start(index + 1) {
                if smoother.scroll_to_progress(start, NAV_SCROLL_SECS) {
                    nav_pulses.write(NavPulse::default());
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn read_page_scroll(mut smoother: ResMut<ScrollSmoother>, mut sync: ResMut<PageScrollSync>) {
    if let Some(max_scroll) = page::max_scroll() {
        if (max_scroll - smoother.max_scroll()).abs() > 1.0 {
            smoother.set_max_scroll(max_scroll);
        }
    }

    if let Some(offset) = page::scroll_offset() {
        sync.read(&mut smoother, offset);
    }
}

#[cfg(target_arch = "wasm32")]
fn write_page_scroll(smoother: Res<ScrollSmoother>, mut sync: ResMut<PageScrollSync>) {
    if let Some(offset) = sync.write(&smoother) {
        page::scroll_to(offset);
    }
}

#[cfg(target_arch = "wasm32")]
fn release_page_lock(smoother: Res<ScrollSmoother>, mut released: Local<bool>) {
    if !*released && !smoother.is_locked() {
        page::set_overflow_locked(false);
        *released = true;
        info!("Scroll input unlocked");
    }
}

#[cfg(target_arch = "wasm32")]
mod page {
    pub fn scroll_offset() -> Option<f32> {
        web_sys::window()?.scroll_y().ok().map(|y| y as f32)
    }

    pub fn max_scroll() -> Option<f32> {
        let window = web_sys::window()?;
        let body = window.document()?.body()?;
        let inner_height = window.inner_height().ok()?.as_f64()?;
        Some((body.scroll_height() as f64 - inner_height).max(0.0) as f32)
    }

    pub fn scroll_to(offset: f32) {
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(0.0, offset as f64);
        }
    }

    pub fn set_overflow_locked(locked: bool) {
        let Some(body) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.body())
        else {
            return;
        };
        let value = if locked { "hidden" } else { "" };
        if let Err(err) = body.style().set_property("overflow", value) {
            bevy::log::warn!("Failed to toggle page scroll lock: {:?}", err);
        }
    }
}
