use bevy::prelude::*;

/// Emphasis pulse fired by section navigation.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NavPulse {
    pub intensity: f32,
}

impl Default for NavPulse {
    fn default() -> Self {
        Self { intensity: 1.0 }
    }
}

/// Audio loudness reported by the host page, in `[0, 1]`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioEnergy(f32);

impl AudioEnergy {
    pub fn set(&mut self, energy: f32) {
        self.0 = if energy.is_finite() {
            energy.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Planet scale multiplier the audio reaction eases towards.
    pub fn target_scale(&self) -> f32 {
        1.0 + 0.15 * self.0
    }
}

const PULSE_HALF_SECS: f32 = 0.1;

/// Up-then-down scale envelope: `1 → 1 + 0.3·i` in 0.1 s, back to 1 in 0.1 s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulseEnvelope {
    peak: f32,
    elapsed: Option<f32>,
}

impl PulseEnvelope {
    pub fn trigger(&mut self, intensity: f32) {
        self.peak = 1.0 + 0.3 * intensity.max(0.0);
        self.elapsed = Some(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Advance by `dt` and return the current scale multiplier.
    pub fn tick(&mut self, dt: f32) -> f32 {
        let Some(elapsed) = self.elapsed.as_mut() else {
            return 1.0;
        };
        *elapsed += dt;
        let t = *elapsed;

        if t < PULSE_HALF_SECS {
            1.0 + (self.peak - 1.0) * (t / PULSE_HALF_SECS)
        } else if t < 2.0 * PULSE_HALF_SECS {
            self.peak + (1.0 - self.peak) * ((t - PULSE_HALF_SECS) / PULSE_HALF_SECS)
        } else {
            self.elapsed = None;
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn energy_is_clamped() {
        let mut energy = AudioEnergy::default();
        energy.set(3.0);
        assert_eq!(energy.value(), 1.0);
        assert_relative_eq!(energy.target_scale(), 1.15);
        energy.set(f32::NAN);
        assert_eq!(energy.value(), 0.0);
    }

    #[test]
    fn pulse_peaks_then_returns_to_rest() {
        let mut pulse = PulseEnvelope::default();
        assert_eq!(pulse.tick(0.05), 1.0);

        pulse.trigger(1.0);
        assert_relative_eq!(pulse.tick(0.05), 1.15, epsilon = 1e-4);
        assert_relative_eq!(pulse.tick(0.05), 1.3, epsilon = 1e-4);
        assert_relative_eq!(pulse.tick(0.05), 1.15, epsilon = 1e-4);
        assert_eq!(pulse.tick(0.1), 1.0);
        assert!(!pulse.is_active());
    }
}
