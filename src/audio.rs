//! Audio-reactive input
//!
//! The canvas reacts to a normalized amplitude signal rather than owning a
//! capture pipeline. Whatever feeds the amplitude (a mic meter, a test, a
//! demo oscillator) writes it here; everything downstream reads a single
//! `volume` value that is zero whenever the input is inactive.

use crate::config::audio;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioInput {
    pub active: bool,
    /// Latest normalized amplitude in [0, 1]
    #[serde(skip)]
    pub amplitude: f32,
    pub sensitivity: f32,
    /// Sequenced playback pulse on the particle ensemble
    pub ensemble: bool,
}

impl Default for AudioInput {
    fn default() -> Self {
        Self {
            active: false,
            amplitude: 0.0,
            sensitivity: audio::DEFAULT_SENSITIVITY,
            ensemble: false,
        }
    }
}

impl AudioInput {
    /// Effective volume driving the field, jitter, and render scale.
    pub fn volume(&self) -> f32 {
        if self.active {
            (self.amplitude * self.sensitivity).max(0.0)
        } else {
            0.0
        }
    }

    pub fn feed(&mut self, amplitude: f32) {
        self.amplitude = amplitude.clamp(0.0, 1.0);
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
        if !self.active {
            self.amplitude = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_zero_when_inactive() {
        let mut input = AudioInput::default();
        input.feed(0.8);
        assert_eq!(input.volume(), 0.0);

        input.active = true;
        assert!((input.volume() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_sensitivity_scales_volume() {
        let mut input = AudioInput {
            active: true,
            sensitivity: 2.5,
            ..AudioInput::default()
        };
        input.feed(0.2);
        assert!((input.volume() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_feed_clamps_amplitude() {
        let mut input = AudioInput::default();
        input.feed(3.0);
        assert_eq!(input.amplitude, 1.0);
        input.feed(-1.0);
        assert_eq!(input.amplitude, 0.0);
    }

    #[test]
    fn test_toggle_off_drops_amplitude() {
        let mut input = AudioInput::default();
        input.toggle();
        input.feed(0.6);
        input.toggle();
        assert_eq!(input.amplitude, 0.0);
        assert!(!input.active);
    }
}
