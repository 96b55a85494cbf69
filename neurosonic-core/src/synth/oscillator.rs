//! Tone source whose pitch, level, and timbre follow the EEG parameters.

use super::{SoundParameters, SoundSource};
use std::f64::consts::TAU;

/// Phase-accumulating oscillator with a sine-to-sawtooth brightness blend.
///
/// Phase carries across blocks so frequency changes between control
/// ticks are glitch-free. A blink trigger superimposes a short
/// percussive click at the start of the block.
#[derive(Debug)]
pub struct OscillatorSource {
    sample_rate: usize,
    phase: f64,
}

/// Click overlay length in seconds.
const CLICK_SECS: f64 = 0.01;
/// Click carrier frequency in Hz.
const CLICK_FREQ_HZ: f64 = 1000.0;
/// Click envelope decay rate (1/s).
const CLICK_DECAY: f64 = 50.0;

impl OscillatorSource {
    pub fn new(sample_rate: usize) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
        }
    }
}

impl SoundSource for OscillatorSource {
    fn generate(&mut self, params: &SoundParameters, n_frames: usize) -> Vec<f64> {
        let rate = self.sample_rate as f64;
        let phase_inc = TAU * params.base_frequency / rate;
        let brightness = params.brightness.clamp(0.0, 1.0);

        let mut tone = Vec::with_capacity(n_frames);
        for _ in 0..n_frames {
            let sine = self.phase.sin();
            let saw = 2.0 * (self.phase / TAU).fract() - 1.0;
            tone.push((1.0 - brightness) * sine + brightness * saw);

            self.phase += phase_inc;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }

        if params.blink_trigger > 0.01 {
            let click_len = n_frames.min((CLICK_SECS * rate) as usize);
            for (i, sample) in tone.iter_mut().enumerate().take(click_len) {
                let t = i as f64 / rate;
                let click =
                    params.blink_trigger * (TAU * CLICK_FREQ_HZ * t).sin() * (-t * CLICK_DECAY).exp();
                *sample += click;
            }
        }

        for sample in &mut tone {
            *sample *= params.amplitude;
        }
        tone
    }
}
