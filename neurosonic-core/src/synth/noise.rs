//! Noise source shaped by gamma power, with a clench burst overlay.

use super::{SoundParameters, SoundSource};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Base scaling applied to the gamma-driven noise gain.
const GAMMA_LEVEL: f64 = 0.3;
/// Clench burst overlay length in seconds.
const BURST_SECS: f64 = 0.02;
/// Clench burst envelope decay rate (1/s).
const BURST_DECAY: f64 = 30.0;

/// Gaussian noise whose level follows gamma power.
///
/// A clench trigger overlays a short exponential burst and floors the
/// output level at half the trigger value, so a clench is audible even
/// over a quiet gamma background. The generator is seeded, so a given
/// session produces a reproducible noise stream.
#[derive(Debug)]
pub struct NoiseSource {
    sample_rate: usize,
    rng: ChaCha8Rng,
}

impl NoiseSource {
    pub fn new(sample_rate: usize) -> Self {
        Self::with_seed(sample_rate, 42)
    }

    pub fn with_seed(sample_rate: usize, seed: u64) -> Self {
        Self {
            sample_rate,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl SoundSource for NoiseSource {
    fn generate(&mut self, params: &SoundParameters, n_frames: usize) -> Vec<f64> {
        let rate = self.sample_rate as f64;
        let mut noise: Vec<f64> = (0..n_frames)
            .map(|_| self.rng.sample(StandardNormal))
            .collect();

        let mut level = params.noise_gain * GAMMA_LEVEL;

        if params.clench_trigger > 0.01 {
            let burst_len = n_frames.min((BURST_SECS * rate) as usize);
            for (i, sample) in noise.iter_mut().enumerate().take(burst_len) {
                let t = i as f64 / rate;
                let envelope = params.clench_trigger * (-t * BURST_DECAY).exp();
                *sample += *sample * envelope;
            }
            level = level.max(params.clench_trigger * 0.5);
        }

        for sample in &mut noise {
            *sample *= level;
        }
        noise
    }
}
