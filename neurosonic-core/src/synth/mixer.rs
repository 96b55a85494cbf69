//! Mixer: sums sound sources with per-source gains and soft-clips.

use super::{SoundParameters, SoundSource};

/// Sums registered sources and applies a tanh soft clip.
///
/// The soft clip bounds the output in (-1, 1) without the hard edges a
/// plain clamp would add to the waveform.
pub struct Mixer {
    master_volume: f64,
    sources: Vec<(Box<dyn SoundSource>, f64)>,
}

impl Mixer {
    pub fn new(master_volume: f64) -> Self {
        Self {
            master_volume,
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: Box<dyn SoundSource>, gain: f64) {
        self.sources.push((source, gain));
    }

    /// Generate one mixed mono block of `n_frames` samples in [-1, 1].
    pub fn generate(&mut self, params: &SoundParameters, n_frames: usize) -> Vec<f32> {
        let mut mixed = vec![0.0f64; n_frames];

        for (source, gain) in &mut self.sources {
            let block = source.generate(params, n_frames);
            for (acc, sample) in mixed.iter_mut().zip(block.iter()) {
                *acc += sample * *gain;
            }
        }

        mixed
            .into_iter()
            .map(|x| (x * self.master_volume).tanh() as f32)
            .collect()
    }
}
