//! Sound synthesis side: the parameter bridge record, audio sources,
//! the mixer, and the audio sink seam.

mod mixer;
mod noise;
mod oscillator;
pub mod output;

pub use mixer::Mixer;
pub use noise::NoiseSource;
pub use oscillator::OscillatorSource;
pub use output::{AudioSink, BlockQueueSink};

/// Bridge record between EEG processing and the sound engine.
///
/// Written each control tick by the parameter mapper (continuous side)
/// and by the event handler (trigger side); read by the audio sources.
/// Band weights are normalized to [0, 1] and sum to at most 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundParameters {
    // Normalized band powers
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
    pub gamma: f64,

    // Derived parameters
    /// Output amplitude in [0.05, 0.9], driven by alpha power.
    pub amplitude: f64,
    /// Oscillator frequency in the configured range, driven by the
    /// beta/alpha ratio.
    pub base_frequency: f64,
    /// Sine-to-sawtooth blend in [0, 1], driven by theta.
    pub brightness: f64,
    /// Noise level in [0, 1], driven by gamma.
    pub noise_gain: f64,

    // Event triggers
    /// Blink one-shot in [0, 1]; decays over ~200 ms.
    pub blink_trigger: f64,
    /// Clench one-shot in [0, 1]; decays over ~300 ms.
    pub clench_trigger: f64,
    /// Held high for the duration of an alpha burst.
    pub alpha_state: bool,
}

impl Default for SoundParameters {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: 0.0,
            theta: 0.0,
            delta: 0.0,
            gamma: 0.0,
            amplitude: 0.3,
            base_frequency: 220.0,
            brightness: 0.1,
            noise_gain: 0.05,
            blink_trigger: 0.0,
            clench_trigger: 0.0,
            alpha_state: false,
        }
    }
}

/// Generates mono audio from the current sound parameters.
pub trait SoundSource: Send {
    /// Produce `n_frames` of audio. Outputs combine linearly in the
    /// mixer, so a source should stay within roughly [-1, 1].
    fn generate(&mut self, params: &SoundParameters, n_frames: usize) -> Vec<f64>;
}
