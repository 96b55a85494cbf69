//! Maps band powers and detected events onto the sound parameters.

use crate::dsp::{compute_band_powers, normalize_band_powers, ALL_BANDS};
use crate::events::{Event, EventType};
use crate::protocol::{Channel, SAMPLE_RATE};
use crate::store::SampleStore;
use crate::synth::SoundParameters;

/// Seconds of AF7 used for the continuous band-power estimate.
const CONTINUOUS_WINDOW_SECS: f64 = 2.0;

/// Triggers below this are clipped to zero instead of decaying forever.
const TRIGGER_FLOOR: f64 = 0.01;

/// Sole writer of the continuous and decaying parts of
/// [`SoundParameters`]; the event side is applied by the bus handler
/// through [`ParameterMapper::apply_event`].
#[derive(Debug, Clone)]
pub struct ParameterMapper {
    freq_lo: f64,
    freq_hi: f64,
    blink_decay_secs: f64,
    clench_decay_secs: f64,
}

impl ParameterMapper {
    pub fn new(
        base_frequency_range_hz: (f64, f64),
        blink_decay_secs: f64,
        clench_decay_secs: f64,
    ) -> Self {
        let (freq_lo, freq_hi) = base_frequency_range_hz;
        Self {
            freq_lo,
            freq_hi,
            blink_decay_secs,
            clench_decay_secs,
        }
    }

    /// Trigger side: one-shot and sustained flags set by events.
    pub fn apply_event(params: &mut SoundParameters, event: &Event) {
        match event.event_type {
            EventType::Blink => params.blink_trigger = 1.0,
            EventType::Clench => params.clench_trigger = 1.0,
            EventType::AlphaBurstStart => params.alpha_state = true,
            EventType::AlphaBurstEnd => params.alpha_state = false,
        }
    }

    /// Continuous side: band powers → normalized weights → derived
    /// parameters. Skips the tick when less than one second of AF7 is
    /// buffered; with identical inputs and no events the update is
    /// idempotent.
    pub fn update_continuous(&self, params: &mut SoundParameters, store: &SampleStore) {
        let window = store.window(Channel::Af7, CONTINUOUS_WINDOW_SECS);
        if window.len() < SAMPLE_RATE {
            return;
        }

        let powers = compute_band_powers(&window, SAMPLE_RATE, &ALL_BANDS);
        let norm = normalize_band_powers(&powers);

        params.alpha = norm.get("Alpha").copied().unwrap_or(0.0);
        params.beta = norm.get("Beta").copied().unwrap_or(0.0);
        params.theta = norm.get("Theta").copied().unwrap_or(0.0);
        params.delta = norm.get("Delta").copied().unwrap_or(0.0);
        params.gamma = norm.get("Gamma").copied().unwrap_or(0.0);

        params.amplitude = (0.1 + params.alpha * 0.8).clamp(0.05, 0.9);

        let beta_alpha = params.beta / params.alpha.max(0.01);
        params.base_frequency =
            self.freq_lo + (beta_alpha / 3.0).clamp(0.0, 1.0) * (self.freq_hi - self.freq_lo);

        params.brightness = (1.0 - params.theta * 2.0).clamp(0.0, 1.0);
        params.noise_gain = (params.gamma * 3.0).clamp(0.0, 1.0);
    }

    /// Decay the one-shot triggers by the measured elapsed time.
    pub fn decay_triggers(&self, params: &mut SoundParameters, dt: f64) {
        if params.blink_trigger > 0.0 {
            params.blink_trigger *= (1.0 - dt / self.blink_decay_secs).max(0.0);
            if params.blink_trigger < TRIGGER_FLOOR {
                params.blink_trigger = 0.0;
            }
        }
        if params.clench_trigger > 0.0 {
            params.clench_trigger *= (1.0 - dt / self.clench_decay_secs).max(0.0);
            if params.clench_trigger < TRIGGER_FLOOR {
                params.clench_trigger = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn mapper() -> ParameterMapper {
        ParameterMapper::new((110.0, 880.0), 0.2, 0.3)
    }

    fn store_with_af7(signal: &[f64]) -> SampleStore {
        let store = SampleStore::new(10.0);
        store.append(Channel::Af7, signal);
        store
    }

    #[test]
    fn events_set_triggers_and_state() {
        let mut params = SoundParameters::default();

        ParameterMapper::apply_event(&mut params, &Event::new(EventType::Blink, 1.0, 300.0));
        assert_eq!(params.blink_trigger, 1.0);

        ParameterMapper::apply_event(&mut params, &Event::new(EventType::Clench, 1.0, 50.0));
        assert_eq!(params.clench_trigger, 1.0);

        ParameterMapper::apply_event(
            &mut params,
            &Event::new(EventType::AlphaBurstStart, 1.0, 2.0),
        );
        assert!(params.alpha_state);
        ParameterMapper::apply_event(&mut params, &Event::new(EventType::AlphaBurstEnd, 2.0, 0.8));
        assert!(!params.alpha_state);
    }

    #[test]
    fn short_buffer_skips_the_tick() {
        let store = store_with_af7(&vec![1.0; 100]);
        let mut params = SoundParameters::default();
        let before = params.clone();

        mapper().update_continuous(&mut params, &store);
        assert_eq!(params, before);
    }

    #[test]
    fn zero_signal_maps_to_floor_parameters() {
        let store = store_with_af7(&vec![0.0; 2 * SAMPLE_RATE]);
        let mut params = SoundParameters::default();

        mapper().update_continuous(&mut params, &store);
        assert_abs_diff_eq!(params.amplitude, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(params.base_frequency, 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(params.brightness, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(params.noise_gain, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn update_is_idempotent_for_identical_input() {
        let signal: Vec<f64> = (0..2 * SAMPLE_RATE)
            .map(|i| 40.0 * (2.0 * PI * 10.0 * i as f64 / SAMPLE_RATE as f64).sin())
            .collect();
        let store = store_with_af7(&signal);

        let mut first = SoundParameters::default();
        mapper().update_continuous(&mut first, &store);
        let mut second = first.clone();
        mapper().update_continuous(&mut second, &store);

        assert_eq!(first, second);
    }

    #[test]
    fn alpha_tone_raises_amplitude_and_lowers_frequency() {
        let signal: Vec<f64> = (0..2 * SAMPLE_RATE)
            .map(|i| 40.0 * (2.0 * PI * 10.0 * i as f64 / SAMPLE_RATE as f64).sin())
            .collect();
        let store = store_with_af7(&signal);

        let mut params = SoundParameters::default();
        mapper().update_continuous(&mut params, &store);

        assert!(params.alpha > 0.8, "alpha weight {}", params.alpha);
        assert!(params.amplitude > 0.7);
        assert!(params.base_frequency < 200.0);
    }

    #[test]
    fn triggers_decay_by_measured_dt() {
        let mapper = mapper();
        let mut params = SoundParameters {
            blink_trigger: 1.0,
            clench_trigger: 1.0,
            ..Default::default()
        };

        mapper.decay_triggers(&mut params, 0.1);
        assert_abs_diff_eq!(params.blink_trigger, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(params.clench_trigger, 1.0 - 0.1 / 0.3, epsilon = 1e-9);

        // Elapsed time past the decay constant clips straight to zero.
        let mut params = SoundParameters {
            blink_trigger: 1.0,
            ..Default::default()
        };
        mapper.decay_triggers(&mut params, 0.25);
        assert_eq!(params.blink_trigger, 0.0);
    }

    #[test]
    fn tiny_triggers_clip_to_zero() {
        let mapper = mapper();
        let mut params = SoundParameters {
            blink_trigger: 0.02,
            ..Default::default()
        };
        mapper.decay_triggers(&mut params, 0.15);
        assert_eq!(params.blink_trigger, 0.0);
    }
}
