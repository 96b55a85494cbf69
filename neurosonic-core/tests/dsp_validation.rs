//! DSP acceptance scenarios: streaming filter silence, band-power RMS
//! of known tones, and zero-phase behavior over recorded segments.

mod common;

use approx::assert_abs_diff_eq;
use common::sine_from;
use neurosonic_core::dsp::{
    band_power_rms, bandpass_zero_phase, compute_band_powers, normalize_band_powers,
    StreamingBandpass, ALL_BANDS,
};
use neurosonic_core::protocol::SAMPLE_RATE;

fn rms(data: &[f64]) -> f64 {
    (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
}

#[test]
fn zero_input_through_streaming_alpha_band_is_silent() {
    let mut filter = StreamingBandpass::new(8.0, 13.0, SAMPLE_RATE).unwrap();
    let output = filter.process(&vec![0.0; 2 * SAMPLE_RATE]);
    assert_eq!(output.len(), 2 * SAMPLE_RATE);
    assert!(rms(&output) < 1e-6);
}

#[test]
fn alpha_band_rms_of_unit_alpha_tone() {
    let window = sine_from(10.0, 1.0, SAMPLE_RATE, 0, SAMPLE_RATE);
    let power = band_power_rms(&window, 8.0, 13.0, SAMPLE_RATE).unwrap();
    assert_abs_diff_eq!(power, 0.707, epsilon = 0.05);
}

#[test]
fn band_rms_requires_one_second_of_signal() {
    let window = sine_from(10.0, 1.0, SAMPLE_RATE - 1, 0, SAMPLE_RATE);
    let power = band_power_rms(&window, 8.0, 13.0, SAMPLE_RATE).unwrap();
    assert_eq!(power, 0.0);
}

#[test]
fn zero_phase_filter_keeps_length_and_passes_alpha() {
    let signal = sine_from(10.0, 1.0, 4 * SAMPLE_RATE, 0, SAMPLE_RATE);
    let filtered = bandpass_zero_phase(&signal, 8.0, 13.0, SAMPLE_RATE).unwrap();
    assert_eq!(filtered.len(), signal.len());

    let mid = &filtered[SAMPLE_RATE..3 * SAMPLE_RATE];
    assert_abs_diff_eq!(rms(mid), 0.707, epsilon = 0.05);
}

#[test]
fn zero_phase_filter_rejects_emg_band() {
    let signal = sine_from(35.0, 1.0, 4 * SAMPLE_RATE, 0, SAMPLE_RATE);
    let filtered = bandpass_zero_phase(&signal, 8.0, 13.0, SAMPLE_RATE).unwrap();
    let mid = &filtered[SAMPLE_RATE..3 * SAMPLE_RATE];
    assert!(rms(mid) < 0.01, "EMG leakage RMS {}", rms(mid));
}

#[test]
fn welch_band_powers_of_mixed_tones_separate_bands() {
    // 6 Hz theta and 10 Hz alpha at equal amplitude: both bands carry
    // comparable power, everything else stays small.
    let n = 4 * SAMPLE_RATE;
    let theta = sine_from(6.0, 20.0, n, 0, SAMPLE_RATE);
    let alpha = sine_from(10.0, 20.0, n, 0, SAMPLE_RATE);
    let mixed: Vec<f64> = theta.iter().zip(alpha.iter()).map(|(a, b)| a + b).collect();

    let powers = compute_band_powers(&mixed, SAMPLE_RATE, &ALL_BANDS);
    let norm = normalize_band_powers(&powers);

    assert!(norm["Theta"] > 0.3);
    assert!(norm["Alpha"] > 0.3);
    assert!(norm["Gamma"] < 0.05);
    assert_abs_diff_eq!(norm.values().sum::<f64>(), 1.0, epsilon = 1e-9);
}
