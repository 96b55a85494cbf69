//! EEG frequency bands and spectral power estimation.
//!
//! Two estimators feed the mapper and the alpha detector: a Welch
//! averaged-periodogram band power (PSD integrated over the band mask)
//! and an RMS-of-band-passed-signal power used by the clench path.

use crate::dsp::filters::StreamingBandpass;
use crate::errors::ConfigError;
use num_complex::Complex;
use rustfft::{num_complex::Complex64, FftPlanner};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// A named frequency interval with a display color tag for downstream
/// plotting collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    pub name: &'static str,
    pub low: f64,
    pub high: f64,
    pub color: &'static str,
}

pub const DELTA: FrequencyBand = FrequencyBand {
    name: "Delta",
    low: 0.5,
    high: 4.0,
    color: "#9467bd",
};
pub const THETA: FrequencyBand = FrequencyBand {
    name: "Theta",
    low: 4.0,
    high: 8.0,
    color: "#8c564b",
};
pub const ALPHA: FrequencyBand = FrequencyBand {
    name: "Alpha",
    low: 8.0,
    high: 13.0,
    color: "#e377c2",
};
pub const BETA: FrequencyBand = FrequencyBand {
    name: "Beta",
    low: 13.0,
    high: 30.0,
    color: "#17becf",
};
pub const GAMMA: FrequencyBand = FrequencyBand {
    name: "Gamma",
    low: 30.0,
    high: 50.0,
    color: "#bcbd22",
};

/// The five standard EEG bands, low to high.
pub const ALL_BANDS: [FrequencyBand; 5] = [DELTA, THETA, ALPHA, BETA, GAMMA];

/// Band name → absolute power, in deterministic iteration order.
pub type BandPowerMap = BTreeMap<String, f64>;

/// Welch power spectral density estimate of a chronological window.
///
/// Hann-windowed segments of length min(len, 2 × sample rate) with 50%
/// overlap, constant detrend per segment, one-sided density scaling.
/// Returns (frequencies, psd); empty input yields empty output.
pub fn welch_psd(data: &[f64], sample_rate: usize) -> (Vec<f64>, Vec<f64>) {
    if data.is_empty() || sample_rate == 0 {
        return (Vec::new(), Vec::new());
    }

    let nperseg = data.len().min(2 * sample_rate);
    let step = (nperseg / 2).max(1);
    let rate = sample_rate as f64;

    // Periodic Hann window, the spectral-analysis variant.
    let window: Vec<f64> = (0..nperseg)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / nperseg as f64).cos())
        .collect();
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nperseg);

    let n_bins = nperseg / 2 + 1;
    let mut psd = vec![0.0f64; n_bins];
    let mut segments = 0usize;
    let mut buffer = vec![Complex64::new(0.0, 0.0); nperseg];

    let mut start = 0;
    while start + nperseg <= data.len() {
        let segment = &data[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;

        for (i, (&x, &w)) in segment.iter().zip(window.iter()).enumerate() {
            buffer[i] = Complex::new((x - mean) * w, 0.0);
        }
        fft.process(&mut buffer);

        let scale = 1.0 / (rate * window_power);
        for (bin, value) in psd.iter_mut().enumerate() {
            let mut power = buffer[bin].norm_sqr() * scale;
            // One-sided spectrum: interior bins carry the conjugate half.
            if bin != 0 && !(nperseg % 2 == 0 && bin == n_bins - 1) {
                power *= 2.0;
            }
            *value += power;
        }
        segments += 1;
        start += step;
    }

    if segments == 0 {
        return (Vec::new(), Vec::new());
    }
    for value in &mut psd {
        *value /= segments as f64;
    }

    let freqs = (0..n_bins)
        .map(|bin| bin as f64 * rate / nperseg as f64)
        .collect();
    (freqs, psd)
}

/// Trapezoidal integral of the PSD over one band's frequency mask.
fn integrate_band(freqs: &[f64], psd: &[f64], band: &FrequencyBand) -> f64 {
    let masked: Vec<(f64, f64)> = freqs
        .iter()
        .zip(psd.iter())
        .filter(|(&f, _)| f >= band.low && f <= band.high)
        .map(|(&f, &p)| (f, p))
        .collect();

    masked
        .windows(2)
        .map(|pair| 0.5 * (pair[0].1 + pair[1].1) * (pair[1].0 - pair[0].0))
        .sum()
}

/// Absolute power per band via the Welch method.
///
/// Windows shorter than one second return zero for every band; spectral
/// estimates below that length are too coarse to integrate honestly.
pub fn compute_band_powers(
    data: &[f64],
    sample_rate: usize,
    bands: &[FrequencyBand],
) -> BandPowerMap {
    if data.len() < sample_rate {
        return bands.iter().map(|b| (b.name.to_string(), 0.0)).collect();
    }

    let (freqs, psd) = welch_psd(data, sample_rate);
    bands
        .iter()
        .map(|band| (band.name.to_string(), integrate_band(&freqs, &psd, band)))
        .collect()
}

/// Normalize band powers to relative weights summing to 1.
///
/// A zero total (degenerate signal) yields an all-zero map of the same
/// keys rather than an error.
pub fn normalize_band_powers(powers: &BandPowerMap) -> BandPowerMap {
    let total: f64 = powers.values().sum();
    if total == 0.0 {
        return powers.keys().map(|k| (k.clone(), 0.0)).collect();
    }
    powers
        .iter()
        .map(|(k, v)| (k.clone(), v / total))
        .collect()
}

/// Band power as the RMS of the causally band-passed window.
///
/// Returns 0 for windows shorter than one second. Uses a fresh filter,
/// so repeated calls on the same window are identical. The filter is
/// warmed up on an odd reflection of the window head (discarded before
/// the RMS) so the startup transient does not bias the power estimate
/// downward.
pub fn band_power_rms(
    data: &[f64],
    low: f64,
    high: f64,
    sample_rate: usize,
) -> Result<f64, ConfigError> {
    if data.len() < sample_rate {
        return Ok(0.0);
    }
    let mut filter = StreamingBandpass::new(low, high, sample_rate)?;

    let pad = (sample_rate / 2).min(data.len() - 1);
    let warmup: Vec<f64> = (1..=pad).rev().map(|i| 2.0 * data[0] - data[i]).collect();
    filter.process(&warmup);

    let filtered = filter.process(data);
    let mean_square = filtered.iter().map(|x| x * x).sum::<f64>() / filtered.len() as f64;
    Ok(mean_square.sqrt())
}
