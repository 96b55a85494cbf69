//! Butterworth band-pass filters for the EEG path.
//!
//! Both filter forms are 4th-order Butterworth band-passes realized as
//! cascaded second-order sections. The design follows the classic
//! analog-prototype route: place the prototype poles on the left unit
//! semicircle, transform lowpass to bandpass (each prototype pole
//! splits into a conjugate pair), then map to the z-plane with the
//! bilinear transform. Working in poles rather than direct-form
//! polynomial coefficients keeps the 8th-order result numerically
//! stable at EEG band edges, which sit far below Nyquist.
//!
//! The offline form runs forward-backward for zero phase distortion
//! and is suitable only for recorded segments. The streaming form is
//! causal and keeps per-section delay state across calls.

use crate::errors::ConfigError;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Band-pass filter order (prototype order; the band-pass has 2× poles).
const ORDER: usize = 4;

/// Lowest admissible band edge, as a fraction of Nyquist.
const MIN_EDGE_FRACTION: f64 = 1e-4;

/// Highest admissible band edge, as a fraction of Nyquist.
const MAX_EDGE_FRACTION: f64 = 0.99;

/// One second-order section, direct form II transposed.
#[derive(Debug, Clone, Copy)]
struct Sos {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Delay memory for one section.
#[derive(Debug, Clone, Copy, Default)]
struct SosState {
    z1: f64,
    z2: f64,
}

impl Sos {
    #[inline]
    fn step(&self, x: f64, state: &mut SosState) -> f64 {
        let y = self.b0 * x + state.z1;
        state.z1 = self.b1 * x - self.a1 * y + state.z2;
        state.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// Pull requested band edges inside the open interval (0, nyquist).
///
/// Edges that reach or cross Nyquist are clamped rather than rejected;
/// a band that is empty after clamping is a configuration error.
fn clamp_band(low: f64, high: f64, sample_rate: usize) -> Result<(f64, f64), ConfigError> {
    let nyquist = sample_rate as f64 / 2.0;
    if !low.is_finite() || !high.is_finite() || nyquist <= 0.0 {
        return Err(ConfigError::InvalidBand { low, high, nyquist });
    }

    let clamped_lo = low.max(nyquist * MIN_EDGE_FRACTION);
    let clamped_hi = high.min(nyquist * MAX_EDGE_FRACTION);
    if clamped_lo >= clamped_hi {
        return Err(ConfigError::InvalidBand { low, high, nyquist });
    }
    Ok((clamped_lo, clamped_hi))
}

/// Design the 4th-order Butterworth band-pass as second-order sections.
fn design_bandpass(low: f64, high: f64, sample_rate: usize) -> Result<Vec<Sos>, ConfigError> {
    let (low, high) = clamp_band(low, high, sample_rate)?;
    let rate = sample_rate as f64;

    // Pre-warp the band edges onto the analog axis. The factor of 4
    // matches the fs2 = 4 used in the bilinear transform below.
    let warped_lo = 4.0 * (PI * low / rate).tan();
    let warped_hi = 4.0 * (PI * high / rate).tan();
    let bw = warped_hi - warped_lo;
    let wo = (warped_lo * warped_hi).sqrt();

    // Prototype poles, transformed lowpass → bandpass. The band-pass
    // contributes ORDER analog zeros at s = 0; its gain is bw^ORDER.
    let n = ORDER as i32;
    let mut analog_poles = Vec::with_capacity(2 * ORDER);
    for k in 0..n {
        let theta = PI * f64::from(2 * k + n + 1) / f64::from(2 * n);
        let p = Complex64::from_polar(1.0, theta);
        let scaled = p * (bw / 2.0);
        let disc = (scaled * scaled - Complex64::new(wo * wo, 0.0)).sqrt();
        analog_poles.push(scaled + disc);
        analog_poles.push(scaled - disc);
    }

    // Bilinear transform. The analog zeros at s = 0 map to z = +1; the
    // ORDER excess poles contribute zeros at z = -1, so every section
    // gets the numerator (z - 1)(z + 1) = z² - 1.
    let fs2 = Complex64::new(4.0, 0.0);
    let mut digital_poles = Vec::with_capacity(2 * ORDER);
    let mut pole_product = Complex64::new(1.0, 0.0);
    for &p in &analog_poles {
        digital_poles.push((fs2 + p) / (fs2 - p));
        pole_product *= fs2 - p;
    }
    let gain = (Complex64::new(bw.powi(n) * 4f64.powi(n), 0.0) / pole_product).re;

    // Pair conjugate poles into sections. Poles arrive as conjugate
    // pairs; the real-axis fallback only fires on numerically collapsed
    // pairs for extreme band choices.
    let mut upper: Vec<Complex64> = digital_poles
        .iter()
        .copied()
        .filter(|p| p.im > 1e-12)
        .collect();
    upper.sort_by(|a, b| a.re.partial_cmp(&b.re).unwrap());
    let mut reals: Vec<f64> = digital_poles
        .iter()
        .filter(|p| p.im.abs() <= 1e-12)
        .map(|p| p.re)
        .collect();
    reals.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut sections = Vec::with_capacity(ORDER);
    for p in upper {
        sections.push(Sos {
            b0: 1.0,
            b1: 0.0,
            b2: -1.0,
            a1: -2.0 * p.re,
            a2: p.norm_sqr(),
        });
    }
    for pair in reals.chunks_exact(2) {
        sections.push(Sos {
            b0: 1.0,
            b1: 0.0,
            b2: -1.0,
            a1: -(pair[0] + pair[1]),
            a2: pair[0] * pair[1],
        });
    }
    debug_assert_eq!(sections.len(), ORDER);

    // Lump the cascade gain into the first section.
    sections[0].b0 *= gain;
    sections[0].b2 *= gain;

    Ok(sections)
}

/// Run a section cascade over a signal with zeroed initial state.
fn run_cascade(sections: &[Sos], data: &[f64]) -> Vec<f64> {
    let mut states = vec![SosState::default(); sections.len()];
    data.iter()
        .map(|&x| {
            let mut y = x;
            for (section, state) in sections.iter().zip(states.iter_mut()) {
                y = section.step(y, state);
            }
            y
        })
        .collect()
}

/// Zero-phase 4th-order Butterworth band-pass over a whole signal.
///
/// Filters forward then backward, so the output has no phase
/// distortion and the same length as the input. The signal is extended
/// at both ends by odd reflection to suppress edge transients. For
/// recorded segments only; real-time paths use [`StreamingBandpass`].
pub fn bandpass_zero_phase(
    data: &[f64],
    low: f64,
    high: f64,
    sample_rate: usize,
) -> Result<Vec<f64>, ConfigError> {
    let sections = design_bandpass(low, high, sample_rate)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let pad = (3 * (2 * sections.len() + 1)).min(data.len() - 1);
    let first = data[0];
    let last = *data.last().unwrap();

    let mut extended = Vec::with_capacity(data.len() + 2 * pad);
    for i in (1..=pad).rev() {
        extended.push(2.0 * first - data[i]);
    }
    extended.extend_from_slice(data);
    for i in 1..=pad {
        extended.push(2.0 * last - data[data.len() - 1 - i]);
    }

    let mut filtered = run_cascade(&sections, &extended);
    filtered.reverse();
    let mut filtered = run_cascade(&sections, &filtered);
    filtered.reverse();

    Ok(filtered[pad..pad + data.len()].to_vec())
}

/// Causal streaming band-pass with state preserved across calls.
///
/// Each `process` call consumes a chunk and returns a same-length
/// output. Initial state is zeroed — no assumed DC offset. Owners must
/// not share an instance across channels; the delay memory is signal
/// state.
#[derive(Debug, Clone)]
pub struct StreamingBandpass {
    sections: Vec<Sos>,
    state: Vec<SosState>,
}

impl StreamingBandpass {
    /// Build a streaming band-pass for the given edges, clamping them
    /// inside (0, nyquist) when they reach or cross the limit.
    pub fn new(low: f64, high: f64, sample_rate: usize) -> Result<Self, ConfigError> {
        let sections = design_bandpass(low, high, sample_rate)?;
        let state = vec![SosState::default(); sections.len()];
        Ok(Self { sections, state })
    }

    /// Filter a chunk, carrying delay state into the next call.
    pub fn process(&mut self, chunk: &[f64]) -> Vec<f64> {
        chunk
            .iter()
            .map(|&x| {
                let mut y = x;
                for (section, state) in self.sections.iter().zip(self.state.iter_mut()) {
                    y = section.step(y, state);
                }
                y
            })
            .collect()
    }

    /// Re-zero the delay memory.
    pub fn reset(&mut self) {
        for state in &mut self.state {
            *state = SosState::default();
        }
    }
}
