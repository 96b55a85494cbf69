//! Digital signal processing layer: Butterworth filtering and spectral
//! band-power estimation for the EEG path.

pub mod bands;
pub mod filters;

pub use bands::{
    band_power_rms, compute_band_powers, normalize_band_powers, welch_psd, BandPowerMap,
    FrequencyBand, ALL_BANDS, ALPHA, BETA, DELTA, GAMMA, THETA,
};
pub use filters::{bandpass_zero_phase, StreamingBandpass};
