//! Configuration types for the Neurosonic pipeline.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Blink detector tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlinkConfig {
    /// Absolute peak-to-peak threshold on AF7/AF8, in µV.
    pub threshold_uv: f64,
    /// Detection window length in seconds.
    pub window_secs: f64,
    /// Minimum time between successive blink events, in seconds.
    pub debounce_secs: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            threshold_uv: 200.0,
            window_secs: 0.2,
            debounce_secs: 0.3,
        }
    }
}

/// Jaw-clench detector tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClenchConfig {
    /// RMS threshold on 20-50 Hz filtered TP9/TP10, in µV.
    pub threshold_uv_rms: f64,
    pub window_secs: f64,
    pub debounce_secs: f64,
}

impl Default for ClenchConfig {
    fn default() -> Self {
        Self {
            threshold_uv_rms: 30.0,
            window_secs: 0.5,
            debounce_secs: 0.5,
        }
    }
}

/// Alpha-burst detector tunables.
///
/// The entry ratio must exceed the exit ratio; the gap between them is
/// the hysteresis band that keeps the state machine from oscillating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaBurstConfig {
    /// Ratio of current alpha power to baseline required to enter a burst.
    pub ratio_entry: f64,
    /// Ratio below which an active burst ends.
    pub ratio_exit: f64,
    /// Rolling baseline span in seconds.
    pub baseline_secs: f64,
    /// Per-channel analysis window in seconds.
    pub analysis_window_secs: f64,
    /// Minimum time between baseline updates, in seconds.
    pub update_interval_secs: f64,
}

impl Default for AlphaBurstConfig {
    fn default() -> Self {
        Self {
            ratio_entry: 1.5,
            ratio_exit: 1.0,
            baseline_secs: 10.0,
            analysis_window_secs: 1.0,
            update_interval_secs: 0.5,
        }
    }
}

/// Full pipeline configuration with the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    // Transport
    pub device_name: String,
    pub scan_timeout_secs: f64,
    pub connect_timeout_secs: f64,
    pub max_retries: u32,
    pub retry_delay_secs: f64,

    // EEG
    pub eeg_buffer_seconds: f64,
    pub control_interval_secs: f64,

    // Event detection
    pub blink: BlinkConfig,
    pub clench: ClenchConfig,
    pub alpha_burst: AlphaBurstConfig,

    // Sound
    pub audio_sample_rate: usize,
    pub audio_block_frames: usize,
    pub audio_channels: usize,
    pub base_frequency_range_hz: (f64, f64),
    pub blink_decay_secs: f64,
    pub clench_decay_secs: f64,
    pub master_volume: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device_name: "Muse-31A9".to_string(),
            scan_timeout_secs: 10.0,
            connect_timeout_secs: 30.0,
            max_retries: 3,
            retry_delay_secs: 2.0,

            eeg_buffer_seconds: 10.0,
            control_interval_secs: 0.05,

            blink: BlinkConfig::default(),
            clench: ClenchConfig::default(),
            alpha_burst: AlphaBurstConfig::default(),

            audio_sample_rate: 44_100,
            audio_block_frames: 2205,
            audio_channels: 1,
            base_frequency_range_hz: (110.0, 880.0),
            blink_decay_secs: 0.2,
            clench_decay_secs: 0.3,
            master_volume: 0.5,
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl PipelineConfig {
    /// Validate every tunable against its admissible range.
    ///
    /// Components also validate their own inputs at construction; this
    /// is the front door that rejects a bad config before any component
    /// is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.eeg_buffer_seconds) {
            return Err(ConfigError::InvalidBufferDuration {
                seconds: self.eeg_buffer_seconds,
            });
        }
        if !positive(self.control_interval_secs) {
            return Err(ConfigError::InvalidControlInterval {
                seconds: self.control_interval_secs,
            });
        }

        if !positive(self.blink.threshold_uv) {
            return Err(ConfigError::InvalidThreshold {
                value: self.blink.threshold_uv,
            });
        }
        if !positive(self.blink.window_secs) {
            return Err(ConfigError::InvalidWindow {
                seconds: self.blink.window_secs,
            });
        }
        if !self.blink.debounce_secs.is_finite() || self.blink.debounce_secs < 0.0 {
            return Err(ConfigError::InvalidDebounce {
                seconds: self.blink.debounce_secs,
            });
        }

        if !positive(self.clench.threshold_uv_rms) {
            return Err(ConfigError::InvalidThreshold {
                value: self.clench.threshold_uv_rms,
            });
        }
        if !positive(self.clench.window_secs) {
            return Err(ConfigError::InvalidWindow {
                seconds: self.clench.window_secs,
            });
        }
        if !self.clench.debounce_secs.is_finite() || self.clench.debounce_secs < 0.0 {
            return Err(ConfigError::InvalidDebounce {
                seconds: self.clench.debounce_secs,
            });
        }

        if self.alpha_burst.ratio_entry <= self.alpha_burst.ratio_exit {
            return Err(ConfigError::InvalidHysteresis {
                entry: self.alpha_burst.ratio_entry,
                exit: self.alpha_burst.ratio_exit,
            });
        }
        if !positive(self.alpha_burst.baseline_secs)
            || !positive(self.alpha_burst.analysis_window_secs)
        {
            return Err(ConfigError::InvalidWindow {
                seconds: self.alpha_burst.baseline_secs.min(self.alpha_burst.analysis_window_secs),
            });
        }
        if !positive(self.alpha_burst.update_interval_secs) {
            return Err(ConfigError::InvalidUpdateInterval {
                seconds: self.alpha_burst.update_interval_secs,
            });
        }

        if self.audio_block_frames == 0 {
            return Err(ConfigError::InvalidBlockSize {
                frames: self.audio_block_frames,
            });
        }
        let (freq_lo, freq_hi) = self.base_frequency_range_hz;
        if !positive(freq_lo) || !freq_hi.is_finite() || freq_lo >= freq_hi {
            return Err(ConfigError::InvalidFrequencyRange {
                low: freq_lo,
                high: freq_hi,
            });
        }
        if !positive(self.blink_decay_secs) {
            return Err(ConfigError::InvalidDecay {
                seconds: self.blink_decay_secs,
            });
        }
        if !positive(self.clench_decay_secs) {
            return Err(ConfigError::InvalidDecay {
                seconds: self.clench_decay_secs,
            });
        }
        if !self.master_volume.is_finite() || !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::InvalidMasterVolume {
                value: self.master_volume,
            });
        }
        if !self.retry_delay_secs.is_finite() || self.retry_delay_secs < 0.0 {
            return Err(ConfigError::InvalidRetryPolicy {
                retries: self.max_retries,
                delay_secs: self.retry_delay_secs,
            });
        }

        Ok(())
    }
}
