//! Blink detection from frontal-channel spike amplitude.

use super::{Event, EventDetector, EventType};
use crate::errors::ConfigError;
use crate::protocol::Channel;
use crate::store::SampleStore;

/// Minimum samples per channel before a window is judged at all.
const MIN_WINDOW_SAMPLES: usize = 10;

/// Detects eye blinks as large peak-to-peak deflections on AF7/AF8.
///
/// The forehead electrodes show a characteristic high-amplitude swing
/// during a blink; a short window whose peak-to-peak amplitude exceeds
/// the absolute threshold fires one event, then the debounce interval
/// suppresses re-detection of the same physiological blink.
#[derive(Debug)]
pub struct BlinkDetector {
    threshold_uv: f64,
    window_secs: f64,
    debounce_secs: f64,
    last_blink: f64,
}

impl BlinkDetector {
    pub fn new(threshold_uv: f64, window_secs: f64, debounce_secs: f64) -> Result<Self, ConfigError> {
        if !threshold_uv.is_finite() || threshold_uv <= 0.0 {
            return Err(ConfigError::InvalidThreshold { value: threshold_uv });
        }
        if !window_secs.is_finite() || window_secs <= 0.0 {
            return Err(ConfigError::InvalidWindow { seconds: window_secs });
        }
        if !debounce_secs.is_finite() || debounce_secs < 0.0 {
            return Err(ConfigError::InvalidDebounce { seconds: debounce_secs });
        }
        Ok(Self {
            threshold_uv,
            window_secs,
            debounce_secs,
            last_blink: f64::NEG_INFINITY,
        })
    }
}

fn peak_to_peak(window: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &x in window {
        min = min.min(x);
        max = max.max(x);
    }
    max - min
}

impl EventDetector for BlinkDetector {
    fn detect(&mut self, store: &SampleStore, now: f64) -> Vec<Event> {
        if now - self.last_blink < self.debounce_secs {
            return Vec::new();
        }

        let af7 = store.window(Channel::Af7, self.window_secs);
        let af8 = store.window(Channel::Af8, self.window_secs);
        if af7.len() < MIN_WINDOW_SAMPLES || af8.len() < MIN_WINDOW_SAMPLES {
            return Vec::new();
        }

        let peak = peak_to_peak(&af7).max(peak_to_peak(&af8));
        if peak > self.threshold_uv {
            self.last_blink = now;
            return vec![Event::new(EventType::Blink, now, peak)];
        }

        Vec::new()
    }
}
