//! Jaw-clench detection from temporal-channel EMG bursts.

use super::{Event, EventDetector, EventType};
use crate::dsp::StreamingBandpass;
use crate::errors::ConfigError;
use crate::protocol::{Channel, SAMPLE_RATE};
use crate::store::SampleStore;

const MIN_WINDOW_SAMPLES: usize = 10;

/// EMG band picked up behind the ears during a clench.
const EMG_LOW_HZ: f64 = 20.0;
const EMG_HIGH_HZ: f64 = 50.0;

/// Detects jaw clenches via high-frequency RMS on TP9/TP10.
///
/// TP9 and TP10 sit close to the jaw muscles; clenching produces a
/// burst of 20-50 Hz EMG activity well above the EEG background. The
/// detector owns one streaming filter per channel — filter delay
/// memory is per-signal state and must never be shared.
pub struct ClenchDetector {
    threshold_uv_rms: f64,
    window_secs: f64,
    debounce_secs: f64,
    last_clench: f64,
    filter_tp9: StreamingBandpass,
    filter_tp10: StreamingBandpass,
}

impl ClenchDetector {
    pub fn new(
        threshold_uv_rms: f64,
        window_secs: f64,
        debounce_secs: f64,
    ) -> Result<Self, ConfigError> {
        if !threshold_uv_rms.is_finite() || threshold_uv_rms <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                value: threshold_uv_rms,
            });
        }
        if !window_secs.is_finite() || window_secs <= 0.0 {
            return Err(ConfigError::InvalidWindow {
                seconds: window_secs,
            });
        }
        if !debounce_secs.is_finite() || debounce_secs < 0.0 {
            return Err(ConfigError::InvalidDebounce {
                seconds: debounce_secs,
            });
        }
        Ok(Self {
            threshold_uv_rms,
            window_secs,
            debounce_secs,
            last_clench: f64::NEG_INFINITY,
            filter_tp9: StreamingBandpass::new(EMG_LOW_HZ, EMG_HIGH_HZ, SAMPLE_RATE)?,
            filter_tp10: StreamingBandpass::new(EMG_LOW_HZ, EMG_HIGH_HZ, SAMPLE_RATE)?,
        })
    }
}

fn rms(window: &[f64]) -> f64 {
    (window.iter().map(|x| x * x).sum::<f64>() / window.len() as f64).sqrt()
}

impl EventDetector for ClenchDetector {
    fn detect(&mut self, store: &SampleStore, now: f64) -> Vec<Event> {
        if now - self.last_clench < self.debounce_secs {
            return Vec::new();
        }

        let tp9 = store.window(Channel::Tp9, self.window_secs);
        let tp10 = store.window(Channel::Tp10, self.window_secs);
        if tp9.len() < MIN_WINDOW_SAMPLES || tp10.len() < MIN_WINDOW_SAMPLES {
            return Vec::new();
        }

        let rms9 = rms(&self.filter_tp9.process(&tp9));
        let rms10 = rms(&self.filter_tp10.process(&tp10));
        let peak_rms = rms9.max(rms10);

        if peak_rms > self.threshold_uv_rms {
            self.last_clench = now;
            return vec![Event::new(EventType::Clench, now, peak_rms)];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn construction_rejects_bad_tunables() {
        assert!(ClenchDetector::new(-1.0, 0.5, 0.5).is_err());
        assert!(ClenchDetector::new(30.0, 0.0, 0.5).is_err());
        assert!(ClenchDetector::new(30.0, 0.5, f64::INFINITY).is_err());
        assert!(ClenchDetector::new(30.0, 0.5, 0.5).is_ok());
    }

    #[test]
    fn emg_tone_fires_with_rms_magnitude() {
        let store = SampleStore::new(5.0);
        let burst: Vec<f64> = (0..SAMPLE_RATE)
            .map(|i| 100.0 * (2.0 * PI * 35.0 * i as f64 / SAMPLE_RATE as f64).sin())
            .collect();
        store.append(Channel::Tp9, &burst);
        store.append(Channel::Tp10, &vec![0.0; SAMPLE_RATE]);

        let mut detector = ClenchDetector::new(30.0, 0.5, 0.5).unwrap();
        let events = detector.detect(&store, 1.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Clench);
        // 35 Hz sits mid-band: RMS near 100/√2 µV.
        assert!(events[0].value > 30.0);
    }

    #[test]
    fn quiet_channels_stay_silent() {
        let store = SampleStore::new(5.0);
        store.append(Channel::Tp9, &vec![1.0; SAMPLE_RATE]);
        store.append(Channel::Tp10, &vec![-1.0; SAMPLE_RATE]);

        let mut detector = ClenchDetector::new(30.0, 0.5, 0.5).unwrap();
        assert!(detector.detect(&store, 1.0).is_empty());
    }
}
