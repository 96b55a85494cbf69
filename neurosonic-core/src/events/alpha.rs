//! Alpha-burst detection with a rolling-median baseline and hysteresis.

use super::{Event, EventDetector, EventType};
use crate::dsp::{compute_band_powers, ALPHA};
use crate::errors::ConfigError;
use crate::protocol::{Channel, SAMPLE_RATE};
use crate::store::SampleStore;
use std::collections::VecDeque;

/// Samples required on each frontal channel before a power estimate.
const MIN_ANALYSIS_SAMPLES: usize = 128;

/// Baseline history entries required before ratios are trusted.
const MIN_HISTORY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BurstState {
    Idle,
    InBurst,
}

/// Detects sustained alpha-power increases over a rolling baseline.
///
/// Alpha (8-13 Hz) power on the frontal channels rises when the
/// subject relaxes or closes their eyes. Every update interval the
/// detector estimates current alpha power on AF7+AF8, appends it to a
/// rolling history, and compares it to the history median. The state
/// machine enters a burst when the ratio exceeds the entry threshold
/// and leaves only when it falls below the lower exit threshold — the
/// gap between the two keeps a ratio hovering near either threshold
/// from toggling the state every update.
pub struct AlphaBurstDetector {
    ratio_entry: f64,
    ratio_exit: f64,
    analysis_window_secs: f64,
    update_interval_secs: f64,
    history: VecDeque<f64>,
    history_len: usize,
    state: BurstState,
    last_update: f64,
}

impl AlphaBurstDetector {
    pub fn new(
        ratio_entry: f64,
        ratio_exit: f64,
        baseline_secs: f64,
        analysis_window_secs: f64,
        update_interval_secs: f64,
    ) -> Result<Self, ConfigError> {
        if !ratio_entry.is_finite() || !ratio_exit.is_finite() || ratio_entry <= ratio_exit {
            return Err(ConfigError::InvalidHysteresis {
                entry: ratio_entry,
                exit: ratio_exit,
            });
        }
        if !baseline_secs.is_finite() || baseline_secs <= 0.0 {
            return Err(ConfigError::InvalidWindow {
                seconds: baseline_secs,
            });
        }
        if !analysis_window_secs.is_finite() || analysis_window_secs <= 0.0 {
            return Err(ConfigError::InvalidWindow {
                seconds: analysis_window_secs,
            });
        }
        if !update_interval_secs.is_finite() || update_interval_secs <= 0.0 {
            return Err(ConfigError::InvalidUpdateInterval {
                seconds: update_interval_secs,
            });
        }

        let history_len = ((baseline_secs / update_interval_secs) as usize).max(MIN_HISTORY);
        Ok(Self {
            ratio_entry,
            ratio_exit,
            analysis_window_secs,
            update_interval_secs,
            history: VecDeque::with_capacity(history_len),
            history_len,
            state: BurstState::Idle,
            last_update: f64::NEG_INFINITY,
        })
    }

    fn alpha_power(&self, store: &SampleStore, channel: Channel) -> Option<f64> {
        let window = store.window(channel, self.analysis_window_secs);
        if window.len() < MIN_ANALYSIS_SAMPLES {
            return None;
        }
        let powers = compute_band_powers(&window, SAMPLE_RATE, &[ALPHA]);
        powers.get(ALPHA.name).copied()
    }
}

fn median(values: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl EventDetector for AlphaBurstDetector {
    fn detect(&mut self, store: &SampleStore, now: f64) -> Vec<Event> {
        // Called every control cycle; only sample at the update cadence.
        if now - self.last_update < self.update_interval_secs {
            return Vec::new();
        }
        self.last_update = now;

        let (p7, p8) = match (
            self.alpha_power(store, Channel::Af7),
            self.alpha_power(store, Channel::Af8),
        ) {
            (Some(p7), Some(p8)) => (p7, p8),
            _ => return Vec::new(),
        };
        let current_alpha = (p7 + p8) / 2.0;

        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(current_alpha);

        if self.history.len() < MIN_HISTORY {
            return Vec::new();
        }

        let baseline = median(&self.history);
        if baseline <= 0.0 {
            return Vec::new();
        }
        let ratio = current_alpha / baseline;

        match self.state {
            BurstState::Idle if ratio > self.ratio_entry => {
                self.state = BurstState::InBurst;
                vec![Event::new(EventType::AlphaBurstStart, now, ratio)
                    .with_metadata("alpha_power", current_alpha)
                    .with_metadata("baseline", baseline)]
            }
            BurstState::InBurst if ratio < self.ratio_exit => {
                self.state = BurstState::Idle;
                vec![Event::new(EventType::AlphaBurstEnd, now, ratio)
                    .with_metadata("alpha_power", current_alpha)
                    .with_metadata("baseline", baseline)]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> AlphaBurstDetector {
        AlphaBurstDetector::new(1.5, 1.0, 10.0, 1.0, 0.5).unwrap()
    }

    #[test]
    fn construction_rejects_inverted_hysteresis() {
        assert!(AlphaBurstDetector::new(1.0, 1.5, 10.0, 1.0, 0.5).is_err());
        assert!(AlphaBurstDetector::new(1.5, 1.5, 10.0, 1.0, 0.5).is_err());
        assert!(AlphaBurstDetector::new(1.5, 1.0, 10.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn update_cadence_is_respected() {
        let store = SampleStore::new(5.0);
        store.append(Channel::Af7, &vec![1.0; 512]);
        store.append(Channel::Af8, &vec![1.0; 512]);

        let mut det = detector();
        det.detect(&store, 1.0);
        assert_eq!(det.history.len(), 1);
        // Called again too soon: no new baseline entry.
        det.detect(&store, 1.1);
        assert_eq!(det.history.len(), 1);
        det.detect(&store, 1.5);
        assert_eq!(det.history.len(), 2);
    }

    #[test]
    fn short_channels_do_not_update_history() {
        let store = SampleStore::new(5.0);
        store.append(Channel::Af7, &vec![1.0; 64]);
        store.append(Channel::Af8, &vec![1.0; 512]);

        let mut det = detector();
        assert!(det.detect(&store, 1.0).is_empty());
        assert!(det.history.is_empty());
    }

    #[test]
    fn median_of_even_history_averages_middle_pair() {
        let values: VecDeque<f64> = vec![4.0, 1.0, 3.0, 2.0].into();
        assert_eq!(median(&values), 2.5);
        let values: VecDeque<f64> = vec![5.0, 1.0, 3.0].into();
        assert_eq!(median(&values), 3.0);
    }

    #[test]
    fn zero_baseline_is_guarded() {
        let store = SampleStore::new(5.0);
        store.append(Channel::Af7, &vec![0.0; 512]);
        store.append(Channel::Af8, &vec![0.0; 512]);

        let mut det = detector();
        for i in 0..8 {
            assert!(det.detect(&store, i as f64).is_empty());
        }
        assert_eq!(det.state, BurstState::Idle);
    }
}
