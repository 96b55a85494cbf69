//! Neurophysiological events: record types, the detector interface,
//! and the concrete detectors.
//!
//! Detectors consume windows from the [`SampleStore`](crate::store::SampleStore)
//! each control cycle and never mutate it. Debounce timestamps,
//! baselines, and filter state are private fields of each detector.

mod alpha;
mod blink;
pub mod bus;
mod clench;

pub use alpha::AlphaBurstDetector;
pub use blink::BlinkDetector;
pub use bus::EventBus;
pub use clench::ClenchDetector;

use crate::store::SampleStore;
use std::collections::HashMap;
use std::fmt;

/// Kind tag of a detected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Blink,
    Clench,
    AlphaBurstStart,
    AlphaBurstEnd,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Blink => "BLINK",
            EventType::Clench => "CLENCH",
            EventType::AlphaBurstStart => "ALPHA_BURST_START",
            EventType::AlphaBurstEnd => "ALPHA_BURST_END",
        };
        f.write_str(name)
    }
}

/// An immutable detected event.
///
/// `timestamp` is monotonic seconds from the session clock. `value` is
/// the detector-specific magnitude (peak-to-peak µV for blinks, RMS µV
/// for clenches, power ratio for alpha transitions). Metadata is empty
/// for blink/clench and carries alpha power and baseline for the
/// alpha-burst transitions.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: f64,
    pub value: f64,
    pub metadata: HashMap<&'static str, f64>,
}

impl Event {
    pub fn new(event_type: EventType, timestamp: f64, value: f64) -> Self {
        Self {
            event_type,
            timestamp,
            value,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &'static str, value: f64) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(value={:.1})", self.event_type, self.value)
    }
}

/// A detector examines the sample store once per control cycle and
/// returns any events it found.
pub trait EventDetector: Send {
    fn detect(&mut self, store: &SampleStore, now: f64) -> Vec<Event>;
}
