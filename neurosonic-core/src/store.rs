//! Per-channel EEG sample store backed by fixed-capacity ring buffers.
//!
//! One writer (the transport callback) and one reader (the orchestrator
//! tick) share each channel. Every channel ring sits behind its own
//! mutex that is held only for the duration of a memcpy, so a window
//! read always observes a whole number of appended batches — never a
//! torn batch.

use crate::protocol::{Channel, SAMPLE_RATE};
use std::sync::Mutex;

/// Circular backing array for one channel.
#[derive(Debug)]
struct Ring {
    buf: Vec<f64>,
    write_pos: usize,
    count: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            write_pos: 0,
            count: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn append(&mut self, samples: &[f64]) {
        let capacity = self.capacity();
        let n = samples.len();

        if n >= capacity {
            // More samples than the ring holds: keep only the trailing capacity.
            self.buf.copy_from_slice(&samples[n - capacity..]);
            self.write_pos = 0;
            self.count = capacity;
            return;
        }

        let end = self.write_pos + n;
        if end <= capacity {
            self.buf[self.write_pos..end].copy_from_slice(samples);
        } else {
            let first = capacity - self.write_pos;
            self.buf[self.write_pos..].copy_from_slice(&samples[..first]);
            self.buf[..n - first].copy_from_slice(&samples[first..]);
        }

        self.write_pos = end % capacity;
        self.count = (self.count + n).min(capacity);
    }

    /// Last `n` samples in chronological order, as a contiguous copy.
    fn window(&self, n: usize) -> Vec<f64> {
        let n = n.min(self.count);
        if n == 0 {
            return Vec::new();
        }

        let capacity = self.capacity();
        // Samples live at positions [write_pos - n, write_pos) mod capacity.
        let start = (self.write_pos + capacity - n) % capacity;
        if start < self.write_pos {
            self.buf[start..self.write_pos].to_vec()
        } else {
            let mut out = Vec::with_capacity(n);
            out.extend_from_slice(&self.buf[start..]);
            out.extend_from_slice(&self.buf[..self.write_pos]);
            out
        }
    }

    fn clear(&mut self) {
        self.write_pos = 0;
        self.count = 0;
    }
}

/// Fixed-capacity chronological sample store, one ring per channel.
///
/// Created once per session by the pipeline; capacity is
/// ⌈duration × sample rate⌉ samples per channel. All reads return
/// independent copies, so callers carry no lifetime ties to the store.
#[derive(Debug)]
pub struct SampleStore {
    capacity: usize,
    rings: [Mutex<Ring>; 4],
}

impl SampleStore {
    /// Store holding the most recent `duration_secs` of samples per channel.
    pub fn new(duration_secs: f64) -> Self {
        let capacity = (duration_secs * SAMPLE_RATE as f64).ceil() as usize;
        Self {
            capacity,
            rings: [
                Mutex::new(Ring::new(capacity)),
                Mutex::new(Ring::new(capacity)),
                Mutex::new(Ring::new(capacity)),
                Mutex::new(Ring::new(capacity)),
            ],
        }
    }

    fn ring(&self, channel: Channel) -> &Mutex<Ring> {
        &self.rings[channel.index()]
    }

    /// Per-channel capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a batch of samples to a channel.
    ///
    /// The channel lock is held for the whole batch, so readers observe
    /// either none or all of it. A batch longer than the capacity keeps
    /// only its trailing samples.
    pub fn append(&self, channel: Channel, samples: &[f64]) {
        if samples.is_empty() {
            return;
        }
        self.ring(channel).lock().unwrap().append(samples);
    }

    /// Contiguous copy of the last ⌊seconds × sample rate⌋ samples, in
    /// chronological order; all buffered samples if fewer are available.
    pub fn window(&self, channel: Channel, seconds: f64) -> Vec<f64> {
        let n = (seconds * SAMPLE_RATE as f64).floor() as usize;
        self.ring(channel).lock().unwrap().window(n)
    }

    /// Contiguous copy of the last `n` samples (or all, if fewer).
    pub fn last_n(&self, channel: Channel, n: usize) -> Vec<f64> {
        self.ring(channel).lock().unwrap().window(n)
    }

    /// Samples currently buffered on a channel, capped at capacity.
    pub fn sample_count(&self, channel: Channel) -> usize {
        self.ring(channel).lock().unwrap().count
    }

    /// Sum of buffered samples across all channels.
    pub fn total_samples(&self) -> usize {
        Channel::ALL.iter().map(|&c| self.sample_count(c)).sum()
    }

    /// Drop all buffered samples on every channel. Used on reconnect so
    /// stale pre-disconnect data cannot feed the detectors.
    pub fn reset(&self) {
        for ring in &self.rings {
            ring.lock().unwrap().clear();
        }
    }
}
