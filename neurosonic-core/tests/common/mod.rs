//! Shared helpers for the integration suites: a scripted transport the
//! tests can feed frames through, and synthetic signal generators.

#![allow(dead_code)]

use neurosonic_core::errors::TransportError;
use neurosonic_core::protocol::{Channel, FRAME_LEN};
use neurosonic_core::transport::{EegTransport, FrameCallback};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

type SharedCallback = Arc<Mutex<Option<FrameCallback>>>;

/// In-process transport: connects instantly and exposes its callback
/// through a [`TransportProbe`] so tests can inject frames.
pub struct ScriptedTransport {
    callback: SharedCallback,
    commands: Arc<Mutex<Vec<Vec<u8>>>>,
}

/// Test-side handle to a [`ScriptedTransport`] after it has been moved
/// into the pipeline.
#[derive(Clone)]
pub struct TransportProbe {
    callback: SharedCallback,
    commands: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, TransportProbe) {
        let callback: SharedCallback = Arc::new(Mutex::new(None));
        let commands = Arc::new(Mutex::new(Vec::new()));
        let probe = TransportProbe {
            callback: Arc::clone(&callback),
            commands: Arc::clone(&commands),
        };
        (Self { callback, commands }, probe)
    }
}

impl EegTransport for ScriptedTransport {
    fn on_frame(&mut self, callback: FrameCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn send_command(&mut self, command: &[u8]) -> Result<(), TransportError> {
        self.commands.lock().unwrap().push(command.to_vec());
        Ok(())
    }
}

impl TransportProbe {
    /// Deliver one raw frame as the headband would.
    pub fn feed_frame(&self, channel: Channel, frame: &[u8], timestamp: f64) {
        if let Some(callback) = self.callback.lock().unwrap().as_mut() {
            callback(channel, frame, timestamp);
        }
    }

    /// Control commands the pipeline has written so far.
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.commands.lock().unwrap().clone()
    }
}

/// A frame whose twelve samples all decode to the same 12-bit value.
pub fn constant_frame(raw: u16) -> Vec<u8> {
    assert!(raw <= 0xFFF);
    let mut frame = vec![0u8; 2];
    // Two 12-bit samples pack into three bytes.
    let packed = [
        (raw >> 4) as u8,
        (((raw & 0x0F) << 4) | (raw >> 8)) as u8,
        (raw & 0xFF) as u8,
    ];
    for _ in 0..6 {
        frame.extend_from_slice(&packed);
    }
    assert_eq!(frame.len(), FRAME_LEN);
    frame
}

/// Seeded Gaussian noise in microvolts.
pub fn gaussian_noise(n: usize, amplitude_uv: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| amplitude_uv * rng.sample::<f64, _>(StandardNormal))
        .collect()
}

/// Sine tone in microvolts, phase-continuous from `start_index`.
pub fn sine_from(freq: f64, amplitude_uv: f64, n: usize, start_index: usize, sample_rate: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = (start_index + i) as f64 / sample_rate as f64;
            amplitude_uv * (2.0 * PI * freq * t).sin()
        })
        .collect()
}
