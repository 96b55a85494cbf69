//! Neurosonic error types with granular categories

use thiserror::Error;

/// Top-level error type for all Neurosonic operations
#[derive(Debug, Error)]
pub enum NeurosonicError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Frame decoding errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Frame too short: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },
}

/// Configuration errors
///
/// Raised at construction time; a detector or filter built from an
/// out-of-range tunable never comes into existence.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid threshold: {value} (must be finite and > 0)")]
    InvalidThreshold { value: f64 },

    #[error("Invalid window: {seconds} s (must be finite and > 0)")]
    InvalidWindow { seconds: f64 },

    #[error("Invalid debounce: {seconds} s (must be finite and >= 0)")]
    InvalidDebounce { seconds: f64 },

    #[error("Invalid band: {low}-{high} Hz with Nyquist at {nyquist} Hz")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },

    #[error("Hysteresis thresholds inverted: entry {entry} must exceed exit {exit}")]
    InvalidHysteresis { entry: f64, exit: f64 },

    #[error("Invalid update interval: {seconds} s (must be finite and > 0)")]
    InvalidUpdateInterval { seconds: f64 },

    #[error("Invalid buffer duration: {seconds} s (must be finite and > 0)")]
    InvalidBufferDuration { seconds: f64 },

    #[error("Invalid control interval: {seconds} s (must be finite and > 0)")]
    InvalidControlInterval { seconds: f64 },

    #[error("Invalid base frequency range: {low}-{high} Hz")]
    InvalidFrequencyRange { low: f64, high: f64 },

    #[error("Invalid master volume: {value} (must be in [0, 1])")]
    InvalidMasterVolume { value: f64 },

    #[error("Invalid audio block size: {frames} frames (must be > 0)")]
    InvalidBlockSize { frames: usize },

    #[error("Invalid decay: {seconds} s (must be finite and > 0)")]
    InvalidDecay { seconds: f64 },

    #[error("Invalid retry policy: {retries} retries with {delay_secs} s delay")]
    InvalidRetryPolicy { retries: u32, delay_secs: f64 },
}

/// Transport (headband link) errors
///
/// Produced by `EegTransport` implementations and by the pipeline's
/// bounded connect-retry loop. Only these are fatal to a session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Device {name:?} not found within {timeout_secs} s scan window")]
    DeviceNotFound { name: String, timeout_secs: f64 },

    #[error("Connection failed after {attempts} attempts: {reason}")]
    ConnectFailed { attempts: u32, reason: String },

    #[error("Transport disconnected: {reason}")]
    Disconnected { reason: String },

    #[error("Control command write failed: {reason}")]
    CommandFailed { reason: String },
}

/// Audio backend errors
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio backend failed to start: {reason}")]
    StartFailed { reason: String },

    #[error("Audio backend failed to stop: {reason}")]
    StopFailed { reason: String },

    #[error("Audio block write failed: {reason}")]
    WriteFailed { reason: String },
}

/// Result type alias for Neurosonic operations
pub type Result<T> = std::result::Result<T, NeurosonicError>;
