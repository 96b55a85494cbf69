//! Transport seam: the headband link consumed by the pipeline.
//!
//! The BLE stack itself lives outside the core. Implementations scan,
//! connect, subscribe to the per-channel characteristics (see
//! [`Channel::uuid`](crate::protocol::Channel::uuid)), and invoke the
//! registered callback once per received frame from their own thread.

use crate::errors::TransportError;
use crate::protocol::Channel;

/// Invoked for each received frame: (channel, raw frame bytes,
/// monotonic timestamp in seconds). Runs on the transport's thread.
pub type FrameCallback = Box<dyn FnMut(Channel, &[u8], f64) + Send>;

/// Headband transport lifecycle.
pub trait EegTransport: Send {
    /// Register the frame callback. Must be called before `connect`.
    fn on_frame(&mut self, callback: FrameCallback);

    /// Scan for and connect to the device. One attempt; the pipeline
    /// owns the retry policy.
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Stop streaming and tear the link down. Idempotent.
    fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Write an opaque control command (see
    /// [`CMD_RESUME`](crate::protocol::CMD_RESUME) /
    /// [`CMD_HALT`](crate::protocol::CMD_HALT)) to the control
    /// characteristic.
    fn send_command(&mut self, command: &[u8]) -> Result<(), TransportError>;
}
