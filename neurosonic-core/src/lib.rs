//! Neurosonic core library
//!
//! The dataflow spine of a brain-to-audio instrument: decode bit-packed
//! transport frames from a 4-channel EEG headband, buffer samples per
//! channel, detect neurophysiological events (blinks, jaw clenches,
//! alpha bursts), estimate band powers, and map both onto a sound
//! synthesis parameter record at soft-real-time cadence.
//!
//! The modules mirror the pipeline, leaves first: [`protocol`] (frame
//! decoding) → [`store`] (ring buffers) → [`dsp`] (filters and band
//! powers) → [`events`] (detectors and bus) → [`mapping`] → [`synth`] →
//! [`pipeline`] (the orchestrating control loop). The BLE transport and
//! the audio backend stay outside the core behind the [`transport`] and
//! [`synth::output`] seams.

pub mod config;
pub mod dsp;
pub mod errors;
pub mod events;
pub mod mapping;
pub mod pipeline;
pub mod protocol;
pub mod store;
pub mod synth;
pub mod transport;

pub use config::PipelineConfig;
pub use errors::{NeurosonicError, Result};
pub use events::{Event, EventBus, EventDetector, EventType};
pub use mapping::ParameterMapper;
pub use pipeline::{Pipeline, PipelineHandle};
pub use protocol::{decode_frame, Channel, SAMPLE_RATE};
pub use store::SampleStore;
pub use synth::{AudioSink, BlockQueueSink, SoundParameters};
pub use transport::EegTransport;
