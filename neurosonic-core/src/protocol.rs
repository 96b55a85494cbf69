//! Muse 2 wire protocol: channel identifiers, GATT UUIDs, control
//! commands, and transport frame decoding.
//!
//! A transport frame is 20 bytes: a 2-byte header followed by 18 bytes
//! carrying twelve 12-bit unsigned samples packed MSB-first. Samples
//! scale to microvolts by 2000/4096.

use crate::errors::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EEG sampling rate of the headband, fixed by the device firmware.
pub const SAMPLE_RATE: usize = 256;

/// Number of samples carried by one transport frame.
pub const SAMPLES_PER_FRAME: usize = 12;

/// Transport frame length in bytes (header + packed payload).
pub const FRAME_LEN: usize = 20;

/// Header bytes at the front of each frame; carry no sample payload.
const HEADER_LEN: usize = 2;

/// Microvolts per raw 12-bit count (2000 / 4096).
pub const SCALE_FACTOR: f64 = 0.48828125;

/// Control command: start streaming ('d').
pub const CMD_RESUME: [u8; 3] = [0x02, 0x64, 0x0A];

/// Control command: stop streaming ('h').
pub const CMD_HALT: [u8; 3] = [0x02, 0x68, 0x0A];

/// GATT characteristic for control commands.
pub const CONTROL_UUID: &str = "273e0001-4c4d-454d-96be-f03bac821358";

/// The four EEG electrode channels of the headband.
///
/// The identifier space is closed; an unknown channel is a programming
/// error, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Tp9,
    Af7,
    Af8,
    Tp10,
}

impl Channel {
    /// All channels in electrode order (left ear, forehead, right ear).
    pub const ALL: [Channel; 4] = [Channel::Tp9, Channel::Af7, Channel::Af8, Channel::Tp10];

    /// Dense index for array-backed per-channel storage.
    pub const fn index(self) -> usize {
        match self {
            Channel::Tp9 => 0,
            Channel::Af7 => 1,
            Channel::Af8 => 2,
            Channel::Tp10 => 3,
        }
    }

    /// Electrode name as printed on the headband.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Tp9 => "TP9",
            Channel::Af7 => "AF7",
            Channel::Af8 => "AF8",
            Channel::Tp10 => "TP10",
        }
    }

    /// GATT characteristic UUID the transport subscribes to for this channel.
    pub const fn uuid(self) -> &'static str {
        match self {
            Channel::Tp9 => "273e0003-4c4d-454d-96be-f03bac821358",
            Channel::Af7 => "273e0004-4c4d-454d-96be-f03bac821358",
            Channel::Af8 => "273e0005-4c4d-454d-96be-f03bac821358",
            Channel::Tp10 => "273e0006-4c4d-454d-96be-f03bac821358",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode a transport frame into twelve calibrated microvolt samples.
///
/// Bytes 0-1 are header and discarded. The next 18 bytes form a 144-bit
/// stream read 12 bits at a time, MSB-first. Bytes beyond `FRAME_LEN`
/// are ignored; frames shorter than `FRAME_LEN` fail.
///
/// Purely functional: the same frame always decodes to the same samples.
pub fn decode_frame(frame: &[u8]) -> Result<[f64; SAMPLES_PER_FRAME], DecodeError> {
    if frame.len() < FRAME_LEN {
        return Err(DecodeError::ShortFrame {
            expected: FRAME_LEN,
            actual: frame.len(),
        });
    }

    let mut samples = [0.0f64; SAMPLES_PER_FRAME];
    let mut bit_buffer: u32 = 0;
    let mut bit_count: u32 = 0;
    let mut out = 0;

    for &byte in &frame[HEADER_LEN..FRAME_LEN] {
        bit_buffer = (bit_buffer << 8) | u32::from(byte);
        bit_count += 8;
        while bit_count >= 12 {
            bit_count -= 12;
            let raw = (bit_buffer >> bit_count) & 0xFFF;
            samples[out] = f64::from(raw) * SCALE_FACTOR;
            out += 1;
        }
    }

    debug_assert_eq!(out, SAMPLES_PER_FRAME);
    Ok(samples)
}
