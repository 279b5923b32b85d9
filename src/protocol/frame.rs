//! Inbound frame parsing and sample decoding.
//!
//! Wire format of one record, as delivered by the record splitter:
//! ```text
//! ┌──────┬──────┬─────┬──────────────┬─────────────┬────┬────┐
//! │ 0x40 │ 0x43 │ tag │ reserved (3) │ payload (N) │ CR │ LF │
//! └──────┴──────┴─────┴──────────────┴─────────────┴────┴────┘
//! ```
//!
//! | Tag  | Source | Payload                                        |
//! |------|--------|------------------------------------------------|
//! | 0x4c | Local  | temp (LE u16 /16)                              |
//! | 0x52 | Remote | id_hi, id_lo, temp (LE u16 /16), vbat, signal  |
//!
//! Every frame that decodes into a sample must be acknowledged with
//! [`ACK`]; anything else is dropped silently.

use log::{debug, trace};

use super::fixed_point::{decode_byte, decode_fixed_point};
use super::sample::{SampleMeta, SensorSample};
use crate::app::ports::Clock;
use crate::error::FrameError;

/// Leading marker bytes (`@C`).
pub const MARKER: [u8; 2] = [0x40, 0x43];

/// Acknowledgment written back after every decoded frame (`*\n`).
pub const ACK: &[u8] = &[0x2a, 0x0a];

/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = 6;

/// Trailing line terminator length (CR LF).
pub const TERMINATOR_LEN: usize = 2;

/// Smallest record that has a header and a terminator.
const MIN_RECORD_LEN: usize = PAYLOAD_OFFSET + TERMINATOR_LEN;

const LOCAL_PAYLOAD_LEN: usize = 2;
const REMOTE_PAYLOAD_LEN: usize = 6;

/// Battery calibration: `raw / 100 + 2` volts.
const VBAT_DIVISOR: f32 = 100.0;
const VBAT_OFFSET: f32 = 2.0;

/// Semantic type of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTag {
    /// On-board probe.
    Local,
    /// Radio-linked probe.
    Remote,
    /// Anything else; never yields a sample.
    Unknown(u8),
}

impl CommandTag {
    pub const LOCAL: u8 = 0x4c;
    pub const REMOTE: u8 = 0x52;
}

impl From<u8> for CommandTag {
    fn from(byte: u8) -> Self {
        match byte {
            Self::LOCAL => Self::Local,
            Self::REMOTE => Self::Remote,
            other => Self::Unknown(other),
        }
    }
}

/// A structurally checked view over one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub tag: CommandTag,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Check the marker and split off header and terminator.
    ///
    /// Does not look at the tag beyond classifying it.
    pub fn parse(raw: &'a [u8]) -> Result<Self, FrameError> {
        if raw.len() < MARKER.len() || raw[..MARKER.len()] != MARKER {
            return Err(FrameError::BadMarker);
        }
        if raw.len() < MIN_RECORD_LEN {
            return Err(FrameError::TooShort {
                needed: MIN_RECORD_LEN,
                got: raw.len(),
            });
        }
        Ok(Self {
            tag: CommandTag::from(raw[2]),
            payload: &raw[PAYLOAD_OFFSET..raw.len() - TERMINATOR_LEN],
        })
    }

    fn field(&self, at: usize) -> [u8; 2] {
        [self.payload[at], self.payload[at + 1]]
    }

    /// Fail with `TooShort` unless the payload holds `len` bytes.
    fn require(&self, len: usize) -> Result<(), FrameError> {
        if self.payload.len() < len {
            return Err(FrameError::TooShort {
                needed: PAYLOAD_OFFSET + len + TERMINATOR_LEN,
                got: PAYLOAD_OFFSET + self.payload.len() + TERMINATOR_LEN,
            });
        }
        Ok(())
    }

    /// Map the frame to a sample stamped with `timestamp_ms`.
    pub fn to_sample(&self, timestamp_ms: u64) -> Result<SensorSample, FrameError> {
        match self.tag {
            CommandTag::Local => {
                self.require(LOCAL_PAYLOAD_LEN)?;
                Ok(SensorSample::local(
                    decode_fixed_point(self.field(0)),
                    timestamp_ms,
                ))
            }
            CommandTag::Remote => {
                self.require(REMOTE_PAYLOAD_LEN)?;
                let meta = SampleMeta {
                    battery_voltage: f32::from(decode_byte(self.payload[4])) / VBAT_DIVISOR
                        + VBAT_OFFSET,
                    signal_strength: decode_byte(self.payload[5]),
                };
                Ok(SensorSample::remote(
                    decode_byte(self.payload[0]),
                    decode_byte(self.payload[1]),
                    decode_fixed_point(self.field(2)),
                    meta,
                    timestamp_ms,
                ))
            }
            CommandTag::Unknown(b) => Err(FrameError::UnknownTag(b)),
        }
    }
}

/// A decoded frame and the bytes that must be written back for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub sample: SensorSample,
    pub ack: &'static [u8],
}

/// Stateless record decoder; timestamps come from the injected clock.
pub struct FrameDecoder<C: Clock> {
    clock: C,
}

impl<C: Clock> FrameDecoder<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Decode one record, reporting why it was rejected.
    pub fn try_decode(&self, raw: &[u8]) -> Result<SensorSample, FrameError> {
        let frame = Frame::parse(raw)?;
        frame.to_sample(self.clock.now_ms())
    }

    /// Decode one record.  `Some` exactly when the device must be acknowledged.
    pub fn decode(&self, raw: &[u8]) -> Option<Decoded> {
        match self.try_decode(raw) {
            Ok(sample) => {
                trace!("frame: {} = {:.4}", sample.sensor_id, sample.value);
                Some(Decoded { sample, ack: ACK })
            }
            Err(FrameError::BadMarker) => {
                trace!("frame: dropped {} bytes without marker", raw.len());
                None
            }
            Err(e) => {
                debug!("frame: dropped ({})", e);
                None
            }
        }
    }
}
