//! Outbound control commands.
//!
//! ```text
//! @CSP01I/\n            switch on   (O = off)
//! @CCP02<mean:2>/\n     current zone mean
//! @CTP02<target:2>/\n   target                 (TargetOnly)
//! @CTP04<t:2><h:2>/\n   target + hysteresis    (TargetWithHysteresis)
//! ```
//!
//! Lines are always concatenated switch → mean → target; the board splits
//! a single write on that order.

use serde::{Deserialize, Serialize};

use super::fixed_point::encode_fixed_point;
use crate::error::EncodeError;

const SWITCH_ON: &[u8] = b"@CSP01I/\n";
const SWITCH_OFF: &[u8] = b"@CSP01O/\n";
const MEAN_PREFIX: &[u8] = b"@CCP02";
const TARGET_PREFIX: &[u8] = b"@CTP02";
const TARGET_HYST_PREFIX: &[u8] = b"@CTP04";
const LINE_END: &[u8] = b"/\n";

/// Which target command layout the board firmware understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolRevision {
    /// `@CTP02` carrying only the target.
    #[default]
    TargetOnly,
    /// `@CTP04` carrying target then hysteresis.
    TargetWithHysteresis,
}

/// Desired device state read from the store at render time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    pub switch: bool,
    pub current_mean: Option<f32>,
    pub target: Option<f32>,
    /// Only transmitted by [`ProtocolRevision::TargetWithHysteresis`]; 0 when absent.
    pub hysteresis: Option<f32>,
}

/// Renders [`ControlState`] snapshots into wire bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandEncoder {
    revision: ProtocolRevision,
}

impl CommandEncoder {
    pub fn new(revision: ProtocolRevision) -> Self {
        Self { revision }
    }

    pub fn revision(&self) -> ProtocolRevision {
        self.revision
    }

    /// Render every line for `state`.
    ///
    /// Fails as a whole if any value is out of range, so a corrupt payload
    /// never reaches the wire.
    pub fn encode(&self, state: &ControlState) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::with_capacity(32);
        out.extend_from_slice(switch_line(state.switch));
        if let Some(mean) = state.current_mean {
            mean_line(mean, &mut out)?;
        }
        if let Some(target) = state.target {
            self.target_line(target, state.hysteresis.unwrap_or(0.0), &mut out)?;
        }
        Ok(out)
    }

    fn target_line(&self, target: f32, hysteresis: f32, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let target = encode_fixed_point(target)?;
        match self.revision {
            ProtocolRevision::TargetOnly => {
                out.extend_from_slice(TARGET_PREFIX);
                out.extend_from_slice(&target);
            }
            ProtocolRevision::TargetWithHysteresis => {
                let hysteresis = encode_fixed_point(hysteresis)?;
                out.extend_from_slice(TARGET_HYST_PREFIX);
                out.extend_from_slice(&target);
                out.extend_from_slice(&hysteresis);
            }
        }
        out.extend_from_slice(LINE_END);
        Ok(())
    }
}

/// The fixed switch line.
pub fn switch_line(on: bool) -> &'static [u8] {
    if on { SWITCH_ON } else { SWITCH_OFF }
}

fn mean_line(mean: f32, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let mean = encode_fixed_point(mean)?;
    out.extend_from_slice(MEAN_PREFIX);
    out.extend_from_slice(&mean);
    out.extend_from_slice(LINE_END);
    Ok(())
}
