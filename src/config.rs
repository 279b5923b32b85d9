//! Bridge configuration parameters
//!
//! Everything the bridge needs to know about the serial line, the wire
//! revision spoken by the board, and where control values live in the
//! state store.  Loaded from JSON by the host binary.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::protocol::command::ProtocolRevision;

/// Location of one value inside the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceBinding {
    /// Slice name the bridge subscribes to.
    pub slice: String,
    /// Field read from that slice.
    pub field: String,
}

impl SliceBinding {
    pub fn new(slice: &str, field: &str) -> Self {
        Self {
            slice: slice.into(),
            field: field.into(),
        }
    }
}

/// Serial line settings handed to the channel on open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Device path (`/dev/ttyUSB0`, `COM7`, ...).
    pub path: String,
    /// Symbol rate.
    pub baud_rate: u32,
}

/// Core bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    // --- Serial line ---
    pub serial: SerialSettings,

    // --- Wire protocol ---
    /// Whether the target command carries hysteresis.
    pub protocol: ProtocolRevision,

    // --- Ingestion ---
    /// Reader identity attached to every sample batch.
    pub reader: String,

    // --- State store bindings ---
    /// Boolean on/off request.
    pub switch: SliceBinding,
    /// Current mean temperature of the zones.
    pub current_mean: SliceBinding,
    /// Scheduled target temperature.
    pub target: SliceBinding,
    /// Hysteresis field, read from the target slice.
    pub hysteresis_field: String,

    // --- Lifecycle ---
    /// Push the full control state right after a successful start.
    pub sync_on_start: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial: SerialSettings {
                path: "/dev/ttyUSB0".into(),
                baud_rate: 115_200,
            },

            protocol: ProtocolRevision::TargetOnly,

            reader: "FlemDuino".into(),

            switch: SliceBinding::new("Switcher", "realValue"),
            current_mean: SliceBinding::new("ZonesMean", "temperature"),
            target: SliceBinding::new("ScheduleTarget", "temperature"),
            hysteresis_field: "hysteresis".into(),

            sync_on_start: true,
        }
    }
}

impl BridgeConfig {
    /// Slice names the bridge subscribes to, in switch/mean/target order.
    pub fn slices(&self) -> [&str; 3] {
        [
            &self.switch.slice,
            &self.current_mean.slice,
            &self.target.slice,
        ]
    }

    /// Reject configurations that cannot possibly work.
    pub fn validate(&self) -> Result<(), Error> {
        if self.serial.path.is_empty() {
            return Err(Error::Config("serial.path must not be empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(Error::Config("serial.baud_rate must be non-zero"));
        }
        if self.reader.is_empty() {
            return Err(Error::Config("reader must not be empty"));
        }
        for slice in self.slices() {
            if slice.is_empty() {
                return Err(Error::Config("slice names must not be empty"));
            }
        }
        Ok(())
    }
}
