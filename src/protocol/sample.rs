//! Typed readings produced from inbound frames.

use serde::Serialize;

/// Identity of the board's on-board DS18B20 probe.
pub const LOCAL_SENSOR_ID: &str = "LocalDS";

/// Prefix of every radio-linked remote probe identity.
pub const REMOTE_SENSOR_PREFIX: &str = "DRF5150";

/// Physical quantity carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Temperature,
}

/// Link diagnostics reported alongside a remote reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleMeta {
    /// Probe battery voltage (V).
    pub battery_voltage: f32,
    /// Raw radio signal byte, device-specific units.
    pub signal_strength: u8,
}

/// One reading, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSample {
    pub sensor_id: String,
    pub kind: SampleKind,
    /// Degrees Celsius, 1/16 resolution.
    pub value: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SampleMeta>,
    /// Capture time, milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
}

impl SensorSample {
    /// Reading from the on-board probe.
    pub fn local(value: f32, timestamp_ms: u64) -> Self {
        Self {
            sensor_id: LOCAL_SENSOR_ID.into(),
            kind: SampleKind::Temperature,
            value,
            meta: None,
            timestamp_ms,
        }
    }

    /// Reading from a remote probe addressed by its two id bytes.
    pub fn remote(id_high: u8, id_low: u8, value: f32, meta: SampleMeta, timestamp_ms: u64) -> Self {
        Self {
            sensor_id: format!("{REMOTE_SENSOR_PREFIX}-{id_high}-{id_low}"),
            kind: SampleKind::Temperature,
            value,
            meta: Some(meta),
            timestamp_ms,
        }
    }
}

/// A batch handed to the ingestion sink.
#[derive(Debug, Clone, Serialize)]
pub struct SampleBatch<'a> {
    pub reader: &'a str,
    pub samples: &'a [SensorSample],
}
