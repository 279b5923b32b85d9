//! Log-based sink adapters.
//!
//! [`LogEventSink`] writes structured bridge events to the `log` facade;
//! [`LogIngestionSink`] does the same for sample batches when no real
//! ingestion service is attached (the host binary).

use log::{info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::{EventSink, IngestionSink};
use crate::protocol::sample::SampleBatch;

/// Adapter that logs every [`BridgeEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Started { path } => {
                info!("START | port={}", path);
            }
            BridgeEvent::Stopped { close_error: None } => {
                info!("STOP  | clean");
            }
            BridgeEvent::Stopped {
                close_error: Some(e),
            } => {
                warn!("STOP  | {}", e);
            }
            BridgeEvent::Sample {
                sensor_id,
                value,
                battery_voltage,
            } => match battery_voltage {
                Some(v) => info!(
                    "SAMPLE| {} T={:.2}\u{00b0}C vbat={:.2}V",
                    sensor_id, value, v
                ),
                None => info!("SAMPLE| {} T={:.2}\u{00b0}C", sensor_id, value),
            },
            BridgeEvent::CommandSent { delivery } => {
                info!("CMD   | {:?}", delivery);
            }
            BridgeEvent::CommandSkipped(e) => {
                warn!("CMD   | skipped: {}", e);
            }
        }
    }
}

/// Ingestion sink that logs each batch as one JSON line.
#[derive(Debug, Default)]
pub struct LogIngestionSink {
    batches: u64,
}

impl LogIngestionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches seen so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }
}

impl IngestionSink for LogIngestionSink {
    fn read_frame(&mut self, batch: &SampleBatch<'_>) {
        self.batches += 1;
        match serde_json::to_string(batch) {
            Ok(json) => info!("INGEST| {}", json),
            Err(e) => warn!("INGEST| unserialisable batch: {}", e),
        }
    }
}
