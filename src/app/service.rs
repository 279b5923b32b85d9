//! Bridge service: composes the connection and the state sync.
//!
//! [`BridgeService`] owns the [`ConnectionManager`] and [`StateSync`]
//! and exposes the lifecycle the host drives.  Store, ingestion sink and
//! event sink are passed in at each call, so the whole service runs
//! against mock adapters in tests.
//!
//! ```text
//!  StateStore ──▶ ┌──────────────────────────┐ ──▶ IngestionSink
//!                 │      BridgeService        │
//! SerialChannel ◀─│ ConnectionManager · Sync  │ ──▶ EventSink
//!                 └──────────────────────────┘
//! ```

use log::warn;

use super::events::BridgeEvent;
use super::ports::{Clock, EventSink, IngestionSink, StateStore};
use super::sync::StateSync;
use crate::config::BridgeConfig;
use crate::error::{ConnectionError, Result};
use crate::link::connection::{ConnectionManager, ConnectionState, Delivery};
use crate::link::transport::SerialChannel;
use crate::protocol::sample::SensorSample;

pub struct BridgeService<S: SerialChannel, C: Clock> {
    conn: ConnectionManager<S, C>,
    sync: StateSync,
    sync_on_start: bool,
}

impl<S: SerialChannel, C: Clock> BridgeService<S, C> {
    /// Construct the service.  Does **not** open the channel; call
    /// [`start`](Self::start) next.
    pub fn new(config: &BridgeConfig, channel: S, clock: C) -> Self {
        Self {
            conn: ConnectionManager::new(channel, config.serial.clone(), clock),
            sync: StateSync::new(config),
            sync_on_start: config.sync_on_start,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    pub fn connection(&self) -> &ConnectionManager<S, C> {
        &self.conn
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open the channel, subscribe to the store and push the initial
    /// control state.
    ///
    /// An open failure leaves the service inactive and unsubscribed.
    /// A failed initial push is reported as an event only.
    pub fn start(
        &mut self,
        store: &mut impl StateStore,
        events: &mut impl EventSink,
    ) -> core::result::Result<(), ConnectionError> {
        self.conn.start()?;
        self.sync.start(store);
        events.emit(&BridgeEvent::Started {
            path: self.conn.settings().path.clone(),
        });

        if self.sync_on_start {
            let pushed = self.sync.push_all(&*store, &mut self.conn);
            report_push(&pushed, events);
        }
        Ok(())
    }

    /// Unsubscribe and close.  Always completes; the close error, if any,
    /// is returned for reporting.
    pub fn stop(
        &mut self,
        store: &mut impl StateStore,
        events: &mut impl EventSink,
    ) -> core::result::Result<(), ConnectionError> {
        self.sync.stop(store);
        let result = self.conn.stop();
        events.emit(&BridgeEvent::Stopped {
            close_error: result.err(),
        });
        result
    }

    // ── Event handling ────────────────────────────────────────

    /// Store notification for `slice`.
    pub fn on_state_change(
        &mut self,
        slice: &str,
        store: &impl StateStore,
        events: &mut impl EventSink,
    ) -> Result<Option<Delivery>> {
        let result = self.sync.on_state_change(slice, store, &mut self.conn);
        match result {
            Ok(Some(delivery)) => report_push(&Ok(delivery), events),
            Err(e) => report_push(&Err(e), events),
            Ok(None) => {}
        }
        result
    }

    /// Read whatever the channel has, forward every decoded sample.
    ///
    /// Returns the number of samples forwarded.
    pub fn poll(
        &mut self,
        sink: &mut impl IngestionSink,
        events: &mut impl EventSink,
    ) -> core::result::Result<usize, ConnectionError> {
        let samples = self.conn.poll()?;
        Ok(self.forward_all(samples, sink, events))
    }

    /// Push bytes delivered by an event-driven channel.
    pub fn on_bytes(
        &mut self,
        data: &[u8],
        sink: &mut impl IngestionSink,
        events: &mut impl EventSink,
    ) -> usize {
        let samples = self.conn.on_bytes(data);
        self.forward_all(samples, sink, events)
    }

    fn forward_all(
        &self,
        samples: Vec<SensorSample>,
        sink: &mut impl IngestionSink,
        events: &mut impl EventSink,
    ) -> usize {
        let count = samples.len();
        for sample in samples {
            events.emit(&BridgeEvent::Sample {
                sensor_id: sample.sensor_id.clone(),
                value: sample.value,
                battery_voltage: sample.meta.map(|m| m.battery_voltage),
            });
            self.sync.forward(sample, sink);
        }
        count
    }
}

fn report_push(result: &Result<Delivery>, events: &mut impl EventSink) {
    match result {
        Ok(delivery) => events.emit(&BridgeEvent::CommandSent {
            delivery: *delivery,
        }),
        Err(e) => {
            warn!("bridge: command skipped: {}", e);
            events.emit(&BridgeEvent::CommandSkipped(*e));
        }
    }
}
