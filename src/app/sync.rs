//! State synchronisation: store slices in, control commands out.
//!
//! [`StateSync`] holds the one subscription the bridge keeps on the
//! host store.  Any notification touching the switch, mean or target
//! slice re-reads all three, renders a fresh command and hands it to the
//! connection.  Decoded samples travel the other way, into the host's
//! ingestion sink as single-sample batches.

use log::{debug, info, warn};
use serde_json::Value;

use super::ports::{Clock, IngestionSink, StateStore, SubscriptionKey};
use crate::config::{BridgeConfig, SliceBinding};
use crate::error::Result;
use crate::link::connection::{ConnectionManager, Delivery};
use crate::link::transport::SerialChannel;
use crate::protocol::command::{CommandEncoder, ControlState};
use crate::protocol::sample::{SampleBatch, SensorSample};

pub struct StateSync {
    encoder: CommandEncoder,
    switch: SliceBinding,
    current_mean: SliceBinding,
    target: SliceBinding,
    hysteresis_field: String,
    reader: String,
    subscription: Option<SubscriptionKey>,
}

impl StateSync {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            encoder: CommandEncoder::new(config.protocol),
            switch: config.switch.clone(),
            current_mean: config.current_mean.clone(),
            target: config.target.clone(),
            hysteresis_field: config.hysteresis_field.clone(),
            reader: config.reader.clone(),
            subscription: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Subscribe to the three bound slices.  A second call without
    /// [`stop`](Self::stop) keeps the existing subscription.
    pub fn start(&mut self, store: &mut impl StateStore) -> SubscriptionKey {
        if let Some(key) = self.subscription {
            warn!("sync: already subscribed ({:?})", key);
            return key;
        }
        let key = store.subscribe(&[
            self.switch.slice.as_str(),
            self.current_mean.slice.as_str(),
            self.target.slice.as_str(),
        ]);
        info!("sync: subscribed {:?}", key);
        self.subscription = Some(key);
        key
    }

    /// Release the subscription.  Returns `false` if there was none.
    pub fn stop(&mut self, store: &mut impl StateStore) -> bool {
        match self.subscription.take() {
            Some(key) => {
                store.unsubscribe(key);
                info!("sync: unsubscribed {:?}", key);
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether a change to `slice` affects the rendered command.
    pub fn watches(&self, slice: &str) -> bool {
        slice == self.switch.slice || slice == self.current_mean.slice || slice == self.target.slice
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Snapshot the control values currently in the store.
    pub fn read_state(&self, store: &impl StateStore) -> ControlState {
        ControlState {
            switch: store
                .get(&self.switch.slice, &self.switch.field)
                .is_some_and(|v| truthy(&v)),
            current_mean: number(store.get(&self.current_mean.slice, &self.current_mean.field)),
            target: number(store.get(&self.target.slice, &self.target.field)),
            hysteresis: number(store.get(&self.target.slice, &self.hysteresis_field)),
        }
    }

    /// Render and send the full control state.
    ///
    /// An unrepresentable value fails the tick before anything is written.
    pub fn push_all<S: SerialChannel, C: Clock>(
        &self,
        store: &impl StateStore,
        conn: &mut ConnectionManager<S, C>,
    ) -> Result<Delivery> {
        let state = self.read_state(store);
        let bytes = self.encoder.encode(&state)?;
        debug!("sync: {:?} -> {} bytes", state, bytes.len());
        Ok(conn.send(&bytes)?)
    }

    /// React to a store notification for `slice`.
    ///
    /// `Ok(None)` when the slice is not watched or the sync is stopped.
    pub fn on_state_change<S: SerialChannel, C: Clock>(
        &self,
        slice: &str,
        store: &impl StateStore,
        conn: &mut ConnectionManager<S, C>,
    ) -> Result<Option<Delivery>> {
        if !self.is_subscribed() || !self.watches(slice) {
            return Ok(None);
        }
        self.push_all(store, conn).map(Some)
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Hand one decoded sample to the ingestion sink.
    pub fn forward(&self, sample: SensorSample, sink: &mut impl IngestionSink) {
        let samples = [sample];
        sink.read_frame(&SampleBatch {
            reader: &self.reader,
            samples: &samples,
        });
    }
}

/// Loose truthiness: `true`, non-zero numbers and non-empty strings.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number(v: Option<Value>) -> Option<f32> {
    v.and_then(|v| v.as_f64()).map(|f| f as f32)
}
