//! Port traits: the boundary between the bridge core and its host.
//!
//! ```text
//!   StateStore ──▶ StateSync ──▶ ConnectionManager ──▶ SerialChannel
//!   IngestionSink ◀──────────── FrameDecoder ◀───────────┘
//! ```
//!
//! The host application implements these for its reactive store and its
//! sensor ingestion service.  The serial side is
//! [`SerialChannel`](crate::link::transport::SerialChannel).

use serde_json::Value;

use crate::protocol::sample::SampleBatch;

// ───────────────────────────────────────────────────────────────
// State store (driving adapter: host state → bridge)
// ───────────────────────────────────────────────────────────────

/// Opaque handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey(pub u32);

/// Publish/subscribe view of the host's reactive state.
///
/// Notifications are delivered by the host calling
/// [`BridgeService::on_state_change`](super::service::BridgeService::on_state_change);
/// the store only has to remember who listens to what.
pub trait StateStore {
    /// Register interest in `slices`.
    fn subscribe(&mut self, slices: &[&str]) -> SubscriptionKey;

    /// Release a key obtained from [`subscribe`](Self::subscribe).
    fn unsubscribe(&mut self, key: SubscriptionKey);

    /// Current value of `field` inside `slice`, if any.
    fn get(&self, slice: &str, field: &str) -> Option<Value>;
}

// ───────────────────────────────────────────────────────────────
// Ingestion sink (driven adapter: bridge → host sensor service)
// ───────────────────────────────────────────────────────────────

/// Receives decoded readings.
pub trait IngestionSink {
    fn read_frame(&mut self, batch: &SampleBatch<'_>);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: bridge → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for sample timestamps.
pub trait Clock {
    /// Milliseconds since the UNIX epoch.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
