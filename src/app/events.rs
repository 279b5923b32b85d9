//! Outbound bridge events.
//!
//! The [`BridgeService`](super::service::BridgeService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::error::{ConnectionError, Error};
use crate::link::connection::Delivery;

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Channel open and subscriptions in place.
    Started { path: String },

    /// Channel closed.  Carries the close failure, if any.
    Stopped { close_error: Option<ConnectionError> },

    /// A sample was decoded and forwarded.
    Sample {
        sensor_id: String,
        value: f32,
        battery_voltage: Option<f32>,
    },

    /// A control command was rendered and handed to the channel.
    CommandSent { delivery: Delivery },

    /// A control command could not be sent this tick.
    CommandSkipped(Error),
}
