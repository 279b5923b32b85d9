//! FlemDuino serial wire protocol.
//!
//! ```text
//!   board ──▶ "@C" tag … CR LF ──▶ frame ──▶ SensorSample
//!   board ◀── "*\n" ack ◀────────────┘
//!   board ◀── "@CS…/\n@CC…/\n@CT…/\n" ◀── command ◀── ControlState
//! ```
//!
//! Everything here is pure: no I/O, no state beyond an injected clock.

pub mod command;
pub mod fixed_point;
pub mod frame;
pub mod sample;
