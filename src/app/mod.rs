//! Application core: bridge orchestration, zero direct I/O.
//!
//! The serial channel, the host state store and the ingestion service
//! are reached only through the traits in [`ports`], keeping this layer
//! testable without a board attached.

pub mod events;
pub mod ports;
pub mod service;
pub mod sync;
