//! FlemDuino bridge library.
//!
//! Connects a host application's reactive state store to the FlemDuino
//! sensor/actuator board over a serial line: temperature frames in,
//! switch/mean/target commands out.  The serial port is feature-gated
//! (`host`); everything else builds and tests without hardware.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod link;
pub mod protocol;

mod error;

pub use error::{ChannelError, ConnectionError, EncodeError, Error, FrameError, Result};
