//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements                | Connects to           |
//! |----------------|---------------------------|-----------------------|
//! | `log_sink`     | EventSink, IngestionSink  | `log` output          |
//! | `memory_store` | StateStore                | in-process map        |
//! | `serial`       | SerialChannel             | `serialport` device   |
//! | `time`         | Clock                     | system wall clock     |

pub mod log_sink;
pub mod memory_store;
#[cfg(feature = "host")]
pub mod serial;
pub mod time;
