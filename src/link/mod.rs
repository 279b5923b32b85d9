//! Serial link to the board.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────────┐
//! │ SerialChannel│──▶│RecordSplitter│──▶│ FrameDecoder → ack │
//! │   (trait)    │◀──┴──────────────┴───│ ConnectionManager  │
//! └──────────────┘        send()        └────────────────────┘
//! ```

pub mod connection;
pub mod delimiter;
pub mod transport;
