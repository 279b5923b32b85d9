//! Byte channel abstraction: the serial line to the board.
//!
//! Concrete implementations:
//! - `serialport` device (feature `host`)
//! - in-memory loopback in tests
//!
//! The [`ConnectionManager`](super::connection::ConnectionManager) is
//! generic over `SerialChannel` and is the only thing that touches it.

use crate::config::SerialSettings;
use crate::error::ChannelError;

/// Open/read/write/close byte channel.
pub trait SerialChannel {
    /// Open the device.  Called at most once per start.
    fn open(&mut self, settings: &SerialSettings) -> Result<(), ChannelError>;

    /// Close the device.
    fn close(&mut self) -> Result<(), ChannelError>;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), ChannelError>;
}

/// A null channel that opens, discards all writes and never reads.
/// Useful as a placeholder when no board is attached.
pub struct NullChannel;

impl SerialChannel for NullChannel {
    fn open(&mut self, _settings: &SerialSettings) -> Result<(), ChannelError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ChannelError> {
        Ok(0)
    }

    fn write(&mut self, _data: &[u8]) -> Result<(), ChannelError> {
        Ok(())
    }
}
