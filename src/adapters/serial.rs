//! Host serial port adapter (feature `host`).
//!
//! Implements [`SerialChannel`] over the `serialport` crate.  Reads use a
//! short timeout so [`ConnectionManager::poll`](crate::link::connection::ConnectionManager::poll)
//! never blocks the caller for long; a timeout reads as "no data".

use std::io::{self, Read, Write};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::config::SerialSettings;
use crate::error::ChannelError;
use crate::link::transport::SerialChannel;

/// Read timeout; also the granularity of the host poll loop.
const READ_TIMEOUT: Duration = Duration::from_millis(20);

#[derive(Default)]
pub struct SerialPortChannel {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

fn map_serial_error(e: &serialport::Error) -> ChannelError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => ChannelError::NotFound,
        serialport::ErrorKind::Io(kind) => map_io_kind(kind),
        _ => ChannelError::Io,
    }
}

fn map_io_kind(kind: io::ErrorKind) -> ChannelError {
    match kind {
        io::ErrorKind::NotFound => ChannelError::NotFound,
        io::ErrorKind::PermissionDenied => ChannelError::PermissionDenied,
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => ChannelError::Disconnected,
        _ => ChannelError::Io,
    }
}

impl SerialChannel for SerialPortChannel {
    fn open(&mut self, settings: &SerialSettings) -> Result<(), ChannelError> {
        let port = serialport::new(&settings.path, settings.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| {
                debug!("serial: open {}: {}", settings.path, e);
                map_serial_error(&e)
            })?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        // Dropping the handle closes the device; flush first so pending
        // commands are not lost.
        match self.port.take() {
            Some(mut port) => port.flush().map_err(|e| map_io_kind(e.kind())),
            None => Ok(()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let port = self.port.as_mut().ok_or(ChannelError::Disconnected)?;
        match port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(map_io_kind(e.kind())),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        let port = self.port.as_mut().ok_or(ChannelError::Disconnected)?;
        port.write_all(data).map_err(|e| map_io_kind(e.kind()))
    }
}
