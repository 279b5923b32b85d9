//! Connection manager: sole owner of the serial channel.
//!
//! ```text
//!          start()            open ok
//!  Closed ─────────▶ Opening ─────────▶ Open
//!    ▲                  │ open err        │ stop()
//!    │◀─────────────────┘                 ▼
//!    └──────────────────────────────── Closing
//!              always (close err reported)
//! ```
//!
//! Inbound bytes are split into records, decoded one at a time in
//! arrival order, and acknowledged.  Outbound writes are at-most-once:
//! anything sent while the channel is not Open is dropped, never queued.

use log::{debug, info, warn};

use super::delimiter::RecordSplitter;
use super::transport::SerialChannel;
use crate::app::ports::Clock;
use crate::config::SerialSettings;
use crate::error::ConnectionError;
use crate::protocol::frame::FrameDecoder;
use crate::protocol::sample::SensorSample;

const READ_BUF_SIZE: usize = 256;

/// Lifecycle state of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// What happened to an outbound write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the open channel.
    Written,
    /// Channel not open; bytes discarded.
    Dropped,
}

/// Owns the channel, the record splitter and the frame decoder.
pub struct ConnectionManager<S: SerialChannel, C: Clock> {
    channel: S,
    settings: SerialSettings,
    state: ConnectionState,
    splitter: RecordSplitter,
    decoder: FrameDecoder<C>,
}

impl<S: SerialChannel, C: Clock> ConnectionManager<S, C> {
    pub fn new(channel: S, settings: SerialSettings, clock: C) -> Self {
        Self {
            channel,
            settings,
            state: ConnectionState::Closed,
            splitter: RecordSplitter::new(),
            decoder: FrameDecoder::new(clock),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    /// Borrow the channel (diagnostics and tests).
    pub fn channel(&self) -> &S {
        &self.channel
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open the channel and start routing inbound records.
    ///
    /// Fails with [`ConnectionError::AlreadyOpen`] unless Closed; the
    /// channel is not touched in that case.
    pub fn start(&mut self) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Closed {
            warn!("link: start while {:?}", self.state);
            return Err(ConnectionError::AlreadyOpen);
        }

        self.state = ConnectionState::Opening;
        match self.channel.open(&self.settings) {
            Ok(()) => {
                self.splitter.reset();
                self.state = ConnectionState::Open;
                info!(
                    "link: {} open @ {} baud",
                    self.settings.path, self.settings.baud_rate
                );
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                warn!("link: open {} failed: {}", self.settings.path, e);
                Err(ConnectionError::Open(e))
            }
        }
    }

    /// Stop routing and close the channel if it is open.
    ///
    /// Always ends Closed; a close failure is returned for reporting only.
    pub fn stop(&mut self) -> Result<(), ConnectionError> {
        self.splitter.reset();
        if self.state != ConnectionState::Open {
            self.state = ConnectionState::Closed;
            return Ok(());
        }

        self.state = ConnectionState::Closing;
        let result = self.channel.close();
        self.state = ConnectionState::Closed;

        match result {
            Ok(()) => {
                info!("link: {} closed", self.settings.path);
                Ok(())
            }
            Err(e) => {
                warn!("link: close {} failed: {}", self.settings.path, e);
                Err(ConnectionError::Close(e))
            }
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Write `data` if the channel is open, otherwise drop it.
    pub fn send(&mut self, data: &[u8]) -> Result<Delivery, ConnectionError> {
        if self.state != ConnectionState::Open {
            debug!("link: dropped {} bytes while {:?}", data.len(), self.state);
            return Ok(Delivery::Dropped);
        }
        self.channel.write(data).map_err(ConnectionError::Write)?;
        Ok(Delivery::Written)
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Route raw bytes from the channel: split, decode, acknowledge.
    ///
    /// Returns the samples decoded from every record completed by `data`.
    /// Ignored unless Open.
    pub fn on_bytes(&mut self, data: &[u8]) -> Vec<SensorSample> {
        let mut samples = Vec::new();
        if self.state != ConnectionState::Open {
            return samples;
        }

        let Self {
            channel,
            splitter,
            decoder,
            ..
        } = self;

        splitter.feed(data, |record| {
            if let Some(decoded) = decoder.decode(record) {
                if let Err(e) = channel.write(decoded.ack) {
                    warn!("link: ack write failed: {}", e);
                }
                samples.push(decoded.sample);
            }
        });
        samples
    }

    /// One non-blocking read from the channel, routed through [`on_bytes`](Self::on_bytes).
    pub fn poll(&mut self) -> Result<Vec<SensorSample>, ConnectionError> {
        if self.state != ConnectionState::Open {
            return Ok(Vec::new());
        }
        let mut buf = [0u8; READ_BUF_SIZE];
        let n = self.channel.read(&mut buf).map_err(ConnectionError::Read)?;
        Ok(self.on_bytes(&buf[..n]))
    }
}
