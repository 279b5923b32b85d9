//! CR LF record splitter.
//!
//! The board terminates every frame with CR LF.  The splitter accumulates
//! incoming bytes and yields each complete record, terminator included.
//! This handles partial reads gracefully: a single channel read may hold
//! part of a record, exactly one, or several concatenated.

use heapless::Vec;
use log::warn;

/// Longest record accepted, terminator included.
pub const MAX_RECORD_LEN: usize = 64;

/// Record terminator.
pub const DELIMITER: [u8; 2] = [0x0d, 0x0a];

/// Streaming record splitter.
pub struct RecordSplitter {
    buf: Vec<u8, MAX_RECORD_LEN>,
    /// Set after an overflow; bytes are discarded until the next terminator.
    discarding: bool,
    last: u8,
}

impl Default for RecordSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSplitter {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
            last: 0,
        }
    }

    /// Feed bytes into the splitter, calling `on_record` for every
    /// complete record in arrival order.
    pub fn feed(&mut self, data: &[u8], mut on_record: impl FnMut(&[u8])) {
        for &byte in data {
            let terminated = self.last == DELIMITER[0] && byte == DELIMITER[1];
            self.last = byte;

            if self.discarding {
                if terminated {
                    self.discarding = false;
                    self.last = 0;
                }
                continue;
            }

            if self.buf.push(byte).is_err() {
                warn!("link: record exceeds {} bytes, discarding", MAX_RECORD_LEN);
                self.buf.clear();
                self.discarding = !terminated;
                // A CR that overflowed may still pair with the next LF.
                self.last = if terminated { 0 } else { byte };
                continue;
            }

            if terminated {
                on_record(&self.buf);
                self.buf.clear();
                self.last = 0;
            }
        }
    }

    /// Bytes held for an incomplete record.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial record (e.g. after the channel is reopened).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
        self.last = 0;
    }
}
