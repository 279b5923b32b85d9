//! Unified error types for the FlemDuino bridge.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! orchestrator handles failures uniformly.  Every variant is `Copy`;
//! nothing here allocates.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level bridge error
// ---------------------------------------------------------------------------

/// Every fallible operation in the bridge funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Connection lifecycle or I/O failure.
    Connection(ConnectionError),
    /// An inbound record is not a usable frame.
    Frame(FrameError),
    /// A control value cannot be represented on the wire.
    Encode(EncodeError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Byte channel errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`SerialChannel`](crate::link::transport::SerialChannel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The device path does not exist.
    NotFound,
    /// The device exists but cannot be opened.
    PermissionDenied,
    /// The device went away (unplugged, reset).
    Disconnected,
    /// Any other I/O failure.
    Io,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "device not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Disconnected => write!(f, "device disconnected"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ChannelError {}

// ---------------------------------------------------------------------------
// Connection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    /// `start()` called while the channel is not closed.
    AlreadyOpen,
    /// The channel could not be opened.  Fatal for that start attempt.
    Open(ChannelError),
    /// The channel refused to close.  The manager is Closed regardless.
    Close(ChannelError),
    /// A write on an open channel failed.
    Write(ChannelError),
    /// A read on an open channel failed.
    Read(ChannelError),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyOpen => write!(f, "channel already open"),
            Self::Open(e) => write!(f, "open failed: {e}"),
            Self::Close(e) => write!(f, "close failed: {e}"),
            Self::Write(e) => write!(f, "write failed: {e}"),
            Self::Read(e) => write!(f, "read failed: {e}"),
        }
    }
}

impl core::error::Error for ConnectionError {}

impl From<ConnectionError> for Error {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Reasons an inbound record yields no sample.  All are recovered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The first two bytes are not the `@C` marker.
    BadMarker,
    /// Not enough bytes for the header or the selected tag's payload.
    TooShort { needed: usize, got: usize },
    /// The tag byte is neither Local nor Remote.
    UnknownTag(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMarker => write!(f, "marker mismatch"),
            Self::TooShort { needed, got } => {
                write!(f, "frame too short (needed {needed} bytes, got {got})")
            }
            Self::UnknownTag(tag) => write!(f, "unknown tag 0x{tag:02x}"),
        }
    }
}

impl core::error::Error for FrameError {}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Encode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The value, scaled by 16 and rounded, does not fit an unsigned 16-bit field.
    OutOfRange,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "value outside 16-bit fixed-point range"),
        }
    }
}

impl core::error::Error for EncodeError {}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
