//! Error types for the printer library

use std::time::Duration;
use thiserror::Error;

/// ESC/POS encoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// QR payload does not fit the 2-byte length field of the store command
    #[error("QR payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Result type for encoding operations
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Transport error kinds, for callers that render each failure differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ConnectionFailed,
    IoFault,
}

/// TCP transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect or write did not finish within the deadline
    #[error("Timeout after {timeout:?}: {addr}")]
    Timeout { addr: String, timeout: Duration },

    /// Connection refused, host unreachable or name resolution failed
    #[error("Connection failed: {addr}: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error after the connection was established
    #[error("IO error: {addr}: {source}")]
    IoFault {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Timeout { .. } => TransportErrorKind::Timeout,
            Self::ConnectionFailed { .. } => TransportErrorKind::ConnectionFailed,
            Self::IoFault { .. } => TransportErrorKind::IoFault,
        }
    }

    /// Address the failed session was targeting
    pub fn addr(&self) -> &str {
        match self {
            Self::Timeout { addr, .. }
            | Self::ConnectionFailed { addr, .. }
            | Self::IoFault { addr, .. } => addr,
        }
    }
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Encode-then-send errors
#[derive(Debug, Error)]
pub enum PrintError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

/// Printer address parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Empty printer host")]
    Empty,

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Scan range errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Base network is not three dotted octets
    #[error("Invalid network prefix: {0}")]
    InvalidPrefix(String),

    /// Host numbers start at 1
    #[error("Host number must be between 1 and 255")]
    ZeroHost,

    #[error("Start host {start} is greater than end host {end}")]
    Inverted { start: u8, end: u8 },
}
