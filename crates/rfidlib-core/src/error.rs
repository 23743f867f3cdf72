//! Error types for rfidlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport failures, frame header
//! faults, AVP decode faults, caller mistakes and device-reported result
//! codes are all captured here, each in its own variant so callers can
//! tell a dead link from a tag that simply was not in the field.

use crate::status::ResultCode;

/// The error type for all rfidlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port, TCP socket, USB-CDC).
    #[error("transport error: {0}")]
    Transport(String),

    /// A reply frame header was rejected (wrong version, vendor,
    /// command id, or a length shorter than the header itself).
    #[error("communication error: {0}")]
    Communication(String),

    /// An AVP in a reply could not be decoded, or a mandatory field
    /// was missing.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for bytes from the reader.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to a reader operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The receive buffer could not be grown to the size announced by a
    /// reply header.
    #[error("out of memory growing receive buffer")]
    OutOfMemory,

    /// The reader answered with a non-zero result code.
    #[error("device error: {0}")]
    Device(ResultCode),

    /// No connection to the reader has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the reader was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures of the link itself rather than of the
    /// request: timeouts, transport and header faults, lost connections.
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::Communication(_)
                | Error::Timeout
                | Error::NotConnected
                | Error::ConnectionLost
                | Error::Io(_)
        )
    }

    /// The device result code, if this error was reported by the reader.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Error::Device(code) => Some(*code),
            _ => None,
        }
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
