//! Errors raised by the protocol engine.

use std::io;
use thiserror::Error;

/// Every failure the codec, the connection and the writer can report.
#[derive(Debug, Error)]
pub enum HazelcastError {
    /// Connection-related errors (write failures, streams ending mid-frame).
    ///
    /// The connection must be closed and replaced; a framed stream cannot be
    /// resynchronized.
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol-related errors (corrupt frame lengths, unencodable messages).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An operation was called in a state that does not allow it.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration errors (invalid settings).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// `Result` with [`HazelcastError`] as the error type.
pub type Result<T> = std::result::Result<T, HazelcastError>;
