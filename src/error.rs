//! Error types for logwire
//!
//! Provides a unified error type for all operations.
//!
//! Only transport-level failures live here. Protocol-level conditions such as
//! an unsupported request version are reported in-band through
//! [`ErrorCode`](crate::protocol::ErrorCode) and never surface as a `WireError`.

use std::io::ErrorKind;

use thiserror::Error;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// Unified error type for logwire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Truncated frame: expected {expected} bytes, got {received}")]
    TruncatedFrame { expected: usize, received: usize },

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u32, max: u32 },

    #[error("Payload too large: {size} bytes do not fit a 32-bit length prefix")]
    PayloadTooLarge { size: usize },

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: no handler for request type {request_type}")]
    InvalidRequest { request_type: u16 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WireError {
    /// True when the error means the peer went away rather than misbehaved
    pub fn is_disconnect(&self) -> bool {
        match self {
            WireError::Io(e) => matches!(
                e.kind(),
                ErrorKind::UnexpectedEof
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True for read/write timeouts (Unix reports WouldBlock, Windows TimedOut)
    pub fn is_timeout(&self) -> bool {
        match self {
            WireError::Io(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
            _ => false,
        }
    }
}
