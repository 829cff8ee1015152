//! Request header definitions
//!
//! Parses the fixed-layout request header and resolves its error state.
//!
//! ```text
//! ┌─────────────┬──────────────┬────────────────────┬────────────────┐
//! │ Type (2)    │ Version (2)  │ Correlation id (4) │ Client id (4)  │
//! └─────────────┴──────────────┴────────────────────┴────────────────┘
//! ```

use bytes::{Buf, Bytes};

use super::api::ApiTable;
use crate::error::{Result, WireError};

/// Full header size: type + version + correlation id + client id tail
pub const HEADER_SIZE: usize = 12;

/// Bytes needed before a header can be parsed at all
pub const MIN_HEADER_SIZE: usize = 8;

/// Error codes reported in-band in response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum ErrorCode {
    None = 0,
    UnsupportedVersion = 35,
    InvalidRequest = 37,
}

impl ErrorCode {
    /// Wire value of the code
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::None),
            35 => Some(ErrorCode::UnsupportedVersion),
            37 => Some(ErrorCode::InvalidRequest),
            _ => None,
        }
    }

    /// Resolve the error state of a request against the API table
    pub fn resolve(apis: &ApiTable, request_type: u16, request_version: u16) -> Self {
        match apis.lookup(request_type) {
            None => ErrorCode::InvalidRequest,
            Some(descriptor) if !descriptor.supports(request_version) => {
                ErrorCode::UnsupportedVersion
            }
            Some(_) => ErrorCode::None,
        }
    }
}

/// A parsed request header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub request_type: u16,
    pub request_version: u16,
    pub correlation_id: i32,

    /// Opaque tail after the correlation id, not interpreted
    pub client_id: Option<Bytes>,

    /// Derived from the API table at parse time
    pub error_code: ErrorCode,
}

impl RequestHeader {
    /// Build a header for an outgoing request (client side)
    ///
    /// The error code is left at `None`; the broker resolves its own.
    pub fn new(request_type: u16, request_version: u16, correlation_id: i32) -> Self {
        Self {
            request_type,
            request_version,
            correlation_id,
            client_id: None,
            error_code: ErrorCode::None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<Bytes>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Encode the header in wire order, always `HEADER_SIZE` bytes
    ///
    /// The client id tail is cut or zero-padded to four bytes so the broker
    /// splits header and body at the right offset.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.request_type.to_be_bytes());
        buf[2..4].copy_from_slice(&self.request_version.to_be_bytes());
        buf[4..8].copy_from_slice(&self.correlation_id.to_be_bytes());
        if let Some(tail) = self.client_id.as_deref() {
            let n = tail.len().min(HEADER_SIZE - MIN_HEADER_SIZE);
            buf[MIN_HEADER_SIZE..MIN_HEADER_SIZE + n].copy_from_slice(&tail[..n]);
        }
        buf
    }
}

/// Parse a raw header segment
///
/// Fixed-width reads cannot fail once the first eight bytes are present; an
/// unknown type or out-of-range version only sets `error_code`.
pub fn parse_header(raw: &[u8], apis: &ApiTable) -> Result<RequestHeader> {
    if raw.len() < MIN_HEADER_SIZE {
        return Err(WireError::TruncatedFrame {
            expected: MIN_HEADER_SIZE,
            received: raw.len(),
        });
    }

    let mut buf = &raw[..raw.len().min(HEADER_SIZE)];
    let request_type = buf.get_u16();
    let request_version = buf.get_u16();
    let correlation_id = buf.get_i32();
    let client_id = if buf.has_remaining() {
        Some(Bytes::copy_from_slice(buf))
    } else {
        None
    };

    let error_code = ErrorCode::resolve(apis, request_type, request_version);
    if error_code != ErrorCode::None {
        tracing::debug!(
            request_type,
            request_version,
            ?error_code,
            "Request header carries an error"
        );
    }

    Ok(RequestHeader {
        request_type,
        request_version,
        correlation_id,
        client_id,
        error_code,
    })
}
