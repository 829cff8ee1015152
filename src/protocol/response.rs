//! Response definitions
//!
//! One body builder per supported request type, plus decoders for the same
//! bodies used on the client side.
//!
//! ### ApiVersions body
//! ```text
//! error_code (2) | count+1 (1) | { type (2) | min (2) | max (2) | tags (1) }* | throttle_ms (4) | tags (1)
//! ```
//!
//! ### Fetch body
//! ```text
//! throttle_ms (4) | error_code (2) | session_id (4) | tags (1) | responses+1 (1) | tags (1)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::api::{ApiDescriptor, ApiTable};
use super::codec::encode_frame;
use super::header::{ErrorCode, RequestHeader};
use crate::error::{Result, WireError};

/// Empty tagged-field section
pub const TAG_BUFFER: u8 = 0x00;

/// Throttling is not implemented; every response reports zero
pub const THROTTLE_TIME_MS: i32 = 0;

/// Fetch sessions are not implemented; every response reports session zero
pub const FETCH_SESSION_ID: i32 = 0;

/// Encoded size of one ApiVersions descriptor entry
pub const API_DESCRIPTOR_SIZE: usize = 7;

/// Encoded size of a fetch body with no topic responses
pub const FETCH_BODY_SIZE: usize = 4 + 2 + 4 + 1 + 1 + 1;

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Echoed verbatim from the request
    pub correlation_id: i32,

    pub body: Bytes,
}

impl Response {
    pub fn new(correlation_id: i32, body: impl Into<Bytes>) -> Self {
        Self {
            correlation_id,
            body: body.into(),
        }
    }

    /// Encode as a length-prefixed frame
    ///
    /// Fails only for bodies too long for the 32-bit length prefix.
    pub fn encode(&self) -> Result<Bytes> {
        encode_frame(self.correlation_id, &self.body)
    }
}

/// Compact array length: element count plus one, as a single byte
///
/// `ApiTable` caps its size at `MAX_API_DESCRIPTORS`, so the count always fits.
fn compact_len(count: usize) -> u8 {
    u8::try_from(count + 1).unwrap_or(u8::MAX)
}

// =============================================================================
// Builders
// =============================================================================

/// Build a version negotiation (ApiVersions) body
///
/// The full descriptor table is always emitted, including for requests
/// carrying `UNSUPPORTED_VERSION`, so the client can renegotiate.
pub fn build_api_versions(header: &RequestHeader, apis: &ApiTable) -> Bytes {
    let descriptors = apis.descriptors();
    let mut buf = BytesMut::with_capacity(2 + 1 + descriptors.len() * API_DESCRIPTOR_SIZE + 4 + 1);

    buf.put_i16(header.error_code.code());
    buf.put_u8(compact_len(descriptors.len()));
    for descriptor in descriptors {
        buf.put_u16(descriptor.request_type);
        buf.put_u16(descriptor.min_version);
        buf.put_u16(descriptor.max_version);
        buf.put_u8(TAG_BUFFER);
    }
    buf.put_i32(THROTTLE_TIME_MS);
    buf.put_u8(TAG_BUFFER);

    buf.freeze()
}

/// Build a Fetch body with zero topic responses
///
/// There is no backing log, so this is a valid, empty result rather than an
/// error.
pub fn build_fetch(header: &RequestHeader) -> Bytes {
    let mut buf = BytesMut::with_capacity(FETCH_BODY_SIZE);

    buf.put_i32(THROTTLE_TIME_MS);
    buf.put_i16(header.error_code.code());
    buf.put_i32(FETCH_SESSION_ID);
    buf.put_u8(TAG_BUFFER);
    buf.put_u8(compact_len(0));
    buf.put_u8(TAG_BUFFER);

    buf.freeze()
}

/// Minimal body carrying only an error code
pub fn build_error(error_code: ErrorCode) -> Bytes {
    Bytes::copy_from_slice(&error_code.code().to_be_bytes())
}

// =============================================================================
// Client-side decoding
// =============================================================================

fn ensure(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(WireError::Protocol(format!(
            "{}: expected {} more bytes, got {}",
            what,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn get_compact_len(buf: &mut &[u8], what: &str) -> Result<usize> {
    ensure(buf, 1, what)?;
    match buf.get_u8() {
        0 => Err(WireError::Protocol(format!("{}: null compact array", what))),
        n => Ok(n as usize - 1),
    }
}

/// Decoded ApiVersions body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsBody {
    pub error_code: i16,
    pub api_keys: Vec<ApiDescriptor>,
    pub throttle_time_ms: i32,
}

impl ApiVersionsBody {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut buf = body;

        ensure(buf, 2, "ApiVersions error code")?;
        let error_code = buf.get_i16();

        let count = get_compact_len(&mut buf, "ApiVersions api keys")?;
        ensure(buf, count * API_DESCRIPTOR_SIZE, "ApiVersions api keys")?;
        let mut api_keys = Vec::with_capacity(count);
        for _ in 0..count {
            let request_type = buf.get_u16();
            let min_version = buf.get_u16();
            let max_version = buf.get_u16();
            buf.advance(1);
            api_keys.push(ApiDescriptor::new(request_type, min_version, max_version));
        }

        ensure(buf, 4 + 1, "ApiVersions trailer")?;
        let throttle_time_ms = buf.get_i32();
        buf.advance(1);

        Ok(Self {
            error_code,
            api_keys,
            throttle_time_ms,
        })
    }

    pub fn error(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.error_code)
    }
}

/// Decoded Fetch body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBody {
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub session_id: i32,
    pub response_count: usize,
}

impl FetchBody {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut buf = body;

        ensure(buf, 4 + 2 + 4 + 1, "Fetch header fields")?;
        let throttle_time_ms = buf.get_i32();
        let error_code = buf.get_i16();
        let session_id = buf.get_i32();
        buf.advance(1);

        let response_count = get_compact_len(&mut buf, "Fetch responses")?;
        if response_count != 0 {
            return Err(WireError::Protocol(format!(
                "Fetch responses: decoding {} topic responses is not supported",
                response_count
            )));
        }
        ensure(buf, 1, "Fetch trailer")?;
        buf.advance(1);

        Ok(Self {
            throttle_time_ms,
            error_code,
            session_id,
            response_count,
        })
    }

    pub fn error(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.error_code)
    }
}
