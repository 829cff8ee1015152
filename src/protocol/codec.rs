//! Frame codec
//!
//! Encoding and decoding functions for the length-prefixed wire format.
//!
//! ## Wire Format
//!
//! ### Request Frame
//! ```text
//! ┌──────────┬──────────────────────┬─────────────────────────────┐
//! │ Len (4)  │     Header (12)      │           Body              │
//! └──────────┴──────────────────────┴─────────────────────────────┘
//! ```
//!
//! ### Response Frame
//! ```text
//! ┌──────────┬──────────────────────┬─────────────────────────────┐
//! │ Len (4)  │ Correlation id (4)   │           Body              │
//! └──────────┴──────────────────────┴─────────────────────────────┘
//! ```
//!
//! The length prefix is big-endian and never counts itself.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::header::{RequestHeader, HEADER_SIZE, MIN_HEADER_SIZE};
use super::response::Response;
use crate::error::{Result, WireError};

/// Size of the length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the correlation id leading every response payload
pub const CORRELATION_ID_SIZE: usize = 4;

/// Length-prefix value for `len` bytes of payload
fn frame_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| WireError::PayloadTooLarge { size: len })
}

/// A length-prefixed unit of wire data
///
/// `length()` always equals `payload().len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,

    /// Checked at construction so the prefix can never wrap
    length: u32,
}

impl Frame {
    /// Wrap a payload, rejecting ones too long for the length prefix
    pub fn new(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let length = frame_length(payload.len())?;
        Ok(Self { payload, length })
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Encode the frame with its length prefix
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + self.payload.len());
        buf.put_u32(self.length());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Split a request payload into header and body segments
    ///
    /// The header segment is the first 12 bytes, or the whole payload when it
    /// is shorter. Payloads without room for type, version and correlation id
    /// are rejected.
    pub fn into_segments(self) -> Result<(Bytes, Bytes)> {
        let mut payload = self.payload;
        if payload.len() < MIN_HEADER_SIZE {
            return Err(WireError::TruncatedFrame {
                expected: MIN_HEADER_SIZE,
                received: payload.len(),
            });
        }

        let header = payload.split_to(payload.len().min(HEADER_SIZE));
        Ok((header, payload))
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Fill `buf` from the reader, looping over short reads
///
/// Returns the number of bytes read, which is less than `buf.len()` only when
/// the stream reached EOF first, or a read timed out once the frame had
/// started (`mid_frame`, or some bytes of `buf` already arrived). A timeout
/// before any byte of the frame is returned as the I/O error.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8], mid_frame: bool) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(ref e) if (mid_frame || filled > 0) && is_timeout_kind(e.kind()) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Unix reports an expired socket timeout as WouldBlock, Windows as TimedOut
fn is_timeout_kind(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Read one frame from a stream
///
/// Returns `Ok(None)` when the stream is closed cleanly at a frame boundary.
/// A stream that closes or times out inside the length prefix or the payload
/// yields `TruncatedFrame`.
pub fn read_frame<R: Read>(reader: &mut R, max_frame_size: u32) -> Result<Option<Frame>> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let received = read_full(reader, &mut prefix, false)?;
    if received == 0 {
        return Ok(None);
    }
    if received < LENGTH_PREFIX_SIZE {
        return Err(WireError::TruncatedFrame {
            expected: LENGTH_PREFIX_SIZE,
            received,
        });
    }

    let length = u32::from_be_bytes(prefix);
    if length > max_frame_size {
        return Err(WireError::FrameTooLarge {
            size: length,
            max: max_frame_size,
        });
    }

    let mut payload = BytesMut::zeroed(length as usize);
    let received = read_full(reader, &mut payload, true)?;
    if received < payload.len() {
        return Err(WireError::TruncatedFrame {
            expected: payload.len(),
            received,
        });
    }

    Ok(Some(Frame {
        payload: payload.freeze(),
        length,
    }))
}

/// Read a request frame and split it into `(header, body)` segments
pub fn decode_frame<R: Read>(reader: &mut R, max_frame_size: u32) -> Result<Option<(Bytes, Bytes)>> {
    match read_frame(reader, max_frame_size)? {
        Some(frame) => frame.into_segments().map(Some),
        None => Ok(None),
    }
}

/// Write already-encoded frame bytes and flush
pub fn write_frame<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Frames
// =============================================================================

/// Encode a response frame
///
/// Format: `len(4 + body) (4) + correlation_id (4) + body`
pub fn encode_frame(correlation_id: i32, body: &[u8]) -> Result<Bytes> {
    let length = frame_length(CORRELATION_ID_SIZE + body.len())?;
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + CORRELATION_ID_SIZE + body.len());
    buf.put_u32(length);
    buf.put_i32(correlation_id);
    buf.put_slice(body);
    Ok(buf.freeze())
}

/// Decode a complete response frame from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Err(WireError::TruncatedFrame {
            expected: LENGTH_PREFIX_SIZE,
            received: bytes.len(),
        });
    }

    let mut buf = bytes;
    let length = buf.get_u32() as usize;
    if buf.remaining() < length {
        return Err(WireError::TruncatedFrame {
            expected: length,
            received: buf.remaining(),
        });
    }

    response_from_payload(Bytes::copy_from_slice(&buf[..length]))
}

/// Read one response frame from a stream
pub fn read_response<R: Read>(reader: &mut R, max_frame_size: u32) -> Result<Option<Response>> {
    match read_frame(reader, max_frame_size)? {
        Some(frame) => response_from_payload(frame.payload).map(Some),
        None => Ok(None),
    }
}

fn response_from_payload(mut payload: Bytes) -> Result<Response> {
    if payload.len() < CORRELATION_ID_SIZE {
        return Err(WireError::Protocol(format!(
            "Response frame of {} bytes has no correlation id",
            payload.len()
        )));
    }
    let correlation_id = payload.get_i32();
    Ok(Response::new(correlation_id, payload))
}

// =============================================================================
// Request Frames
// =============================================================================

/// Encode a request frame (client side)
///
/// Format: `len (4) + header + body`
pub fn encode_request(header: &RequestHeader, body: &[u8]) -> Result<Bytes> {
    let header = header.to_bytes();
    let mut payload = BytesMut::with_capacity(HEADER_SIZE + body.len());
    payload.put_slice(&header);
    payload.put_slice(body);
    Ok(Frame::new(payload.freeze())?.to_bytes())
}
