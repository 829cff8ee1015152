//! Protocol Module
//!
//! Defines the wire protocol spoken between clients and the broker.
//!
//! ## Protocol Format
//!
//! All integers are big-endian.
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────┬────────────────┬───────────────┬──────────┐
//! │ Len (4)  │ Type (2) │ Version (2) │ Corr. id (4)   │ Client id (4) │   Body   │
//! └──────────┴──────────┴─────────────┴────────────────┴───────────────┴──────────┘
//! ```
//!
//! ### Request Types
//! - 1:  FETCH        - versions 0..=16
//! - 18: API_VERSIONS - versions 0..=4
//!
//! ### Response Format
//! ```text
//! ┌──────────┬────────────────┬─────────────────────────────┐
//! │ Len (4)  │ Corr. id (4)   │            Body             │
//! └──────────┴────────────────┴─────────────────────────────┘
//! ```
//!
//! ### Error Codes
//! - 0:  NONE
//! - 35: UNSUPPORTED_VERSION
//! - 37: INVALID_REQUEST

mod api;
mod header;
mod response;
mod codec;

pub use api::{
    ApiDescriptor, ApiKey, ApiTable, API_VERSIONS_MAX_VERSION, API_VERSIONS_MIN_VERSION,
    FETCH_MAX_VERSION, FETCH_MIN_VERSION, MAX_API_DESCRIPTORS,
};
pub use header::{parse_header, ErrorCode, RequestHeader, HEADER_SIZE, MIN_HEADER_SIZE};
pub use response::{
    build_api_versions, build_error, build_fetch, ApiVersionsBody, FetchBody, Response,
    FETCH_BODY_SIZE, TAG_BUFFER,
};
pub use codec::{
    decode_frame, decode_response, encode_frame, encode_request, read_frame, read_response,
    write_frame, Frame, LENGTH_PREFIX_SIZE,
};
