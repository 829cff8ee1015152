//! Request dispatcher
//!
//! Routes a parsed request header to the response builder for its type.
//!
//! The dispatcher holds no mutable state: the same header always produces the
//! same body, and one instance is shared by every connection.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Result, WireError};
use crate::protocol::{
    build_api_versions, build_fetch, parse_header, ApiKey, ApiTable, RequestHeader, Response,
};

/// Maps request types to response builders
#[derive(Debug, Clone)]
pub struct Dispatcher {
    apis: Arc<ApiTable>,
}

impl Dispatcher {
    pub fn new(apis: Arc<ApiTable>) -> Self {
        Self { apis }
    }

    /// Dispatcher over the standard API table
    pub fn standard() -> Self {
        Self::new(Arc::new(ApiTable::standard()))
    }

    pub fn apis(&self) -> &ApiTable {
        &self.apis
    }

    /// Parse a raw header segment against this dispatcher's table
    pub fn parse_header(&self, raw: &[u8]) -> Result<RequestHeader> {
        parse_header(raw, &self.apis)
    }

    /// Build the response body for a header
    ///
    /// Fails with `InvalidRequest` when the request type has no builder or is
    /// absent from the table.
    pub fn dispatch(&self, header: &RequestHeader) -> Result<Bytes> {
        let key = ApiKey::from_u16(header.request_type)
            .filter(|_| self.apis.lookup(header.request_type).is_some())
            .ok_or(WireError::InvalidRequest {
                request_type: header.request_type,
            })?;

        let body = match key {
            ApiKey::ApiVersions => build_api_versions(header, &self.apis),
            ApiKey::Fetch => build_fetch(header),
        };
        Ok(body)
    }

    /// Dispatch and pair the body with the request's correlation id
    pub fn respond(&self, header: &RequestHeader) -> Result<Response> {
        let body = self.dispatch(header)?;
        Ok(Response::new(header.correlation_id, body))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::standard()
    }
}
