//! Blocking client
//!
//! Sends requests over one TCP connection and reads the matching responses.

use std::io::{self, BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::config::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{Result, WireError};
use crate::protocol::{
    encode_request, read_response, write_frame, ApiKey, ApiVersionsBody, FetchBody, RequestHeader,
    Response,
};

/// Client id tail sent when none is configured
const DEFAULT_CLIENT_ID: &[u8] = b"lwcl";

/// A connection to a logwire broker
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    client_id: Bytes,
    next_correlation_id: i32,
}

impl Client {
    /// Connect to a broker
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            client_id: Bytes::from_static(DEFAULT_CLIENT_ID),
            next_correlation_id: 1,
        })
    }

    /// Set the four-byte client id tail sent in every header
    pub fn with_client_id(mut self, client_id: impl Into<Bytes>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Start correlation ids from `id` (they increment per request)
    pub fn with_correlation_id(mut self, id: i32) -> Self {
        self.next_correlation_id = id;
        self
    }

    fn take_correlation_id(&mut self) -> i32 {
        let id = self.next_correlation_id;
        self.next_correlation_id = id.wrapping_add(1);
        id
    }

    /// Send a request and wait for its response
    ///
    /// The response must echo the request's correlation id.
    pub fn send(&mut self, header: &RequestHeader, body: &[u8]) -> Result<Response> {
        let request = encode_request(header, body)?;
        let response = self
            .send_raw(&request)?
            .ok_or_else(closed_by_broker)?;

        if response.correlation_id != header.correlation_id {
            return Err(WireError::Protocol(format!(
                "Correlation id mismatch: sent {}, received {}",
                header.correlation_id, response.correlation_id
            )));
        }
        Ok(response)
    }

    /// Write pre-encoded frame bytes and read one response frame
    ///
    /// Returns `Ok(None)` if the broker closed the connection instead of
    /// answering.
    pub fn send_raw(&mut self, frame: &[u8]) -> Result<Option<Response>> {
        write_frame(&mut self.writer, frame)?;
        read_response(&mut self.reader, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Send an empty-bodied request of the given type and version
    pub fn request(&mut self, request_type: u16, request_version: u16) -> Result<Response> {
        let header = RequestHeader::new(request_type, request_version, self.take_correlation_id())
            .with_client_id(self.client_id.clone());
        self.send(&header, &[])
    }

    /// Negotiate versions with the broker
    pub fn api_versions(&mut self, version: u16) -> Result<ApiVersionsBody> {
        let response = self.request(ApiKey::ApiVersions.as_u16(), version)?;
        ApiVersionsBody::decode(&response.body)
    }

    /// Issue an empty fetch
    pub fn fetch(&mut self, version: u16) -> Result<FetchBody> {
        let response = self.request(ApiKey::Fetch.as_u16(), version)?;
        FetchBody::decode(&response.body)
    }
}

fn closed_by_broker() -> WireError {
    WireError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "broker closed the connection without responding",
    ))
}
