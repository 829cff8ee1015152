//! Connection Handler
//!
//! Handles individual client connections.
//!
//! ```text
//! AWAITING_FRAME ──frame──▶ PROCESSING ──response written──▶ AWAITING_FRAME
//!       │                        │
//!       └── EOF / truncated ─────┴── invalid request / write error ──▶ CLOSED
//! ```

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_MAX_FRAME_SIZE;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, WireError};
use crate::protocol::{build_error, read_frame, write_frame, ErrorCode, Frame, Response};

/// Lifecycle of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingFrame,
    Processing,
    Closed,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared request router
    dispatcher: Arc<Dispatcher>,

    /// Frames declaring a larger length are rejected unread
    max_frame_size: u32,

    state: ConnectionState,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and disables Nagle's algorithm
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Responses are small; send them without waiting to coalesce
        stream.set_nodelay(true)?;

        // One fd for the buffered reader, one for the buffered writer
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            state: ConnectionState::AwaitingFrame,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    ///
    /// An expired read timeout between frames closes the connection quietly;
    /// one that fires partway through a frame is a `TruncatedFrame`.
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        // Both halves share one socket, so each setting lands on whichever
        // handle does that direction's I/O
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    pub fn set_max_frame_size(&mut self, size: u32) {
        self.max_frame_size = size;
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and sends one response per frame.
    /// Returns `Ok(())` when the client disconnects; errors mean the
    /// connection was closed because of a bad frame or a transport failure.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let result = self.serve();
        self.state = ConnectionState::Closed;

        tracing::debug!("Connection from {} closed", self.peer_addr);
        result
    }

    fn serve(&mut self) -> Result<()> {
        loop {
            self.state = ConnectionState::AwaitingFrame;

            let frame = match read_frame(&mut self.reader, self.max_frame_size) {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) if e.is_disconnect() => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!("Client {} idle past read timeout", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            self.state = ConnectionState::Processing;

            let (response, close_after) = match self.process(frame) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("Bad frame from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let bytes = response.encode()?;
            tracing::debug!(
                peer = %self.peer_addr,
                correlation_id = response.correlation_id,
                frame = %hex::encode(&bytes),
                "Sending response"
            );

            if let Err(e) = write_frame(&mut self.writer, &bytes) {
                if e.is_disconnect() {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if close_after {
                return Ok(());
            }
        }
    }

    /// Build the response for one frame
    ///
    /// The returned flag is set when the connection must close once the
    /// response is written.
    fn process(&self, frame: Frame) -> Result<(Response, bool)> {
        tracing::debug!(
            peer = %self.peer_addr,
            frame = %hex::encode(frame.to_bytes()),
            "Received frame"
        );

        let (raw_header, _body) = frame.into_segments()?;
        let header = self.dispatcher.parse_header(&raw_header)?;

        tracing::debug!(
            peer = %self.peer_addr,
            correlation_id = header.correlation_id,
            request_type = header.request_type,
            request_version = header.request_version,
            error_code = ?header.error_code,
            "Parsed request header"
        );

        match self.dispatcher.respond(&header) {
            Ok(response) => Ok((response, false)),
            Err(WireError::InvalidRequest { request_type }) => {
                tracing::warn!(
                    "Client {} sent unknown request type {}, closing",
                    self.peer_addr,
                    request_type
                );
                let body = build_error(ErrorCode::InvalidRequest);
                Ok((Response::new(header.correlation_id, body), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
