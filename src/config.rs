//! Configuration for logwire
//!
//! Centralized configuration with sensible defaults.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::{Result, WireError};

/// Default connection cap; two fds each stays clear of a 1024 `ulimit -n`
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// Default maximum frame size (16 MB)
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Main configuration for a logwire broker
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    ///
    /// Each connection holds two file descriptors (reader and writer halves),
    /// so keep this under half the process fd limit.
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest frame length accepted from a client (in bytes)
    pub max_frame_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9092".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the listen address to a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .to_socket_addrs()
            .map_err(|e| WireError::Config(format!("invalid listen address {:?}: {}", self.listen_addr, e)))?
            .next()
            .ok_or_else(|| WireError::Config(format!("listen address {:?} resolved to nothing", self.listen_addr)))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum accepted frame size (in bytes)
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.config.max_frame_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
