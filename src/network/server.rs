//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::network::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// First and largest pause after a failed accept (EMFILE, ENFILE, ...)
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Exponential delay between accept retries while accept keeps failing
#[derive(Debug)]
struct AcceptBackoff {
    next: Duration,
}

impl AcceptBackoff {
    fn new() -> Self {
        Self {
            next: ACCEPT_BACKOFF_MIN,
        }
    }

    /// Delay to wait now; doubles the following one up to the ceiling
    fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(ACCEPT_BACKOFF_MAX);
        delay
    }

    fn reset(&mut self) {
        self.next = ACCEPT_BACKOFF_MIN;
    }
}

/// Cloneable handle that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop; in-flight connections drain on their own
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Decrements the live connection count when a worker exits
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// TCP server for logwire
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and dispatcher
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            listener: None,
            shutdown: ShutdownHandle::default(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listening socket without starting to accept
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = self.open_listener()?;
        let local = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(local)
    }

    fn open_listener(&self) -> Result<TcpListener> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Address of the bound listener, if any
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => self.open_listener()?,
        };

        let mut backoff = AcceptBackoff::new();

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    backoff.reset();
                    self.spawn_connection(stream, addr);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    backoff.reset();
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!("Failed to accept connection: {} (retrying in {:?})", e, delay);
                    thread::sleep(delay);
                }
            }
        }

        tracing::info!(
            "Accept loop stopped, {} connection(s) still draining",
            self.active_connections()
        );
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        if self.active.load(Ordering::Relaxed) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection from {}: limit of {} reached",
                addr,
                self.config.max_connections
            );
            return;
        }

        // Some platforms hand out sockets that inherit the listener's mode
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure connection from {}: {}", addr, e);
            return;
        }

        self.active.fetch_add(1, Ordering::Relaxed);
        let guard = ActiveGuard(Arc::clone(&self.active));
        let dispatcher = Arc::clone(&self.dispatcher);
        let config = self.config.clone();

        tracing::debug!("Accepted connection from {}", addr);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = serve_connection(stream, dispatcher, &config) {
                    tracing::warn!("Connection {} closed with error: {}", addr, e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn worker for {}: {}", addr, e);
        }
    }
}

fn serve_connection(stream: TcpStream, dispatcher: Arc<Dispatcher>, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, dispatcher)?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.set_max_frame_size(config.max_frame_size);
    connection.handle()
}
