//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread polling a shutdown flag
//! - One worker thread per connection
//! - Requests routed through the Dispatcher

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, ConnectionState};
pub use client::Client;
