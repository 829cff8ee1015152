//! logwire Server Binary
//!
//! Starts the TCP broker.

use clap::Parser;
use logwire::network::Server;
use logwire::{Config, Dispatcher};
use tracing_subscriber::{fmt, EnvFilter};

/// logwire Server
#[derive(Parser, Debug)]
#[command(name = "logwire-server")]
#[command(about = "Minimal broker for a length-prefixed binary wire protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9092")]
    listen: String,

    /// Maximum concurrent connections (each holds two file descriptors)
    #[arg(short, long, default_value = "256")]
    max_connections: usize,

    /// Read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Largest accepted request frame in bytes
    #[arg(long, default_value = "16777216")]
    max_frame_size: u32,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,logwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("logwire Server v{}", logwire::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .max_frame_size(args.max_frame_size)
        .build();

    let dispatcher = Dispatcher::standard();
    for descriptor in dispatcher.apis().descriptors() {
        tracing::info!(
            "Serving request type {} (versions {}..={})",
            descriptor.request_type,
            descriptor.min_version,
            descriptor.max_version
        );
    }

    let mut server = Server::new(config, dispatcher);
    if let Err(e) = server.bind() {
        tracing::error!("Failed to bind: {}", e);
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
