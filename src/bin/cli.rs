//! logwire CLI Client
//!
//! Command-line client for a running broker.

use clap::{Parser, Subcommand};
use logwire::network::Client;
use logwire::protocol::{ApiKey, ApiVersionsBody, FetchBody, Response};
use logwire::{Result, WireError};

/// logwire CLI
#[derive(Parser, Debug)]
#[command(name = "logwire-cli")]
#[command(about = "Probe a logwire broker")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9092")]
    server: String,

    /// Correlation id of the first request
    #[arg(short, long, default_value = "1")]
    correlation_id: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Negotiate API versions
    ApiVersions {
        /// Request version to send
        #[arg(short = 'V', long, default_value = "4")]
        request_version: u16,
    },

    /// Issue an empty fetch
    Fetch {
        /// Request version to send
        #[arg(short = 'V', long, default_value = "16")]
        request_version: u16,
    },

    /// Send a hex-encoded frame verbatim and print the raw reply
    Raw {
        /// Complete frame, length prefix included
        hex: String,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?.with_correlation_id(args.correlation_id);

    match args.command {
        Commands::ApiVersions { request_version } => {
            let response = client.request(ApiKey::ApiVersions.as_u16(), request_version)?;
            print_raw(&response)?;
            let body = ApiVersionsBody::decode(&response.body)?;
            println!("error_code: {}", body.error_code);
            for api in &body.api_keys {
                println!(
                    "  api {:>3}  versions {}..={}",
                    api.request_type, api.min_version, api.max_version
                );
            }
            println!("throttle_time_ms: {}", body.throttle_time_ms);
        }
        Commands::Fetch { request_version } => {
            let response = client.request(ApiKey::Fetch.as_u16(), request_version)?;
            print_raw(&response)?;
            let body = FetchBody::decode(&response.body)?;
            println!("error_code: {}", body.error_code);
            println!("session_id: {}", body.session_id);
            println!("responses: {}", body.response_count);
        }
        Commands::Raw { hex } => {
            let frame = hex::decode(hex.trim())
                .map_err(|e| WireError::Protocol(format!("invalid hex frame: {}", e)))?;
            match client.send_raw(&frame)? {
                Some(response) => print_raw(&response)?,
                None => println!("connection closed without a response"),
            }
        }
    }

    Ok(())
}

fn print_raw(response: &Response) -> Result<()> {
    println!("correlation_id: {}", response.correlation_id);
    println!("frame: {}", hex::encode(response.encode()?));
    Ok(())
}
