//! # logwire
//!
//! A minimal broker for a length-prefixed, tagged binary wire protocol:
//! - Big-endian length-prefixed framing
//! - Version negotiation (ApiVersions) with in-band error codes
//! - Empty Fetch responses (no backing log)
//! - Multiple sequential requests per TCP connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (One Thread per Connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Connection Loop                             │
//! │        (read frame → respond → write frame → repeat)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Frame Codec │          │ Dispatcher  │
//!   │  + Header   │          │ (API table) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Response   │
//!                           │  Builders   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod dispatcher;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WireError, Result};
pub use config::Config;
pub use dispatcher::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of logwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
