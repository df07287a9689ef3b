//! IPC (Inter-Process Communication) Module
//!
//! Unix socket channel between the capture front-end and the relay daemon.
//! Protocol: one JSON request line, one JSON response line, per connection.

pub mod client;
pub mod messages;
pub mod server;

pub use client::IpcClient;
pub use messages::*;
pub use server::IpcServer;

use std::path::PathBuf;

/// Largest accepted request line, in bytes
pub const MAX_REQUEST_BYTES: u64 = 64 * 1024;

/// Get the default Unix socket path for the relay
pub fn socket_path() -> PathBuf {
    let user = std::env::var("USER").unwrap_or_else(|_| "context-explainer".to_string());
    PathBuf::from(format!("/tmp/context-explainer-{}.sock", user))
}
