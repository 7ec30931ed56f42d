//! HTTP server module.
//!
//! The server includes:
//! - Listener bound on the configured host and port
//! - Graceful shutdown on SIGTERM/SIGINT, long enough to finish a stress run

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
