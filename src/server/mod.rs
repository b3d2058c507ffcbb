//! HTTP server for the summarize endpoint.
//!
//! - Configuration and secrets loading (`config`)
//! - Axum router, handlers and error mapping (`routes`)

pub mod config;
pub mod routes;

pub use config::{Config, Secrets};
pub use routes::{AppState, router, serve};
