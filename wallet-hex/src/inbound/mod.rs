//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the wallet and payment services.

pub mod handlers;
mod server;

pub use server::HttpServer;
