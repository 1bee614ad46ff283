//! # wicket-server
//!
//! HTTP wiring for the wicket gateway: the axum middleware stack that runs
//! the access-log stage for every request and the authentication gate for
//! protected prefixes, an upstream forwarder for everything the gateway
//! does not serve itself, plus configuration, observability, and the
//! binary entrypoint.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod proxy;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig, UpstreamConfig};
pub use error::GatewayError;
pub use observability::{apply_logging_level, init_tracing};
pub use server::{ServerBuilder, WicketServer, build_app, build_app_with};
