//! chatpulse scrape gateway
//!
//! Serves the Prometheus `/metrics` endpoint and a health check.

pub mod health_api;
pub mod scrape;
pub mod server;

pub use scrape::GaugeExporter;
pub use server::{GatewayState, bind, build_router, start_server};
