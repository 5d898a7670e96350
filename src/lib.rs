//! Name resolution and asset transfer gateway library.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod naming;
pub mod observability;
pub mod transfer;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
