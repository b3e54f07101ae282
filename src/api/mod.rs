//! API Module
//!
//! HTTP handlers and routing for the app wrapper service.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /app/manifest.json` - Web app manifest
//! - `GET /app/icon.png` - Default icon
//! - `GET /redirect` - Start URL forwarder
//! - `GET /getWebsiteInfos` - Page title and icon
//! - `GET /icon` - Icon proxy
//! - `GET /images/:key` - Proxied icon bytes

pub mod handlers;
pub mod rate_limit;
pub mod routes;

pub use handlers::*;
pub use rate_limit::RateLimiter;
pub use routes::create_router;
