//! API Module
//!
//! HTTP handlers and routing for the rolling cache proxy.
//!
//! # Endpoints
//! - `GET /fetch?url=...` - Read a resource through its rolling cache
//! - `GET /entries` - List live rolling caches
//! - `GET /stats` - Get registry statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
