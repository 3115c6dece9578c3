//! API Module
//!
//! HTTP handlers and routing for the keyword gap REST API.
//!
//! # Endpoints
//! - `POST /analyze` - Run or recall a keyword gap analysis
//! - `GET|PUT /cache/config` - Cache expiration setting
//! - `GET /cache/stats` - Cache statistics
//! - `GET|DELETE /cache/entries/:key` - Inspect or drop one entry
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
