//! API Module
//!
//! HTTP/JSON carriage of the cache RPC surface.
//!
//! # Endpoints
//! - `POST /get` - `{key}` -> `{value, success}`
//! - `POST /put` - `{key, value, ttl, is_replica}` -> `{success}`
//! - `POST /remove` - `{key, is_replica}` -> `{success}`
//! - `GET /stats` - Cache and replication statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
