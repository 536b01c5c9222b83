//! Request and Response models for the cache RPC surface
//!
//! This module defines the DTOs used for serializing/deserializing
//! Get/Put/Remove bodies, both from clients and between peers.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{GetRequest, PutRequest, RemoveRequest};
pub use responses::{GetResponse, HealthResponse, PutResponse, RemoveResponse, StatsResponse};
