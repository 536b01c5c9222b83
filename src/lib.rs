//! Replicache - a replicated in-memory key-value cache node
//!
//! Serves Get/Put/Remove with per-key TTL, and fans every client mutation
//! out to a fixed set of peer nodes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod replication;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
