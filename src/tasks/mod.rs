//! Background Tasks Module
//!
//! Contains background tasks that run periodically during node operation.
//!
//! # Tasks
//! - Expiry reaper: removes expired entries at configured intervals

mod cleanup;

pub use cleanup::{reap_once, spawn_cleanup_task};
