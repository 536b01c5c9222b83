//! API Handlers
//!
//! The request router: validates Get/Put/Remove calls, applies them to the
//! local store, and hands client-originated mutations to the replicator.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetRequest, GetResponse, HealthResponse, PutRequest, PutResponse, RemoveRequest,
    RemoveResponse, StatsResponse,
};
use crate::replication::{ReplicationMessage, Replicator};

/// JSON body whose decoding failure is turned into `InvalidArgument`.
type Payload<T> = std::result::Result<Json<T>, JsonRejection>;

/// Application state shared across all handlers.
///
/// Holds no cache state of its own, only handles to the store and the
/// replicator.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheStore>,
    pub replicator: Arc<Replicator>,
}

impl AppState {
    pub fn new(cache: CacheStore, replicator: Replicator) -> Self {
        Self {
            cache: Arc::new(cache),
            replicator: Arc::new(replicator),
        }
    }

    /// A node with no peers.
    pub fn standalone(cache: CacheStore) -> Self {
        Self::new(cache, Replicator::standalone())
    }

    /// Builds the store and replicator from configuration.
    ///
    /// Must be called inside a tokio runtime, since peer workers are spawned.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheStore::new(config.max_entries, config.shard_count);
        let replicator = crate::replication::replicator_from_config(config)?;
        Ok(Self::new(cache, replicator))
    }
}

/// Handler for POST /get
///
/// A miss is a normal `success = false` response, not an error.
pub async fn get_handler(
    State(state): State<AppState>,
    payload: Payload<GetRequest>,
) -> Result<Json<GetResponse>> {
    let Json(req) = payload?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    Ok(Json(GetResponse::from(state.cache.get(&req.key))))
}

/// Handler for POST /put
///
/// Succeeds once the local write succeeds; peer delivery happens afterwards
/// in the background.
pub async fn put_handler(
    State(state): State<AppState>,
    payload: Payload<PutRequest>,
) -> Result<Json<PutResponse>> {
    let Json(req) = payload?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    let message = ReplicationMessage::from(&req);
    state.cache.put(req.key, req.value, req.ttl)?;

    let queued = state.replicator.fan_out(&message);
    debug!(
        "Put '{}' applied locally (replica: {}), queued for {} peers",
        message.key(),
        message.is_replica,
        queued
    );

    Ok(Json(PutResponse { success: true }))
}

/// Handler for POST /remove
///
/// Idempotent: removing an absent key still succeeds.
pub async fn remove_handler(
    State(state): State<AppState>,
    payload: Payload<RemoveRequest>,
) -> Result<Json<RemoveResponse>> {
    let Json(req) = payload?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    state.cache.remove(&req.key)?;
    state.replicator.fan_out(&ReplicationMessage::from(&req));

    Ok(Json(RemoveResponse { success: true }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.replicator.stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(
        state.cache.is_accepting_writes(),
        state.replicator.peer_count(),
    ))
}
