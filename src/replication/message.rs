//! Replication Messages
//!
//! A mutation plus the flag telling the receiver whether it came from a peer.

use crate::models::{PutRequest, RemoveRequest};

/// A state change that can be replayed on another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Put { key: String, value: String, ttl: i64 },
    Remove { key: String },
}

/// A mutation tagged with its origin.
///
/// `is_replica = true` means a peer forwarded it. Such messages are applied
/// locally and never forwarded again; this flag is the only thing stopping a
/// fully connected mesh from replicating forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationMessage {
    pub mutation: Mutation,
    pub is_replica: bool,
}

impl ReplicationMessage {
    pub fn put(key: impl Into<String>, value: impl Into<String>, ttl: i64, is_replica: bool) -> Self {
        Self {
            mutation: Mutation::Put {
                key: key.into(),
                value: value.into(),
                ttl,
            },
            is_replica,
        }
    }

    pub fn remove(key: impl Into<String>, is_replica: bool) -> Self {
        Self {
            mutation: Mutation::Remove { key: key.into() },
            is_replica,
        }
    }

    pub fn key(&self) -> &str {
        match &self.mutation {
            Mutation::Put { key, .. } | Mutation::Remove { key } => key,
        }
    }

    /// Whether this message must be fanned out to peers.
    pub fn should_forward(&self) -> bool {
        !self.is_replica
    }

    /// The copy sent to peers.
    pub fn as_replica(&self) -> Self {
        Self {
            mutation: self.mutation.clone(),
            is_replica: true,
        }
    }
}

impl From<&PutRequest> for ReplicationMessage {
    fn from(req: &PutRequest) -> Self {
        Self::put(req.key.clone(), req.value.clone(), req.ttl, req.is_replica)
    }
}

impl From<&RemoveRequest> for ReplicationMessage {
    fn from(req: &RemoveRequest) -> Self {
        Self::remove(req.key.clone(), req.is_replica)
    }
}
