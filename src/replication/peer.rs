//! Peer Clients
//!
//! The outbound side of replication: delivering one mutation to one peer.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CacheError, Result};
use crate::models::{PutRequest, PutResponse, RemoveRequest, RemoveResponse};
use crate::replication::{Mutation, ReplicationMessage};

/// Delivers replicated mutations to a single peer node.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Address used in logs and stats.
    fn address(&self) -> &str;

    /// Sends one mutation. Any failure is reported as `CacheError::Replication`.
    async fn replicate(&self, message: &ReplicationMessage) -> Result<()>;
}

/// Peer client speaking the node's own HTTP/JSON surface.
///
/// The underlying `reqwest::Client` pools connections and is cheap to clone,
/// so one client is shared by every peer.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    address: String,
    base_url: String,
    client: Client,
}

impl HttpPeerClient {
    pub fn new(address: impl Into<String>, client: Client) -> Self {
        let address = address.into();
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };
        Self {
            address,
            base_url,
            client,
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn failure(&self, reason: impl ToString) -> CacheError {
        CacheError::Replication {
            peer: self.address.clone(),
            reason: reason.to_string(),
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.failure(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("peer answered {}", status)));
        }

        response.json::<R>().await.map_err(|e| self.failure(e))
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    fn address(&self) -> &str {
        &self.address
    }

    async fn replicate(&self, message: &ReplicationMessage) -> Result<()> {
        let success = match &message.mutation {
            Mutation::Put { key, value, ttl } => {
                let request = PutRequest {
                    key: key.clone(),
                    value: value.clone(),
                    ttl: *ttl,
                    is_replica: message.is_replica,
                };
                self.post::<_, PutResponse>("/put", &request).await?.success
            }
            Mutation::Remove { key } => {
                let request = RemoveRequest {
                    key: key.clone(),
                    is_replica: message.is_replica,
                };
                self.post::<_, RemoveResponse>("/remove", &request)
                    .await?
                    .success
            }
        };

        if success {
            Ok(())
        } else {
            Err(self.failure("peer reported success=false"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = Client::new();
        assert_eq!(
            HttpPeerClient::new("localhost:50052", client.clone()).base_url(),
            "http://localhost:50052"
        );
        assert_eq!(
            HttpPeerClient::new("https://node-b:8443/", client).base_url(),
            "https://node-b:8443"
        );
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_replication_error() {
        // Port 9 (discard) on loopback is almost never listening.
        let peer = HttpPeerClient::new("127.0.0.1:9", Client::new());
        let result = peer
            .replicate(&ReplicationMessage::remove("k", true))
            .await;

        match result {
            Err(CacheError::Replication { peer, .. }) => assert_eq!(peer, "127.0.0.1:9"),
            other => panic!("expected replication error, got {:?}", other),
        }
    }
}
