//! Multi-node replication tests
//!
//! Starts real nodes on loopback ports and talks to them over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use replicache::{
    api::create_router,
    cache::CacheStore,
    models::{GetRequest, GetResponse, PutRequest, PutResponse, RemoveRequest},
    replication::{HttpPeerClient, PeerClient, Replicator},
    AppState,
};
use tokio::net::TcpListener;

struct Node {
    addr: SocketAddr,
    state: AppState,
}

/// Binds `count` listeners first so every node can be told its peers, then
/// serves each node in the background.
async fn spawn_cluster(count: usize) -> Vec<Node> {
    let mut listeners = Vec::with_capacity(count);
    for _ in 0..count {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    let addrs: Vec<SocketAddr> = listeners.iter().map(|l| l.local_addr().unwrap()).collect();

    let client = reqwest::Client::new();
    let mut nodes = Vec::with_capacity(count);

    for (index, listener) in listeners.into_iter().enumerate() {
        let peers: Vec<Arc<dyn PeerClient>> = addrs
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, addr)| {
                Arc::new(HttpPeerClient::new(addr.to_string(), client.clone()))
                    as Arc<dyn PeerClient>
            })
            .collect();

        let state = AppState::new(
            CacheStore::new(10_000, 8),
            Replicator::new(peers, 256, Duration::from_secs(2)),
        );
        let app = create_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        nodes.push(Node {
            addr: addrs[index],
            state,
        });
    }

    nodes
}

async fn put(node: &Node, key: &str, value: &str, ttl: i64, is_replica: bool) -> PutResponse {
    reqwest::Client::new()
        .post(format!("http://{}/put", node.addr))
        .json(&PutRequest {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
            is_replica,
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn get(node: &Node, key: &str) -> GetResponse {
    reqwest::Client::new()
        .post(format!("http://{}/get", node.addr))
        .json(&GetRequest {
            key: key.to_string(),
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn remove(node: &Node, key: &str) {
    let status = reqwest::Client::new()
        .post(format!("http://{}/remove", node.addr))
        .json(&RemoveRequest {
            key: key.to_string(),
            is_replica: false,
        })
        .send()
        .await
        .unwrap()
        .status();
    assert!(status.is_success());
}

/// Polls `node` until `key` reads as `expected` or the deadline passes.
async fn wait_for(node: &Node, key: &str, expected: Option<&str>) -> bool {
    for _ in 0..40 {
        let response = get(node, key).await;
        let actual = response.success.then_some(response.value);
        if actual.as_deref() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_put_converges_on_all_peers() {
    let nodes = spawn_cluster(3).await;

    assert!(put(&nodes[0], "k", "v", 60, false).await.success);

    for node in &nodes[1..] {
        assert!(wait_for(node, "k", Some("v")).await, "peer {} did not converge", node.addr);
    }
    assert_eq!(nodes[0].state.replicator.stats().enqueued, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replicas_are_not_forwarded_again() {
    let nodes = spawn_cluster(3).await;

    put(&nodes[0], "k", "v", 0, false).await;
    for node in &nodes[1..] {
        assert!(wait_for(node, "k", Some("v")).await);
    }

    // Peers applied the mutation without generating traffic of their own.
    for node in &nodes[1..] {
        assert_eq!(node.state.replicator.stats().enqueued, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replica_put_generates_no_outbound_traffic() {
    let nodes = spawn_cluster(2).await;

    assert!(put(&nodes[0], "only_here", "v", 0, true).await.success);
    assert!(get(&nodes[0], "only_here").await.success);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(nodes[0].state.replicator.stats().enqueued, 0);
    assert!(!get(&nodes[1], "only_here").await.success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_remove_converges_on_all_peers() {
    let nodes = spawn_cluster(3).await;

    put(&nodes[0], "k", "v", 0, false).await;
    for node in &nodes[1..] {
        assert!(wait_for(node, "k", Some("v")).await);
    }

    remove(&nodes[1], "k").await;

    for node in &nodes {
        assert!(wait_for(node, "k", None).await, "{} still has k", node.addr);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_peer_does_not_fail_client_write() {
    // Reserve a port and close it so nothing listens there.
    let dead_addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let dead_peer = Arc::new(HttpPeerClient::new(
        dead_addr.to_string(),
        reqwest::Client::new(),
    )) as Arc<dyn PeerClient>;
    let state = AppState::new(
        CacheStore::new(100, 2),
        Replicator::new(vec![dead_peer], 16, Duration::from_millis(500)),
    );
    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let node = Node { addr, state };

    assert!(put(&node, "k", "v", 0, false).await.success);
    assert!(get(&node, "k").await.success);

    let mut failed = 0;
    for _ in 0..40 {
        failed = node.state.replicator.stats().failed;
        if failed > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(failed, 1);
}
