//! Replication Fan-out
//!
//! Forwards client-originated mutations to every peer. Each peer has its own
//! bounded queue drained by its own worker task, so a slow or dead peer only
//! ever delays itself. Delivery is best-effort: failures and timeouts are
//! counted and logged, never retried, and never reach the original caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::replication::{PeerClient, ReplicationMessage};

// == Replication Stats ==
/// Snapshot of fan-out counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplicationStats {
    /// Messages accepted into a peer queue
    pub enqueued: u64,
    /// Messages a peer acknowledged
    pub delivered: u64,
    /// Messages that failed or timed out
    pub failed: u64,
    /// Messages dropped because a peer queue was full or closed
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ReplicationStats {
        ReplicationStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

struct PeerQueue {
    address: String,
    sender: mpsc::Sender<ReplicationMessage>,
}

// == Replicator ==
/// Owns one bounded queue and one worker per peer.
pub struct Replicator {
    queues: RwLock<Vec<PeerQueue>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    peer_count: usize,
}

impl Replicator {
    /// Spawns a worker per peer. Must be called inside a tokio runtime.
    ///
    /// # Arguments
    /// * `peers` - Clients for every peer node
    /// * `queue_capacity` - Pending messages buffered per peer
    /// * `call_timeout` - Deadline for each individual replication call
    pub fn new(
        peers: Vec<Arc<dyn PeerClient>>,
        queue_capacity: usize,
        call_timeout: Duration,
    ) -> Self {
        let counters = Arc::new(Counters::default());
        let peer_count = peers.len();
        let mut queues = Vec::with_capacity(peer_count);
        let mut workers = Vec::with_capacity(peer_count);

        for peer in peers {
            let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
            queues.push(PeerQueue {
                address: peer.address().to_string(),
                sender,
            });
            workers.push(tokio::spawn(run_peer_worker(
                peer,
                receiver,
                call_timeout,
                counters.clone(),
            )));
        }

        Self {
            queues: RwLock::new(queues),
            workers: Mutex::new(workers),
            counters,
            peer_count,
        }
    }

    /// A replicator with no peers; fan-out is a no-op.
    pub fn standalone() -> Self {
        Self::new(Vec::new(), 1, Duration::from_secs(1))
    }

    // == Fan Out ==
    /// Queues `message` for every peer and returns how many queues took it.
    ///
    /// Replica-originated messages are never forwarded. Never blocks: a full
    /// queue drops the new message for that peer only.
    pub fn fan_out(&self, message: &ReplicationMessage) -> usize {
        if !message.should_forward() {
            return 0;
        }

        let replica = message.as_replica();
        let queues = self.queues.read();
        let mut accepted = 0;

        for queue in queues.iter() {
            match queue.sender.try_send(replica.clone()) {
                Ok(()) => {
                    accepted += 1;
                    self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Full(_)) => {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Replication queue for {} is full, dropping mutation of '{}'",
                        queue.address,
                        message.key()
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!("Replication queue for {} is closed", queue.address);
                }
            }
        }

        accepted
    }

    pub fn stats(&self) -> ReplicationStats {
        self.counters.snapshot()
    }

    pub fn peer_count(&self) -> usize {
        self.peer_count
    }

    // == Shutdown ==
    /// Closes every queue and gives all workers together `grace` to drain.
    ///
    /// Workers still running at the deadline are aborted.
    pub async fn shutdown(&self, grace: Duration) {
        drop(std::mem::take(&mut *self.queues.write()));
        let workers = std::mem::take(&mut *self.workers.lock());
        let deadline = tokio::time::Instant::now() + grace;

        for mut worker in workers {
            if tokio::time::timeout_at(deadline, &mut worker).await.is_err() {
                warn!("Replication worker did not drain within {:?}, aborting", grace);
                worker.abort();
            }
        }
        info!("Replication fan-out stopped");
    }
}

async fn run_peer_worker(
    peer: Arc<dyn PeerClient>,
    mut receiver: mpsc::Receiver<ReplicationMessage>,
    call_timeout: Duration,
    counters: Arc<Counters>,
) {
    debug!("Replication worker for {} started", peer.address());

    while let Some(message) = receiver.recv().await {
        match tokio::time::timeout(call_timeout, peer.replicate(&message)).await {
            Ok(Ok(())) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("{} (key '{}')", e, message.key());
            }
            Err(_) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Replication to {} timed out after {:?} (key '{}')",
                    peer.address(),
                    call_timeout,
                    message.key()
                );
            }
        }
    }

    debug!("Replication worker for {} stopped", peer.address());
}
