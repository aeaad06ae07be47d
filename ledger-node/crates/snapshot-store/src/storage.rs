use std::sync::Arc;

use tokio::sync::RwLock;

use crate::snapshot::Snapshot;
use crate::stored_snapshot::StoredSnapshot;

struct Inner {
    stored_snapshot: StoredSnapshot,
    last_snapshot_height: i32,
    next_snapshot_hash: String,
}

/// In-memory, single-writer-per-node snapshot pointer (C5). Initial state is
/// the genesis `StoredSnapshot`, height 0, with `nextSnapshotHash` already
/// pointing at `hash(snapshotZero)`.
#[derive(Clone)]
pub struct SnapshotStorage {
    inner: Arc<RwLock<Inner>>,
}

impl SnapshotStorage {
    pub fn new() -> Self {
        let zero = Snapshot::zero();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                stored_snapshot: StoredSnapshot::new(zero.clone(), Vec::new()),
                last_snapshot_height: 0,
                next_snapshot_hash: zero.hash,
            })),
        }
    }

    pub async fn get_stored_snapshot(&self) -> StoredSnapshot {
        self.inner.read().await.stored_snapshot.clone()
    }

    pub async fn set_stored_snapshot(&self, stored: StoredSnapshot) {
        self.inner.write().await.stored_snapshot = stored;
    }

    pub async fn get_last_snapshot_height(&self) -> i32 {
        self.inner.read().await.last_snapshot_height
    }

    pub async fn set_last_snapshot_height(&self, height: i32) {
        self.inner.write().await.last_snapshot_height = height;
    }

    pub async fn get_next_snapshot_hash(&self) -> String {
        self.inner.read().await.next_snapshot_hash.clone()
    }

    pub async fn set_next_snapshot_hash(&self, hash: String) {
        self.inner.write().await.next_snapshot_hash = hash;
    }
}

impl Default for SnapshotStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initial_state_is_genesis() {
        let storage = SnapshotStorage::new();
        assert_eq!(storage.get_last_snapshot_height().await, 0);
        assert!(storage.get_stored_snapshot().await.snapshot.is_zero());
        assert_eq!(storage.get_next_snapshot_hash().await, Snapshot::zero().hash);
    }

    #[tokio::test]
    async fn setters_round_trip() {
        let storage = SnapshotStorage::new();
        storage.set_last_snapshot_height(2).await;
        storage.set_next_snapshot_hash("deadbeef".into()).await;
        assert_eq!(storage.get_last_snapshot_height().await, 2);
        assert_eq!(storage.get_next_snapshot_hash().await, "deadbeef");
    }
}
