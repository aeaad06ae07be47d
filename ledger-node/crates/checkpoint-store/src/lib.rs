//! Authoritative store of checkpoint blocks and their lifecycle states (C4).
//!
//! A checkpoint block (here, [`CheckpointCache`]) moves through four states
//! as gossip ingestion (outside this crate) validates and accepts it:
//! *awaiting* (known, not yet validated), *waitingForAcceptance* (validated,
//! waiting on dependencies), *accepted* (ready to be snapshotted), and
//! *inSnapshot* (finalized under a snapshot). [`CheckpointStore::mark_in_snapshot`]
//! is the only transition this crate performs itself; all earlier transitions
//! are driven by the caller via [`CheckpointStore::insert`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use tokio::sync::RwLock;
use tx_model::{Edge, ObservationEdge, TransactionEdgeData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckpointState {
    Awaiting,
    WaitingForAcceptance,
    Accepted,
    InSnapshot,
}

/// Opaque checkpoint block payload, identified by `soe_hash`, the hash of
/// its `SignedObservationEdge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointCache {
    pub soe_hash: String,
    pub height_min: i64,
    pub transactions: Vec<Edge<TransactionEdgeData>>,
    pub observations: Vec<ObservationEdge>,
}

impl CheckpointCache {
    pub fn new(soe_hash: impl Into<String>, height_min: i64) -> Self {
        Self {
            soe_hash: soe_hash.into(),
            height_min,
            transactions: Vec::new(),
            observations: Vec::new(),
        }
    }
}

impl Canonical for CheckpointCache {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::CHECKPOINT_CACHE);
        w.write_str(&self.soe_hash);
        w.write_i64(self.height_min);
        w.write_seq(&self.transactions, |w, e| e.encode(w));
        w.write_seq(&self.observations, |w, o| o.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::CHECKPOINT_CACHE)?;
        let soe_hash = r.read_str()?;
        let height_min = r.read_i64()?;
        let transactions = r.read_seq(Edge::<TransactionEdgeData>::decode)?;
        let observations = r.read_seq(ObservationEdge::decode)?;
        Ok(CheckpointCache {
            soe_hash,
            height_min,
            transactions,
            observations,
        })
    }
}

#[derive(Default)]
struct Inner {
    checkpoints: HashMap<String, CheckpointCache>,
    awaiting: HashSet<String>,
    waiting_for_acceptance: HashSet<String>,
    accepted: HashSet<String>,
    in_snapshot: HashSet<String>,
    tips: HashSet<String>,
    usages: HashMap<String, u64>,
}

#[derive(Clone, Default)]
pub struct CheckpointStore {
    inner: Arc<RwLock<Inner>>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a checkpoint block, placing it into the given
    /// lifecycle state and clearing it from every other state set.
    pub async fn insert(&self, cache: CheckpointCache, state: CheckpointState) {
        let mut inner = self.inner.write().await;
        let hash = cache.soe_hash.clone();
        inner.checkpoints.insert(hash.clone(), cache);
        inner.awaiting.remove(&hash);
        inner.waiting_for_acceptance.remove(&hash);
        inner.accepted.remove(&hash);
        inner.in_snapshot.remove(&hash);
        match state {
            CheckpointState::Awaiting => {
                inner.awaiting.insert(hash);
            }
            CheckpointState::WaitingForAcceptance => {
                inner.waiting_for_acceptance.insert(hash);
            }
            CheckpointState::Accepted => {
                inner.accepted.insert(hash);
            }
            CheckpointState::InSnapshot => {
                inner.in_snapshot.insert(hash);
            }
        }
    }

    /// Marks `hash` as a tip (a checkpoint with no known successor) or clears
    /// that status. Gossip ingestion owns tip bookkeeping; this crate only
    /// stores the resulting set.
    pub async fn set_tip(&self, hash: impl Into<String>, is_tip: bool) {
        let mut inner = self.inner.write().await;
        let hash = hash.into();
        if is_tip {
            inner.tips.insert(hash);
        } else {
            inner.tips.remove(&hash);
        }
    }

    pub async fn record_usage(&self, hash: impl Into<String>) {
        let mut inner = self.inner.write().await;
        *inner.usages.entry(hash.into()).or_insert(0) += 1;
    }

    pub async fn get_checkpoint(&self, soe_hash: &str) -> Option<CheckpointCache> {
        self.inner.read().await.checkpoints.get(soe_hash).cloned()
    }

    pub async fn get_checkpoints(&self) -> HashMap<String, CheckpointCache> {
        self.inner.read().await.checkpoints.clone()
    }

    pub async fn get_accepted(&self) -> HashSet<String> {
        self.inner.read().await.accepted.clone()
    }

    pub async fn get_awaiting(&self) -> HashSet<String> {
        self.inner.read().await.awaiting.clone()
    }

    pub async fn get_waiting_for_acceptance(&self) -> HashSet<String> {
        self.inner.read().await.waiting_for_acceptance.clone()
    }

    pub async fn get_in_snapshot(&self) -> HashSet<String> {
        self.inner.read().await.in_snapshot.clone()
    }

    pub async fn get_tips(&self) -> HashSet<String> {
        self.inner.read().await.tips.clone()
    }

    pub async fn get_usages(&self) -> HashMap<String, u64> {
        self.inner.read().await.usages.clone()
    }

    /// Lowest `height.min` among current tips, or `0` when there are none
    /// (the genesis state).
    pub async fn get_min_tip_height(&self) -> i64 {
        let inner = self.inner.read().await;
        inner
            .tips
            .iter()
            .filter_map(|h| inner.checkpoints.get(h))
            .map(|c| c.height_min)
            .min()
            .unwrap_or(0)
    }

    /// Lowest `height.min` among blocks waiting for acceptance, if any.
    pub async fn get_min_waiting_height(&self) -> Option<i64> {
        let inner = self.inner.read().await;
        inner
            .waiting_for_acceptance
            .iter()
            .filter_map(|h| inner.checkpoints.get(h))
            .map(|c| c.height_min)
            .min()
    }

    /// Atomically transitions every hash in `pairs` from `accepted` to
    /// `inSnapshot`, per (I5). Hashes not currently in `accepted` are ignored.
    /// The height in each pair is informational only (it is the height the
    /// snapshot that finalized the block was cut at) and is not stored here.
    pub async fn mark_in_snapshot(&self, pairs: &HashSet<(String, i64)>) {
        let mut inner = self.inner.write().await;
        for (hash, _height) in pairs {
            if inner.accepted.remove(hash) {
                inner.in_snapshot.insert(hash.clone());
            } else {
                tracing::warn!(soe_hash = %hash, "markInSnapshot: hash not in accepted set");
            }
        }
    }

    /// Bulk-overwrites every lifecycle set and the checkpoint catalog in one
    /// step, used by the snapshot-info restore path (`setSnapshot`) after a
    /// redownload. Unlike [`Self::insert`], this does not reconcile a single
    /// hash across sets: the caller supplies a fully consistent partition.
    #[allow(clippy::too_many_arguments)]
    pub async fn restore(
        &self,
        checkpoints: HashMap<String, CheckpointCache>,
        awaiting: HashSet<String>,
        waiting_for_acceptance: HashSet<String>,
        accepted: HashSet<String>,
        in_snapshot: HashSet<String>,
        tips: HashSet<String>,
        usages: HashMap<String, u64>,
    ) {
        let mut inner = self.inner.write().await;
        inner.checkpoints = checkpoints;
        inner.awaiting = awaiting;
        inner.waiting_for_acceptance = waiting_for_acceptance;
        inner.accepted = accepted;
        inner.in_snapshot = in_snapshot;
        inner.tips = tips;
        inner.usages = usages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_places_hash_in_exactly_one_state() {
        let store = CheckpointStore::new();
        store
            .insert(CheckpointCache::new("a", 1), CheckpointState::Accepted)
            .await;
        assert!(store.get_accepted().await.contains("a"));
        assert!(!store.get_awaiting().await.contains("a"));
    }

    #[tokio::test]
    async fn mark_in_snapshot_moves_accepted_to_in_snapshot() {
        let store = CheckpointStore::new();
        store
            .insert(CheckpointCache::new("a", 1), CheckpointState::Accepted)
            .await;
        store
            .insert(CheckpointCache::new("b", 2), CheckpointState::Accepted)
            .await;

        let pairs: HashSet<(String, i64)> = [("a".to_string(), 2)].into_iter().collect();
        store.mark_in_snapshot(&pairs).await;

        assert!(store.get_in_snapshot().await.contains("a"));
        assert!(!store.get_accepted().await.contains("a"));
        assert!(store.get_accepted().await.contains("b"));
    }

    #[tokio::test]
    async fn min_tip_height_defaults_to_zero_when_no_tips() {
        let store = CheckpointStore::new();
        assert_eq!(store.get_min_tip_height().await, 0);
    }

    #[tokio::test]
    async fn min_waiting_height_is_none_when_empty() {
        let store = CheckpointStore::new();
        assert_eq!(store.get_min_waiting_height().await, None);
    }

    #[tokio::test]
    async fn restore_replaces_every_set_atomically() {
        let store = CheckpointStore::new();
        store
            .insert(CheckpointCache::new("stale", 1), CheckpointState::Accepted)
            .await;

        let mut checkpoints = HashMap::new();
        checkpoints.insert("a".to_string(), CheckpointCache::new("a", 5));
        let accepted: HashSet<String> = ["a".to_string()].into_iter().collect();

        store
            .restore(
                checkpoints,
                HashSet::new(),
                HashSet::new(),
                accepted,
                HashSet::new(),
                HashSet::new(),
                HashMap::new(),
            )
            .await;

        assert!(!store.get_accepted().await.contains("stale"));
        assert!(store.get_accepted().await.contains("a"));
        assert_eq!(store.get_checkpoint("stale").await, None);
    }

    #[test]
    fn checkpoint_cache_round_trips_canonically() {
        let cache = CheckpointCache::new("abc", 3);
        let back = CheckpointCache::from_bytes(&cache.to_bytes()).unwrap();
        assert_eq!(back.soe_hash, cache.soe_hash);
        assert_eq!(back.height_min, cache.height_min);
    }
}
