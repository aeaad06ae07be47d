//! Predicted reputation per peer (C8). EigenTrust's actual score computation
//! lives elsewhere; this crate only holds the resulting map and serves it
//! to the snapshot core for inclusion as `Snapshot.publicReputation`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tx_model::Id;

#[derive(Clone, Default)]
pub struct TrustManager {
    reputation: Arc<RwLock<BTreeMap<Id, f64>>>,
}

impl TrustManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted map over `Id`, ready to drop straight into a `Snapshot`.
    pub async fn get_predicted_reputation(&self) -> BTreeMap<Id, f64> {
        self.reputation.read().await.clone()
    }

    pub async fn set_predicted_reputation(&self, id: Id, score: f64) {
        self.reputation.write().await.insert(id, score);
    }

    pub async fn set_all(&self, scores: BTreeMap<Id, f64>) {
        *self.reputation.write().await = scores;
    }
}
