use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tx_model::ObservationEdge;

/// Tracks observations still pending finalization. Gossip ingestion
/// populates this set (outside this crate's scope); (C9) drains it via
/// [`Self::remove_observations`] once a block carrying them is snapshotted.
#[derive(Clone, Default)]
pub struct ObservationService {
    pending: Arc<RwLock<HashSet<String>>>,
}

impl ObservationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_observation(&self, observation: &ObservationEdge) {
        let hash = canonical_enc::hash_hex(observation);
        self.pending.write().await.insert(hash);
    }

    pub async fn is_pending(&self, observation: &ObservationEdge) -> bool {
        let hash = canonical_enc::hash_hex(observation);
        self.pending.read().await.contains(&hash)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    pub async fn remove_observations(&self, observations: &[ObservationEdge]) {
        let mut pending = self.pending.write().await;
        for observation in observations {
            let hash = canonical_enc::hash_hex(observation);
            pending.remove(&hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tx_model::{HashType, TypedEdgeHash};

    fn sample(tag: &str) -> ObservationEdge {
        ObservationEdge::new(
            vec![TypedEdgeHash::new(format!("src-{tag}"), HashType::AddressHash)],
            TypedEdgeHash::new(format!("data-{tag}"), HashType::TransactionDataHash),
        )
    }

    #[tokio::test]
    async fn remove_observations_clears_only_listed_entries() {
        let service = ObservationService::new();
        let a = sample("a");
        let b = sample("b");
        service.add_observation(&a).await;
        service.add_observation(&b).await;

        service.remove_observations(std::slice::from_ref(&a)).await;

        assert!(!service.is_pending(&a).await);
        assert!(service.is_pending(&b).await);
    }
}
