use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// View of the latest height a quorum of peers has agreed on, used by (C9)'s
/// majority-distance gate. Populated by the redownload/majority-height
/// tracking client, which lives outside this core (the gossip transport).
#[derive(Clone)]
pub struct RedownloadStorage {
    latest_majority_height: Arc<AtomicI64>,
}

impl RedownloadStorage {
    pub fn new(initial: i64) -> Self {
        Self {
            latest_majority_height: Arc::new(AtomicI64::new(initial)),
        }
    }

    pub fn latest_majority_height(&self) -> i64 {
        self.latest_majority_height.load(Ordering::SeqCst)
    }

    pub fn set_latest_majority_height(&self, height: i64) {
        self.latest_majority_height.store(height, Ordering::SeqCst);
    }
}

impl Default for RedownloadStorage {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_zero_and_is_settable() {
        let storage = RedownloadStorage::default();
        assert_eq!(storage.latest_majority_height(), 0);
        storage.set_latest_majority_height(42);
        assert_eq!(storage.latest_majority_height(), 42);
    }
}
