use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The bounded execution pool of the lifecycle: a small pinned-size pool for
/// CPU-bound serialization and ledger application, backed by
/// `tokio::task::spawn_blocking` and additionally gated by a semaphore so at
/// most `capacity` jobs run at once. The elastic unbounded pool for file I/O
/// is `LocalFileStorage`'s own `spawn_blocking` hop; callers reach it simply
/// by awaiting a storage method, with no separate handle needed here.
#[derive(Clone)]
pub struct Pools {
    bounded: Arc<Semaphore>,
}

impl Pools {
    pub fn new(bounded_capacity: usize) -> Self {
        Self {
            bounded: Arc::new(Semaphore::new(bounded_capacity.max(1))),
        }
    }

    /// Holds a bounded-pool permit across an async section that performs
    /// ledger application. Ledger application here is inherently async (it
    /// mutates lock-guarded services), so it can't run inside
    /// `spawn_blocking`; the permit still bounds how many such sections run
    /// concurrently, matching the bounded pool's role as a concurrency limit.
    pub async fn bounded_permit(&self) -> OwnedSemaphorePermit {
        self.bounded
            .clone()
            .acquire_owned()
            .await
            .expect("bounded pool semaphore is never closed")
    }

    /// Runs a genuinely CPU-bound closure (e.g. canonical serialization) on
    /// the bounded pool.
    pub async fn run_bounded<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let _permit = self.bounded_permit().await;
        tokio::task::spawn_blocking(f)
            .await
            .expect("bounded-pool task panicked")
    }
}

impl Default for Pools {
    fn default() -> Self {
        Self::new(4)
    }
}
