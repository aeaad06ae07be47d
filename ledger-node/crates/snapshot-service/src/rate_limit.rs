/// Resetting rate limiting for newly snapshotted hashes is the job of a
/// per-checkpoint-hash rate limiter owned by the gossip ingestion pipeline,
/// which lives outside this crate. This trait is the seam: the snapshot
/// core calls [`SnapshotRateLimiter::reset`] for every hash it just
/// committed, and whatever rate limiter the gossip layer installs picks it
/// back up.
pub trait SnapshotRateLimiter: Send + Sync {
    fn reset(&self, soe_hash: &str);
}

/// Used when no gossip-side rate limiter is wired in (e.g. in tests, or a
/// node built without the gossip transport).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRateLimiter;

impl SnapshotRateLimiter for NoopRateLimiter {
    fn reset(&self, _soe_hash: &str) {}
}
