//! The snapshot lifecycle state machine (C9): the heart of the node.
//!
//! [`SnapshotService::attempt_snapshot`] is the single entry point. It reads
//! from checkpoint storage, snapshot storage, the redownload view, and the
//! trust manager; it writes to snapshot storage, local file storage, and the
//! address/transaction/observation services. Every precondition failure
//! short-circuits with a typed [`SnapshotError`] and leaves state untouched;
//! callers are expected to serialize calls to this type: it does not lock
//! against itself.

mod disk;
mod errors;
mod info;
mod pools;
mod rate_limit;
mod service;

pub use disk::{is_over_disk_capacity, MIN_USABLE_SPACE_BYTES};
pub use errors::SnapshotError;
pub use info::{SnapshotCreated, SnapshotInfo};
pub use pools::Pools;
pub use rate_limit::{NoopRateLimiter, SnapshotRateLimiter};
pub use service::{SnapshotService, SnapshotServiceConfig};
