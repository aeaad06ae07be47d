//! In-memory current-snapshot pointer (C5), the snapshot data model, and
//! the redownload/majority-height view (C7).

mod redownload;
mod snapshot;
mod storage;
mod stored_snapshot;

pub use redownload::RedownloadStorage;
pub use snapshot::{content_hash, Snapshot};
pub use storage::SnapshotStorage;
pub use stored_snapshot::{StoredRewards, StoredSnapshot};
