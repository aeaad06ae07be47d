/// Error taxonomy for `attempt_snapshot` and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("not enough disk space to write a snapshot")]
    NotEnoughSpace,
    #[error("no accepted checkpoint blocks since the last snapshot")]
    NoAcceptedCBsSinceSnapshot,
    #[error("no accepted checkpoint blocks fall within the next height interval")]
    NoBlocksWithinHeightInterval,
    #[error("height interval condition not met")]
    HeightIntervalConditionNotMet,
    #[error("too many accepted checkpoint-block hashes held in memory")]
    MaxCBHashesInMemory,
    #[error("node is not ready to attempt snapshots")]
    NodeNotReadyForSnapshots,
    #[error("illegal state: a checkpoint block referenced by the accepted set is missing")]
    SnapshotIllegalState,
    #[error("snapshot I/O error: {0}")]
    SnapshotIOError(String),
    #[error("snapshot info I/O error: {0}")]
    SnapshotInfoIOError(String),
    #[error("eigentrust rewards I/O error: {0}")]
    EigenTrustIOError(String),
    #[error("unexpected error: {0}")]
    SnapshotUnexpectedError(String),
}

impl SnapshotError {
    /// Benign errors are expected in normal operation (a quiet node, a tip
    /// still catching up) and are logged/counted rather than escalated.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            SnapshotError::NoAcceptedCBsSinceSnapshot
                | SnapshotError::NoBlocksWithinHeightInterval
                | SnapshotError::HeightIntervalConditionNotMet
        )
    }
}
