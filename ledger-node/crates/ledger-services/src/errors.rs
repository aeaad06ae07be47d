#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerServiceError {
    #[error("transaction edge is missing its two address-hash parents")]
    MalformedTransactionParents,
    #[error(
        "last-tx-ref ordinal for {address} did not advance: current {current}, got {attempted}"
    )]
    OrdinalNotMonotonic {
        address: String,
        current: u64,
        attempted: u64,
    },
}
