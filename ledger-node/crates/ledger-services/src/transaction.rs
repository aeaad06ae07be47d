use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tx_model::{Id, LastTransactionRef};

use crate::errors::LedgerServiceError;

/// Tracks the last accepted `LastTransactionRef` per address and enforces
/// that ordinals only ever advance.
#[derive(Clone, Default)]
pub struct TransactionService {
    last_tx_ref: Arc<RwLock<HashMap<Id, LastTransactionRef>>>,
}

impl TransactionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_last_transaction_ref(&self, address: &Id) -> LastTransactionRef {
        self.last_tx_ref
            .read()
            .await
            .get(address)
            .cloned()
            .unwrap_or_else(LastTransactionRef::empty)
    }

    /// Overwrites an address's last-transaction-reference directly, bypassing
    /// the monotonicity check. Used only by the snapshot-info restore path
    /// after a redownload.
    pub async fn set_last_transaction_ref(&self, address: Id, last_ref: LastTransactionRef) {
        self.last_tx_ref.write().await.insert(address, last_ref);
    }

    pub async fn snapshot(&self) -> HashMap<Id, LastTransactionRef> {
        self.last_tx_ref.read().await.clone()
    }

    /// Applies `new_ref` as the address's latest reference, failing if its
    /// ordinal does not strictly exceed the one currently on record.
    pub async fn apply_snapshot_direct(
        &self,
        address: &Id,
        new_ref: LastTransactionRef,
    ) -> Result<(), LedgerServiceError> {
        let mut refs = self.last_tx_ref.write().await;
        let current = refs.get(address).cloned().unwrap_or_else(LastTransactionRef::empty);
        if new_ref.ordinal <= current.ordinal && !(current.ordinal == 0 && current.hash.is_empty()) {
            return Err(LedgerServiceError::OrdinalNotMonotonic {
                address: address.to_string(),
                current: current.ordinal,
                attempted: new_ref.ordinal,
            });
        }
        refs.insert(address.clone(), new_ref);
        Ok(())
    }
}
