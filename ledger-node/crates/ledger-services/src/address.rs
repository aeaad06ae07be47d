use std::collections::HashMap;
use std::sync::Arc;

use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use tokio::sync::RwLock;
use tx_model::{Edge, HashType, TransactionEdgeData};

use crate::errors::LedgerServiceError;

/// `(address, balance)`, on-disk shape used by `SnapshotInfo`'s per-address
/// cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBalance {
    pub address: tx_model::Id,
    pub balance: i64,
}

impl Canonical for AddressBalance {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::ADDRESS_BALANCE);
        self.address.encode(w);
        w.write_i64(self.balance);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::ADDRESS_BALANCE)?;
        let address = tx_model::Id::decode(r)?;
        let balance = r.read_i64()?;
        Ok(AddressBalance { address, balance })
    }
}

/// A transaction with zero amount and no fee carries no ledger effect; it
/// exists only to anchor an observation (e.g. a liveness ping).
fn is_dummy_transaction(data: &TransactionEdgeData) -> bool {
    data.amount == 0 && data.fee.is_none()
}

#[derive(Clone, Default)]
pub struct AddressService {
    balances: Arc<RwLock<HashMap<tx_model::Id, i64>>>,
}

impl AddressService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_balance(&self, address: &tx_model::Id) -> i64 {
        self.balances.read().await.get(address).copied().unwrap_or(0)
    }

    /// Overwrites a balance directly, bypassing transfer bookkeeping. Used
    /// only by the snapshot-info restore path after a redownload.
    pub async fn set_balance(&self, address: tx_model::Id, balance: i64) {
        self.balances.write().await.insert(address, balance);
    }

    pub async fn snapshot(&self) -> HashMap<tx_model::Id, i64> {
        self.balances.read().await.clone()
    }

    /// Debits the sender (amount + fee) and credits the recipient, skipping
    /// dummy transactions. Parents are `[src, dst]`, both `AddressHash`,
    /// per (I6).
    pub async fn transfer_snapshot_transaction(
        &self,
        tx: &Edge<TransactionEdgeData>,
    ) -> Result<(), LedgerServiceError> {
        if is_dummy_transaction(&tx.data) {
            return Ok(());
        }

        let parents = tx.parents();
        let [src_hash, dst_hash] = parents else {
            return Err(LedgerServiceError::MalformedTransactionParents);
        };
        debug_assert_eq!(src_hash.hash_type, HashType::AddressHash);
        debug_assert_eq!(dst_hash.hash_type, HashType::AddressHash);

        let src = tx_model::Id::from_hex(src_hash.hash.clone());
        let dst = tx_model::Id::from_hex(dst_hash.hash.clone());
        let debit = tx.data.amount + tx.data.fee.unwrap_or(0);

        let mut balances = self.balances.write().await;
        *balances.entry(src).or_insert(0) -= debit;
        *balances.entry(dst).or_insert(0) += tx.data.amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_primitives::KeyPair;
    use tx_model::{create_transaction_edge, LastTransactionRef};

    fn dst_id() -> tx_model::Id {
        tx_model::Id::from_hex(hex::encode([5u8; 32]))
    }

    #[tokio::test]
    async fn transfer_moves_amount_and_fee() {
        let kp = KeyPair::generate();
        let src = tx_model::Id::from_public_key_bytes(&kp.public_key_bytes());
        let dst = dst_id();
        let tx = create_transaction_edge(&src, &dst, LastTransactionRef::empty(), 10, &kp, Some(1), false);

        let service = AddressService::new();
        service.transfer_snapshot_transaction(&tx).await.unwrap();

        assert_eq!(service.get_balance(&src).await, -11);
        assert_eq!(service.get_balance(&dst).await, 10);
    }

    #[tokio::test]
    async fn dummy_transaction_has_no_effect() {
        let kp = KeyPair::generate();
        let src = tx_model::Id::from_public_key_bytes(&kp.public_key_bytes());
        let dst = dst_id();
        let tx = create_transaction_edge(&src, &dst, LastTransactionRef::empty(), 0, &kp, None, false);

        let service = AddressService::new();
        service.transfer_snapshot_transaction(&tx).await.unwrap();

        assert_eq!(service.get_balance(&src).await, 0);
        assert_eq!(service.get_balance(&dst).await, 0);
    }
}
