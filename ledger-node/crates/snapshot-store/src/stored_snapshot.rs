use std::collections::BTreeMap;

use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use checkpoint_store::CheckpointCache;
use tx_model::Id;

use crate::snapshot::Snapshot;

/// `(snapshot, checkpointCache)`: the on-disk payload written under
/// `snapshotStorage/<snapshotHash>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub checkpoint_cache: Vec<CheckpointCache>,
}

impl StoredSnapshot {
    pub fn new(snapshot: Snapshot, checkpoint_cache: Vec<CheckpointCache>) -> Self {
        Self {
            snapshot,
            checkpoint_cache,
        }
    }

    pub fn genesis() -> Self {
        Self::new(Snapshot::zero(), Vec::new())
    }
}

impl Canonical for StoredSnapshot {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::STORED_SNAPSHOT);
        self.snapshot.encode(w);
        w.write_seq(&self.checkpoint_cache, |w, c| c.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::STORED_SNAPSHOT)?;
        let snapshot = Snapshot::decode(r)?;
        let checkpoint_cache = r.read_seq(CheckpointCache::decode)?;
        Ok(StoredSnapshot {
            snapshot,
            checkpoint_cache,
        })
    }
}

/// Serialized under `eigenTrustStorage/<snapshotHash>` (optional). EigenTrust
/// computation itself is out of scope; this is only the storage shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRewards {
    pub per_address: BTreeMap<Id, f64>,
}

impl StoredRewards {
    pub fn new(per_address: BTreeMap<Id, f64>) -> Self {
        Self { per_address }
    }
}

impl Canonical for StoredRewards {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::STORED_REWARDS);
        let entries: Vec<(&Id, &f64)> = self.per_address.iter().collect();
        w.write_seq(&entries, |w, (id, amount)| {
            id.encode(w);
            w.write_f64(**amount);
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::STORED_REWARDS)?;
        let pairs = r.read_seq(|r| {
            let id = Id::decode(r)?;
            let amount = r.read_f64()?;
            Ok((id, amount))
        })?;
        Ok(StoredRewards {
            per_address: pairs.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_round_trips() {
        let s = StoredSnapshot::genesis();
        let back = StoredSnapshot::from_bytes(&s.to_bytes()).unwrap();
        assert_eq!(s.snapshot.hash, back.snapshot.hash);
        assert!(back.checkpoint_cache.is_empty());
    }

    #[test]
    fn stored_rewards_round_trip() {
        let mut per_address = BTreeMap::new();
        per_address.insert(Id::from_hex(hex::encode([2u8; 32])), 1.25);
        let rewards = StoredRewards::new(per_address);
        let back = StoredRewards::from_bytes(&rewards.to_bytes()).unwrap();
        assert_eq!(rewards, back);
    }
}
