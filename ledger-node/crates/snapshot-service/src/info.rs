use std::collections::{HashMap, HashSet};

use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use checkpoint_store::CheckpointCache;
use ledger_services::AddressBalance;
use snapshot_store::Snapshot;
use tx_model::{Id, LastTransactionRef};

/// Full recoverable state, assembled by `writeSnapshotInfoToDisk` and
/// consumed by the restore path `setSnapshot` after a redownload.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub current_snapshot: Snapshot,
    pub last_snapshot_height: i32,
    pub next_snapshot_hash: String,
    pub checkpoints: HashMap<String, CheckpointCache>,
    pub waiting_for_acceptance: HashSet<String>,
    pub accepted: HashSet<String>,
    pub awaiting: HashSet<String>,
    pub in_snapshot: HashSet<String>,
    pub address_cache: Vec<AddressBalance>,
    pub last_accepted_tx_ref: HashMap<Id, LastTransactionRef>,
    pub tips: HashSet<String>,
    pub usages: HashMap<String, u64>,
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut v: Vec<String> = set.iter().cloned().collect();
    v.sort();
    v
}

impl Canonical for SnapshotInfo {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::SNAPSHOT_INFO);
        self.current_snapshot.encode(w);
        w.write_i64(self.last_snapshot_height as i64);
        w.write_str(&self.next_snapshot_hash);

        let mut checkpoint_hashes: Vec<&String> = self.checkpoints.keys().collect();
        checkpoint_hashes.sort();
        w.write_seq(&checkpoint_hashes, |w, h| self.checkpoints[*h].encode(w));

        w.write_seq(&sorted(&self.waiting_for_acceptance), |w, h| w.write_str(h));
        w.write_seq(&sorted(&self.accepted), |w, h| w.write_str(h));
        w.write_seq(&sorted(&self.awaiting), |w, h| w.write_str(h));
        w.write_seq(&sorted(&self.in_snapshot), |w, h| w.write_str(h));

        let mut address_cache = self.address_cache.clone();
        address_cache.sort_by(|a, b| a.address.as_hex().cmp(b.address.as_hex()));
        w.write_seq(&address_cache, |w, b| b.encode(w));

        let mut tx_refs: Vec<(&Id, &LastTransactionRef)> = self.last_accepted_tx_ref.iter().collect();
        tx_refs.sort_by(|a, b| a.0.as_hex().cmp(b.0.as_hex()));
        w.write_seq(&tx_refs, |w, (id, r)| {
            id.encode(w);
            r.encode(w);
        });

        w.write_seq(&sorted(&self.tips), |w, h| w.write_str(h));

        let mut usages: Vec<(&String, &u64)> = self.usages.iter().collect();
        usages.sort_by(|a, b| a.0.cmp(b.0));
        w.write_seq(&usages, |w, (h, count)| {
            w.write_str(h);
            w.write_u64(**count);
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::SNAPSHOT_INFO)?;
        let current_snapshot = Snapshot::decode(r)?;
        let last_snapshot_height = r.read_i64()? as i32;
        let next_snapshot_hash = r.read_str()?;

        let checkpoints = r
            .read_seq(CheckpointCache::decode)?
            .into_iter()
            .map(|c| (c.soe_hash.clone(), c))
            .collect();

        let waiting_for_acceptance = r.read_seq(|r| r.read_str())?.into_iter().collect();
        let accepted = r.read_seq(|r| r.read_str())?.into_iter().collect();
        let awaiting = r.read_seq(|r| r.read_str())?.into_iter().collect();
        let in_snapshot = r.read_seq(|r| r.read_str())?.into_iter().collect();

        let address_cache = r.read_seq(AddressBalance::decode)?;

        let last_accepted_tx_ref = r
            .read_seq(|r| {
                let id = Id::decode(r)?;
                let last_ref = LastTransactionRef::decode(r)?;
                Ok((id, last_ref))
            })?
            .into_iter()
            .collect();

        let tips = r.read_seq(|r| r.read_str())?.into_iter().collect();

        let usages = r
            .read_seq(|r| {
                let hash = r.read_str()?;
                let count = r.read_u64()?;
                Ok((hash, count))
            })?
            .into_iter()
            .collect();

        Ok(SnapshotInfo {
            current_snapshot,
            last_snapshot_height,
            next_snapshot_hash,
            checkpoints,
            waiting_for_acceptance,
            accepted,
            awaiting,
            in_snapshot,
            address_cache,
            last_accepted_tx_ref,
            tips,
            usages,
        })
    }
}

/// Returned by a successful `attempt_snapshot` call.
#[derive(Debug, Clone)]
pub struct SnapshotCreated {
    pub hash: String,
    pub height: i32,
    pub checkpoint_blocks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_info_round_trips() {
        let info = SnapshotInfo {
            current_snapshot: Snapshot::zero(),
            last_snapshot_height: 0,
            next_snapshot_hash: Snapshot::zero().hash,
            checkpoints: HashMap::new(),
            waiting_for_acceptance: HashSet::new(),
            accepted: HashSet::new(),
            awaiting: HashSet::new(),
            in_snapshot: HashSet::new(),
            address_cache: Vec::new(),
            last_accepted_tx_ref: HashMap::new(),
            tips: HashSet::new(),
            usages: HashMap::new(),
        };
        let bytes = info.to_bytes();
        let back = SnapshotInfo::from_bytes(&bytes).unwrap();
        assert_eq!(back.current_snapshot.hash, info.current_snapshot.hash);
        assert_eq!(back.last_snapshot_height, 0);
    }
}
