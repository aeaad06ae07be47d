use std::collections::BTreeMap;

use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use tx_model::Id;

/// `(hash, lastSnapshotHash, checkpointBlocks, publicReputation)`.
///
/// `hash` is the content hash of the other three fields; it is computed by
/// [`Snapshot::new`] via [`content_hash`] and is itself excluded from that
/// computation, since a value can't hash over a field that holds its own
/// hash. [`Canonical::encode`]/`decode`, used for on-disk persistence, do
/// carry the `hash` field: it is redundant with the other three but cheap to
/// verify on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub hash: String,
    pub last_snapshot_hash: String,
    pub checkpoint_blocks: Vec<String>,
    pub public_reputation: BTreeMap<Id, f64>,
}

impl Snapshot {
    pub fn new(
        last_snapshot_hash: String,
        checkpoint_blocks: Vec<String>,
        public_reputation: BTreeMap<Id, f64>,
    ) -> Self {
        let hash = content_hash(&last_snapshot_hash, &checkpoint_blocks, &public_reputation);
        Self {
            hash,
            last_snapshot_hash,
            checkpoint_blocks,
            public_reputation,
        }
    }

    /// The genesis sentinel: empty blocks, no predecessor, no reputation.
    pub fn zero() -> Self {
        Self::new(String::new(), Vec::new(), BTreeMap::new())
    }

    pub fn is_zero(&self) -> bool {
        self.checkpoint_blocks.is_empty() && self.last_snapshot_hash.is_empty()
    }
}

/// Hashes `(last_snapshot_hash, checkpoint_blocks, public_reputation)` per
/// (I3): SHA-256 of their canonical binary serialization, independent of any
/// `Snapshot.hash` field.
pub fn content_hash(
    last_snapshot_hash: &str,
    checkpoint_blocks: &[String],
    public_reputation: &BTreeMap<Id, f64>,
) -> String {
    let mut w = Writer::new();
    w.write_str(last_snapshot_hash);
    w.write_seq(checkpoint_blocks, |w, h| w.write_str(h));
    let entries: Vec<(&Id, &f64)> = public_reputation.iter().collect();
    w.write_seq(&entries, |w, (id, score)| {
        id.encode(w);
        w.write_f64(**score);
    });
    canonical_enc::sha256_hex(&w.into_bytes())
}

impl Canonical for Snapshot {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::SNAPSHOT);
        w.write_str(&self.hash);
        w.write_str(&self.last_snapshot_hash);
        w.write_seq(&self.checkpoint_blocks, |w, h| w.write_str(h));
        let entries: Vec<(&Id, &f64)> = self.public_reputation.iter().collect();
        w.write_seq(&entries, |w, (id, score)| {
            id.encode(w);
            w.write_f64(**score);
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::SNAPSHOT)?;
        let hash = r.read_str()?;
        let last_snapshot_hash = r.read_str()?;
        let checkpoint_blocks = r.read_seq(|r| r.read_str())?;
        let pairs = r.read_seq(|r| {
            let id = Id::decode(r)?;
            let score = r.read_f64()?;
            Ok((id, score))
        })?;
        let public_reputation = pairs.into_iter().collect();
        Ok(Snapshot {
            hash,
            last_snapshot_hash,
            checkpoint_blocks,
            public_reputation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_a_fixed_sentinel() {
        let a = Snapshot::zero();
        let b = Snapshot::zero();
        assert_eq!(a.hash, b.hash);
        assert!(a.is_zero());
    }

    #[test]
    fn hash_changes_with_content() {
        let a = Snapshot::new("prev".into(), vec!["x".into()], BTreeMap::new());
        let b = Snapshot::new("prev".into(), vec!["y".into()], BTreeMap::new());
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn round_trips_canonically() {
        let mut rep = BTreeMap::new();
        rep.insert(Id::from_hex(hex::encode([1u8; 32])), 0.5);
        let s = Snapshot::new("prev".into(), vec!["a".into(), "b".into()], rep);
        let back = Snapshot::from_bytes(&s.to_bytes()).unwrap();
        assert_eq!(s, back);
    }
}
