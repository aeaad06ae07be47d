use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use crypto_primitives::KeyPair;
use rand::RngCore;

use crate::id::Id;
use crate::observation::ObservationEdge;
use crate::signature::{HashSignature, SignatureBatch, SignedObservationEdge};
use crate::typed_edge_hash::{HashType, TypedEdgeHash};

/// Fixed-point scaling applied to a transaction amount when `normalized` is
/// set, per (C3) step 1.
const NORMALIZATION_FACTOR: i64 = 100_000_000;

/// `(hash, ordinal)`; `empty()` is the sentinel for an address with no prior
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LastTransactionRef {
    pub hash: String,
    pub ordinal: u64,
}

impl LastTransactionRef {
    pub fn empty() -> Self {
        Self {
            hash: String::new(),
            ordinal: 0,
        }
    }

    pub fn new(hash: impl Into<String>, ordinal: u64) -> Self {
        Self {
            hash: hash.into(),
            ordinal,
        }
    }
}

impl Canonical for LastTransactionRef {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::LAST_TRANSACTION_REF);
        w.write_str(&self.hash);
        w.write_u64(self.ordinal);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::LAST_TRANSACTION_REF)?;
        let hash = r.read_str()?;
        let ordinal = r.read_u64()?;
        Ok(LastTransactionRef { hash, ordinal })
    }
}

/// `(amount, lastTxRef, fee?, salt)`. `salt` disambiguates otherwise-identical
/// `(src, dst, amount)` transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEdgeData {
    pub amount: i64,
    pub last_tx_ref: LastTransactionRef,
    pub fee: Option<i64>,
    pub salt: i64,
}

impl Canonical for TransactionEdgeData {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::TRANSACTION_EDGE_DATA);
        w.write_i64(self.amount);
        self.last_tx_ref.encode(w);
        w.write_option(self.fee.is_some(), |w| w.write_i64(self.fee.unwrap_or_default()));
        w.write_i64(self.salt);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::TRANSACTION_EDGE_DATA)?;
        let amount = r.read_i64()?;
        let last_tx_ref = LastTransactionRef::decode(r)?;
        let fee = r.read_option(|r| r.read_i64())?;
        let salt = r.read_i64()?;
        Ok(TransactionEdgeData {
            amount,
            last_tx_ref,
            fee,
            salt,
        })
    }
}

/// `(observationEdge, signedObservationEdge, data)`. `baseHash` and `parents`
/// are derived, never stored redundantly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<D> {
    pub observation_edge: ObservationEdge,
    pub signed_observation_edge: SignedObservationEdge,
    pub data: D,
}

impl<D> Edge<D> {
    pub fn base_hash(&self) -> &str {
        self.signed_observation_edge.base_hash()
    }

    pub fn parents(&self) -> &[TypedEdgeHash] {
        &self.observation_edge.parents
    }
}

impl<D: Canonical> Canonical for Edge<D> {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::TRANSACTION_EDGE);
        self.observation_edge.encode(w);
        self.signed_observation_edge.encode(w);
        self.data.encode(w);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::TRANSACTION_EDGE)?;
        let observation_edge = ObservationEdge::decode(r)?;
        let signed_observation_edge = SignedObservationEdge::decode(r)?;
        let data = D::decode(r)?;
        Ok(Edge {
            observation_edge,
            signed_observation_edge,
            data,
        })
    }
}

/// Builds a self-verifying transaction edge signed by `src`, per (C3).
///
/// 1. If `normalized`, scales `amount` by 10^8 into base units.
/// 2. Builds the `TransactionEdgeData` with a fresh random salt.
/// 3. Builds the `ObservationEdge` over `[src, dst]` address hashes and the
///    data hash.
/// 4. Hashes the observation edge, signs it with `key_pair`, and wraps the
///    signature in a single-element `SignatureBatch`.
pub fn create_transaction_edge(
    src: &Id,
    dst: &Id,
    last_tx_ref: LastTransactionRef,
    amount: i64,
    key_pair: &KeyPair,
    fee: Option<i64>,
    normalized: bool,
) -> Edge<TransactionEdgeData> {
    let amount = if normalized {
        amount * NORMALIZATION_FACTOR
    } else {
        amount
    };

    let salt = rand::rngs::OsRng.next_u64() as i64;
    let tx_data = TransactionEdgeData {
        amount,
        last_tx_ref,
        fee,
        salt,
    };
    let data_hash = canonical_enc::hash_hex(&tx_data);

    let observation_edge = ObservationEdge::new(
        vec![
            TypedEdgeHash::new(src.as_hex().to_string(), HashType::AddressHash),
            TypedEdgeHash::new(dst.as_hex().to_string(), HashType::AddressHash),
        ],
        TypedEdgeHash::new(data_hash, HashType::TransactionDataHash),
    );
    let oe_hash = canonical_enc::hash_hex(&observation_edge);

    let signature = key_pair.sign(oe_hash.as_bytes());
    let signature_hex = hex::encode(signature);
    let batch = SignatureBatch::single(oe_hash, HashSignature::new(signature_hex, src.clone()));
    let signed_observation_edge = SignedObservationEdge::new(batch);

    Edge {
        observation_edge,
        signed_observation_edge,
        data: tx_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_primitives::KeyPair;

    #[test]
    fn normalized_amount_is_scaled() {
        let kp = KeyPair::generate();
        let src = Id::from_public_key_bytes(&kp.public_key_bytes());
        let dst = Id::from_hex(hex::encode([7u8; 32]));
        let edge = create_transaction_edge(&src, &dst, LastTransactionRef::empty(), 5, &kp, None, true);
        assert_eq!(edge.data.amount, 5 * NORMALIZATION_FACTOR);
    }

    #[test]
    fn edge_is_self_verifying_and_base_hash_matches_observation_edge_hash() {
        let kp = KeyPair::generate();
        let src = Id::from_public_key_bytes(&kp.public_key_bytes());
        let dst = Id::from_hex(hex::encode([9u8; 32]));
        let edge = create_transaction_edge(&src, &dst, LastTransactionRef::empty(), 1, &kp, Some(10), false);

        let oe_hash = canonical_enc::hash_hex(&edge.observation_edge);
        assert_eq!(edge.base_hash(), oe_hash);

        let sig = &edge.signed_observation_edge.signature_batch.signatures[0];
        assert!(sig.valid(&oe_hash).unwrap());
    }

    #[test]
    fn edge_round_trips_canonically() {
        let kp = KeyPair::generate();
        let src = Id::from_public_key_bytes(&kp.public_key_bytes());
        let dst = Id::from_hex(hex::encode([3u8; 32]));
        let edge = create_transaction_edge(&src, &dst, LastTransactionRef::empty(), 2, &kp, None, true);
        let back = Edge::<TransactionEdgeData>::from_bytes(&edge.to_bytes()).unwrap();
        assert_eq!(edge, back);
    }
}
