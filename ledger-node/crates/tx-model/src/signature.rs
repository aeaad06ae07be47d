use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};
use crypto_primitives::CryptoError;

use crate::id::Id;

/// `(signatureHex, signerId)`, totally ordered by signature hex so that a
/// [`SignatureBatch`] has one canonical member order regardless of arrival
/// order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HashSignature {
    pub signature_hex: String,
    pub signer_id: Id,
}

impl HashSignature {
    pub fn new(signature_hex: impl Into<String>, signer_id: Id) -> Self {
        Self {
            signature_hex: signature_hex.into(),
            signer_id,
        }
    }

    /// Verifies this signature against `hash_hex`, the hex-encoded hash it is
    /// supposed to cover. The signed message is the hex string's own ASCII
    /// bytes, matching what `create_transaction_edge` signs.
    pub fn valid(&self, hash_hex: &str) -> Result<bool, CryptoError> {
        let sig = hex::decode(&self.signature_hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let pk = self.signer_id.public_key_bytes()?;
        crypto_primitives::verify(hash_hex.as_bytes(), &sig, &pk)
    }
}

impl Canonical for HashSignature {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::HASH_SIGNATURE);
        w.write_str(&self.signature_hex);
        self.signer_id.encode(w);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::HASH_SIGNATURE)?;
        let signature_hex = r.read_str()?;
        let signer_id = Id::decode(r)?;
        Ok(HashSignature {
            signature_hex,
            signer_id,
        })
    }
}

/// `(hash, signatures)`. `combine` (I1) is commutative, associative and
/// idempotent: the union of two batches' signatures, deduplicated and sorted
/// by signature hex. `hash` is fixed across merges of the same logical
/// observation; callers are responsible for only combining batches that
/// agree on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBatch {
    pub hash: String,
    pub signatures: Vec<HashSignature>,
}

impl SignatureBatch {
    pub fn single(hash: impl Into<String>, signature: HashSignature) -> Self {
        Self {
            hash: hash.into(),
            signatures: vec![signature],
        }
    }

    pub fn new(hash: impl Into<String>, mut signatures: Vec<HashSignature>) -> Self {
        signatures.sort();
        signatures.dedup();
        Self {
            hash: hash.into(),
            signatures,
        }
    }

    /// Union of `self` and `other`'s signatures, sorted and deduplicated.
    /// Commutative, associative, idempotent (I1).
    pub fn combine(&self, other: &SignatureBatch) -> SignatureBatch {
        let mut merged = self.signatures.clone();
        merged.extend(other.signatures.iter().cloned());
        merged.sort();
        merged.dedup();
        SignatureBatch {
            hash: self.hash.clone(),
            signatures: merged,
        }
    }
}

impl Canonical for SignatureBatch {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::SIGNATURE_BATCH);
        w.write_str(&self.hash);
        w.write_seq(&self.signatures, |w, s| s.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::SIGNATURE_BATCH)?;
        let hash = r.read_str()?;
        let signatures = r.read_seq(HashSignature::decode)?;
        Ok(SignatureBatch { hash, signatures })
    }
}

/// Wraps a [`SignatureBatch`]; `base_hash` is the batch's hash, i.e. the hash
/// of the observation edge the batch's signatures cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedObservationEdge {
    pub signature_batch: SignatureBatch,
}

impl SignedObservationEdge {
    pub fn new(signature_batch: SignatureBatch) -> Self {
        Self { signature_batch }
    }

    pub fn base_hash(&self) -> &str {
        &self.signature_batch.hash
    }
}

impl Canonical for SignedObservationEdge {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::SIGNED_OBSERVATION_EDGE);
        self.signature_batch.encode(w);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::SIGNED_OBSERVATION_EDGE)?;
        let signature_batch = SignatureBatch::decode(r)?;
        Ok(SignedObservationEdge { signature_batch })
    }
}
