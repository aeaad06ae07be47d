//! Key & signature primitives
//!
//! Keypair handling, sign/verify, and address derivation for the ledger node.
//! Every other component treats a public key as an opaque, lowercase-hex `Id`
//! (see the `tx-model` crate); this crate is the only place that touches raw
//! Ed25519 key material.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// Version byte prepended before hashing a public key into an address, so that
/// address derivation can evolve (e.g. a new scheme) without colliding with
/// addresses minted under this one.
const ADDRESS_VERSION: u8 = 0x00;
const ADDRESS_CHECKSUM_LEN: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("malformed public key bytes")]
    MalformedPublicKey,
    #[error("malformed signature bytes")]
    MalformedSignature,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("signature verification failed")]
    SignatureVerificationFailed,
    #[error("invalid address checksum")]
    InvalidAddressChecksum,
}

/// An Ed25519 keypair able to sign on behalf of its `Id`.
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new keypair from the OS random number generator.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.verifying_key.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        public_key_to_hex(&self.public_key_bytes())
    }

    /// Sign arbitrary bytes (typically the hex-decoded hash of an observation edge).
    pub fn sign(&self, data: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.signing_key.sign(data).to_bytes()
    }
}

/// `sign(bytes, privateKey) -> signatureBytes` as a free function over an
/// already-constructed keypair.
pub fn sign(data: &[u8], key_pair: &KeyPair) -> [u8; SIGNATURE_LEN] {
    key_pair.sign(data)
}

/// `verify(bytes, signatureBytes, publicKey) -> bool`.
pub fn verify(data: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    let verifying_key = bytes_to_verifying_key(public_key)?;
    let sig = bytes_to_signature(signature)?;
    Ok(verifying_key.verify(data, &sig).is_ok())
}

fn bytes_to_verifying_key(bytes: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let arr: [u8; PUBLIC_KEY_LEN] =
        bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            })?;
    VerifyingKey::from_bytes(&arr).map_err(|_| CryptoError::MalformedPublicKey)
}

fn bytes_to_signature(bytes: &[u8]) -> Result<Signature, CryptoError> {
    let arr: [u8; SIGNATURE_LEN] = bytes
        .try_into()
        .map_err(|_| CryptoError::MalformedSignature)?;
    Ok(Signature::from_bytes(&arr))
}

/// `publicKeyToHex(pk) -> string`.
pub fn public_key_to_hex(pk: &[u8]) -> String {
    hex::encode(pk)
}

/// `hexToPublicKey(h) -> pk`, the inverse of [`public_key_to_hex`].
pub fn hex_to_public_key(h: &str) -> Result<[u8; PUBLIC_KEY_LEN], CryptoError> {
    let bytes = hex::decode(h).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    bytes.try_into().map_err(|v: Vec<u8>| CryptoError::InvalidKeyLength {
        expected: PUBLIC_KEY_LEN,
        actual: v.len(),
    })
}

/// `publicKeyToAddress(pk) -> string`: base58 of
/// `version || ripemd160(sha256(pk)) || checksum`, where `checksum` is the
/// first four bytes of `sha256(sha256(version || ripemd160(sha256(pk))))`.
/// This is the Bitcoin-style versioned payload-plus-checksum scheme.
pub fn public_key_to_address(pk: &[u8]) -> String {
    let sha = Sha256::digest(pk);
    let ripe = Ripemd160::digest(sha);

    let mut payload = Vec::with_capacity(1 + ripe.len());
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(&ripe);

    let checksum_full = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum_full[..ADDRESS_CHECKSUM_LEN]);

    bs58::encode(payload).into_string()
}

/// Validates and strips the version/checksum wrapper from an address, returning
/// the underlying `ripemd160(sha256(pk))` digest.
pub fn address_to_ripemd(address: &str) -> Result<[u8; 20], CryptoError> {
    let payload = bs58::decode(address)
        .into_vec()
        .map_err(|_| CryptoError::InvalidAddressChecksum)?;
    if payload.len() != 1 + 20 + ADDRESS_CHECKSUM_LEN {
        return Err(CryptoError::InvalidAddressChecksum);
    }
    let (body, checksum) = payload.split_at(payload.len() - ADDRESS_CHECKSUM_LEN);
    let expected_checksum = Sha256::digest(Sha256::digest(body));
    if &expected_checksum[..ADDRESS_CHECKSUM_LEN] != checksum {
        return Err(CryptoError::InvalidAddressChecksum);
    }
    let mut ripe = [0u8; 20];
    ripe.copy_from_slice(&body[1..]);
    Ok(ripe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let kp = KeyPair::generate();
        let data = b"attempt-snapshot";
        let sig = sign(data, &kp);
        assert!(verify(data, &sig, &kp.public_key_bytes()).unwrap());
        assert!(!verify(b"other data", &sig, &kp.public_key_bytes()).unwrap());
    }

    #[test]
    fn hex_round_trip() {
        let kp = KeyPair::generate();
        let hex_pk = kp.public_key_hex();
        let decoded = hex_to_public_key(&hex_pk).unwrap();
        assert_eq!(decoded, kp.public_key_bytes());
    }

    #[test]
    fn address_derivation_is_deterministic_and_checksummed() {
        let kp = KeyPair::generate();
        let pk = kp.public_key_bytes();
        let addr1 = public_key_to_address(&pk);
        let addr2 = public_key_to_address(&pk);
        assert_eq!(addr1, addr2);
        assert!(address_to_ripemd(&addr1).is_ok());
    }

    #[test]
    fn tampered_address_fails_checksum() {
        let kp = KeyPair::generate();
        let mut addr = public_key_to_address(&kp.public_key_bytes());
        addr.push('x');
        assert!(address_to_ripemd(&addr).is_err());
    }

    proptest::proptest! {
        /// A signature produced for arbitrary bytes always verifies against
        /// the signer's own public key, and never against tampered data.
        #[test]
        fn sign_verifies_for_arbitrary_data(data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256)) {
            let kp = KeyPair::generate();
            let sig = sign(&data, &kp);
            proptest::prop_assert!(verify(&data, &sig, &kp.public_key_bytes()).unwrap());

            let mut tampered = data.clone();
            tampered.push(0);
            proptest::prop_assert!(!verify(&tampered, &sig, &kp.public_key_bytes()).unwrap());
        }
    }
}
