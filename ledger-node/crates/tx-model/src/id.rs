use canonical_enc::{Canonical, EncodingError, Reader, Writer};
use crypto_primitives::{hex_to_public_key, public_key_to_address, public_key_to_hex, CryptoError};

/// A public key, held as lowercase hex. Trivially copyable (cheap to clone as a
/// `String`); every derived view (address, raw bytes) is recomputed on demand
/// rather than cached, so an `Id` never needs interior mutation to stay
/// thread-safe.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(String);

impl Id {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_lowercase())
    }

    pub fn from_public_key_bytes(pk: &[u8]) -> Self {
        Self(public_key_to_hex(pk))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    pub fn public_key_bytes(&self) -> Result<[u8; 32], CryptoError> {
        hex_to_public_key(&self.0)
    }

    /// base58 address derived from this public key, per (C2).
    pub fn to_address(&self) -> Result<String, CryptoError> {
        let bytes = self.public_key_bytes()?;
        Ok(public_key_to_address(&bytes))
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Canonical for Id {
    fn encode(&self, w: &mut Writer) {
        w.write_str(&self.0);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        Ok(Id(r.read_str()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes_and_canonical() {
        let kp = crypto_primitives::KeyPair::generate();
        let id = Id::from_public_key_bytes(&kp.public_key_bytes());
        assert_eq!(id.public_key_bytes().unwrap(), kp.public_key_bytes());

        let bytes = Canonical::to_bytes(&id);
        let back = Id::from_bytes(&bytes).unwrap();
        assert_eq!(id, back);
    }
}
