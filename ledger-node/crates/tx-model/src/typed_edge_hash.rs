use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};

/// Semantic role of the hash carried by a [`TypedEdgeHash`], per (I6): the two
/// parents of a transaction edge are both `AddressHash`, its data is
/// `TransactionDataHash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashType {
    AddressHash,
    TransactionDataHash,
    TransactionHash,
}

impl HashType {
    fn to_u8(self) -> u8 {
        match self {
            HashType::AddressHash => 0,
            HashType::TransactionDataHash => 1,
            HashType::TransactionHash => 2,
        }
    }

    fn from_u8(v: u8) -> Result<Self, EncodingError> {
        match v {
            0 => Ok(HashType::AddressHash),
            1 => Ok(HashType::TransactionDataHash),
            2 => Ok(HashType::TransactionHash),
            other => Err(EncodingError::UnknownTag(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedEdgeHash {
    pub hash: String,
    pub hash_type: HashType,
    pub base_hash: Option<String>,
}

impl TypedEdgeHash {
    pub fn new(hash: impl Into<String>, hash_type: HashType) -> Self {
        Self {
            hash: hash.into(),
            hash_type,
            base_hash: None,
        }
    }

    pub fn with_base_hash(hash: impl Into<String>, hash_type: HashType, base_hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            hash_type,
            base_hash: Some(base_hash.into()),
        }
    }
}

impl Canonical for TypedEdgeHash {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::TYPED_EDGE_HASH);
        w.write_str(&self.hash);
        w.write_u8(self.hash_type.to_u8());
        w.write_option(self.base_hash.is_some(), |w| {
            w.write_str(self.base_hash.as_deref().unwrap_or_default());
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::TYPED_EDGE_HASH)?;
        let hash = r.read_str()?;
        let hash_type = HashType::from_u8(r.read_u8()?)?;
        let base_hash = r.read_option(|r| r.read_str())?;
        Ok(TypedEdgeHash {
            hash,
            hash_type,
            base_hash,
        })
    }
}
