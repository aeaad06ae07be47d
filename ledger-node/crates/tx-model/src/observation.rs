use canonical_enc::{tag, Canonical, EncodingError, Reader, Writer};

use crate::typed_edge_hash::TypedEdgeHash;

/// `(parents, data)`. Parent order is semantically significant: for a
/// transaction edge, source precedes destination, so this is a `Vec`, never
/// a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationEdge {
    pub parents: Vec<TypedEdgeHash>,
    pub data: TypedEdgeHash,
}

impl ObservationEdge {
    pub fn new(parents: Vec<TypedEdgeHash>, data: TypedEdgeHash) -> Self {
        Self { parents, data }
    }
}

impl Canonical for ObservationEdge {
    fn encode(&self, w: &mut Writer) {
        w.write_tag(tag::OBSERVATION_EDGE);
        w.write_seq(&self.parents, |w, p| p.encode(w));
        self.data.encode(w);
    }

    fn decode(r: &mut Reader) -> Result<Self, EncodingError> {
        r.expect_tag(tag::OBSERVATION_EDGE)?;
        let parents = r.read_seq(TypedEdgeHash::decode)?;
        let data = TypedEdgeHash::decode(r)?;
        Ok(ObservationEdge { parents, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_edge_hash::HashType;

    #[test]
    fn parent_order_survives_round_trip() {
        let oe = ObservationEdge::new(
            vec![
                TypedEdgeHash::new("src", HashType::AddressHash),
                TypedEdgeHash::new("dst", HashType::AddressHash),
            ],
            TypedEdgeHash::new("data", HashType::TransactionDataHash),
        );
        let back = ObservationEdge::from_bytes(&oe.to_bytes()).unwrap();
        assert_eq!(oe, back);
        assert_eq!(back.parents[0].hash, "src");
        assert_eq!(back.parents[1].hash, "dst");
    }
}
