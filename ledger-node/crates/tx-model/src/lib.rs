//! Typed edges, observation edges, signature batches, and transaction edges:
//! the unit of signed, hashable data that flows from gossip into checkpoint
//! blocks.

mod edge;
mod id;
mod observation;
mod signature;
mod typed_edge_hash;

pub use edge::{create_transaction_edge, Edge, LastTransactionRef, TransactionEdgeData};
pub use id::Id;
pub use observation::ObservationEdge;
pub use signature::{HashSignature, SignatureBatch, SignedObservationEdge};
pub use typed_edge_hash::{HashType, TypedEdgeHash};
