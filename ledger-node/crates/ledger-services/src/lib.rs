//! Applies snapshot-included effects (C10): address balance transfers,
//! last-transaction-reference bookkeeping, and pending-observation removal.

mod address;
mod errors;
mod observation;
mod transaction;

pub use address::{AddressBalance, AddressService};
pub use errors::LedgerServiceError;
pub use observation::ObservationService;
pub use transaction::TransactionService;
