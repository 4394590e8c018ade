//! `tally-core` — domain foundation for the ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the user and transaction records, and the snapshot
//! aggregate that persistence treats as a single unit.

pub mod error;
pub mod id;
pub mod snapshot;
pub mod transaction;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::{TransactionId, UserId};
pub use snapshot::LedgerSnapshot;
pub use transaction::{Transaction, TransactionKind};
pub use user::User;
