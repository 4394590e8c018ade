//! `tally-store` — snapshot persistence for the ledger.
//!
//! The whole [`LedgerSnapshot`] is the unit of storage: one JSON document,
//! loaded fresh per operation and written back whole. The store also owns
//! the mutex that serializes load-mutate-save cycles process-wide.

mod json;

pub use json::{JsonLedgerStore, StoreError};
