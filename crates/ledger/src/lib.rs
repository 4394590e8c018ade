//! `tally-ledger` — the ledger engine.
//!
//! Records transactions, derives balances, and applies the debt-settlement
//! policy. Every operation loads a fresh snapshot from the store; mutations
//! run under the store guard and write the whole snapshot back.

pub mod balance;
pub mod engine;

pub use engine::{
    DEFAULT_TOP_COUNT, DebtCreation, LedgerEngine, LedgerError, Settlement, SettlementPolicy,
};
