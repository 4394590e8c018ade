//! The ledger engine: recording, aggregates, and debt settlement.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use tally_core::{DomainError, Transaction, TransactionId, TransactionKind, UserId};
use tally_store::{JsonLedgerStore, StoreError};

use crate::balance;

/// Default window for [`LedgerEngine::top_transactions`].
pub const DEFAULT_TOP_COUNT: usize = 5;

/// Whether settling a specific debt checks the available balance first.
///
/// Integrations that treat a settle request as authoritative can opt into
/// [`AlwaysClear`](Self::AlwaysClear); the balance-checked behavior is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlementPolicy {
    /// Refuse to settle a debt larger than the available balance.
    #[default]
    RequireFunds,
    /// Settle unconditionally once the debt is found.
    AlwaysClear,
}

/// Outcome of [`LedgerEngine::create_debt`].
#[derive(Debug, Clone, PartialEq)]
pub enum DebtCreation {
    Created(Transaction),
    /// The user already carries an open debt; at most one at a time.
    Blocked,
}

/// Outcome of [`LedgerEngine::settle_debt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Settled,
    /// No matching uncleared debt for this user.
    NotFound,
    /// Available balance is below the debt amount (RequireFunds only).
    InsufficientFunds,
}

/// Engine failure: invalid input or a failed persist. Policy refusals are
/// outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Records transactions and derives financial state over the snapshot store.
///
/// There is no long-lived in-memory ledger: each call loads the snapshot
/// fresh, and mutations hold the store guard across their whole
/// load-mutate-save cycle.
#[derive(Debug)]
pub struct LedgerEngine {
    store: Arc<JsonLedgerStore>,
    policy: SettlementPolicy,
}

impl LedgerEngine {
    /// Engine with the default (balance-checked) settlement policy.
    pub fn new(store: Arc<JsonLedgerStore>) -> Self {
        Self::with_policy(store, SettlementPolicy::default())
    }

    pub fn with_policy(store: Arc<JsonLedgerStore>, policy: SettlementPolicy) -> Self {
        Self { store, policy }
    }

    fn check_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount.is_sign_negative() {
            return Err(DomainError::validation("amount must not be negative").into());
        }
        Ok(())
    }

    fn append_cleared(
        &self,
        user_id: UserId,
        user_name: &str,
        label: &str,
        notes: Option<String>,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<Transaction, LedgerError> {
        Self::check_amount(amount)?;

        let _guard = self.store.guard();
        let mut snapshot = self.store.load();
        let txn = Transaction::cleared(kind, user_id, user_name, label, notes, amount);
        snapshot.transactions.push(txn.clone());
        self.store.save(&snapshot)?;

        debug!(user = %user_id, kind = ?kind, amount = %amount, "recorded transaction");
        Ok(txn)
    }

    /// Append a cleared transaction of the given kind.
    pub fn record_inflow(
        &self,
        user_id: UserId,
        user_name: &str,
        label: &str,
        notes: Option<String>,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<Transaction, LedgerError> {
        self.append_cleared(user_id, user_name, label, notes, amount, kind)
    }

    /// Append a cleared Debit: a routine expense is settled on creation.
    pub fn record_outflow(
        &self,
        user_id: UserId,
        user_name: &str,
        label: &str,
        notes: Option<String>,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.append_cleared(
            user_id,
            user_name,
            label,
            notes,
            amount,
            TransactionKind::Debit,
        )
    }

    /// Append an uncleared debt due one month out, unless the user already
    /// carries an open debt (at most one at a time).
    pub fn create_debt(
        &self,
        user_id: UserId,
        user_name: &str,
        amount: Decimal,
        label: &str,
        notes: Option<String>,
    ) -> Result<DebtCreation, LedgerError> {
        Self::check_amount(amount)?;

        let _guard = self.store.guard();
        let mut snapshot = self.store.load();

        if snapshot.has_open_debt(user_id) {
            debug!(user = %user_id, "debt refused: an open debt already exists");
            return Ok(DebtCreation::Blocked);
        }

        let txn = Transaction::debt(user_id, user_name, amount, label, notes);
        snapshot.transactions.push(txn.clone());
        self.store.save(&snapshot)?;

        info!(user = %user_id, amount = %amount, "created debt");
        Ok(DebtCreation::Created(txn))
    }

    /// Settle one specific debt.
    ///
    /// Finds the uncleared debt with this id for this user (`NotFound`
    /// otherwise, including when it is already settled), applies the
    /// settlement policy, and flips the cleared flag.
    pub fn settle_debt(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<Settlement, LedgerError> {
        let _guard = self.store.guard();
        let mut snapshot = self.store.load();

        let Some(index) = snapshot
            .transactions
            .iter()
            .position(|t| t.id == transaction_id && t.user_id == user_id && t.is_open_debt())
        else {
            debug!(user = %user_id, txn = %transaction_id, "debt not found or already cleared");
            return Ok(Settlement::NotFound);
        };

        if self.policy == SettlementPolicy::RequireFunds {
            let available = balance::available_balance(&snapshot, user_id);
            let owed = snapshot.transactions[index].amount;
            if available < owed {
                debug!(user = %user_id, %available, %owed, "settlement refused: insufficient funds");
                return Ok(Settlement::InsufficientFunds);
            }
        }

        snapshot.transactions[index].is_cleared = true;
        self.store.save(&snapshot)?;

        info!(user = %user_id, txn = %transaction_id, "settled debt");
        Ok(Settlement::Settled)
    }

    /// Greedily settle outstanding debts, first-recorded first.
    ///
    /// Seeds a running balance from the available balance, clears each open
    /// debt that fits, and decrements the running balance after each clear.
    /// Returns the ids of the debts cleared.
    pub fn auto_clear_debts(&self, user_id: UserId) -> Result<Vec<TransactionId>, LedgerError> {
        let _guard = self.store.guard();
        let mut snapshot = self.store.load();

        let mut remaining = balance::available_balance(&snapshot, user_id);
        let mut cleared = Vec::new();
        for txn in snapshot
            .transactions
            .iter_mut()
            .filter(|t| t.user_id == user_id && t.is_open_debt())
        {
            if txn.amount <= remaining {
                txn.is_cleared = true;
                remaining -= txn.amount;
                cleared.push(txn.id);
            }
        }

        if !cleared.is_empty() {
            self.store.save(&snapshot)?;
            info!(user = %user_id, count = cleared.len(), "auto-cleared debts");
        }
        Ok(cleared)
    }

    /// The user's Credit entries, in record order.
    pub fn inflows(&self, user_id: UserId) -> Vec<Transaction> {
        self.transactions_of_kind(user_id, TransactionKind::Credit)
    }

    /// The user's Debit entries, in record order.
    pub fn outflows(&self, user_id: UserId) -> Vec<Transaction> {
        self.transactions_of_kind(user_id, TransactionKind::Debit)
    }

    fn transactions_of_kind(&self, user_id: UserId, kind: TransactionKind) -> Vec<Transaction> {
        self.store
            .load()
            .transactions_for(user_id)
            .filter(|t| t.kind == kind)
            .cloned()
            .collect()
    }

    pub fn total_inflow(&self, user_id: UserId) -> Decimal {
        balance::total_inflow(&self.store.load(), user_id)
    }

    pub fn total_outflow(&self, user_id: UserId) -> Decimal {
        balance::total_outflow(&self.store.load(), user_id)
    }

    pub fn total_debt(&self, user_id: UserId) -> Decimal {
        balance::total_debt(&self.store.load(), user_id)
    }

    pub fn remaining_debt(&self, user_id: UserId) -> Decimal {
        balance::remaining_debt(&self.store.load(), user_id)
    }

    /// Spendable cash: cleared inflow minus cleared outflow.
    pub fn available_balance(&self, user_id: UserId) -> Decimal {
        balance::available_balance(&self.store.load(), user_id)
    }

    /// Solvency figure: inflow minus outflow and outstanding debt.
    pub fn net_balance(&self, user_id: UserId) -> Decimal {
        balance::net_balance(&self.store.load(), user_id)
    }

    /// Top `count` transactions by amount; stable ordering on ties.
    pub fn top_transactions(
        &self,
        user_id: UserId,
        highest: bool,
        count: usize,
    ) -> Vec<Transaction> {
        balance::top_transactions(&self.store.load(), user_id, highest, count)
    }
}
