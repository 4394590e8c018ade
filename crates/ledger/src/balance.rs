//! Balance arithmetic over a snapshot.
//!
//! Pure filtered sums; no I/O. Amounts are non-negative, so the sign of a
//! transaction's contribution comes from its kind, never from the amount.

use rust_decimal::Decimal;

use tally_core::{LedgerSnapshot, Transaction, TransactionKind, UserId};

fn sum_where(
    snapshot: &LedgerSnapshot,
    user_id: UserId,
    pred: impl Fn(&Transaction) -> bool,
) -> Decimal {
    snapshot
        .transactions_for(user_id)
        .filter(|t| pred(t))
        .map(|t| t.amount)
        .sum()
}

/// Sum of all Credit entries.
pub fn total_inflow(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    sum_where(snapshot, user_id, |t| t.kind == TransactionKind::Credit)
}

/// Sum of all Debit entries.
pub fn total_outflow(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    sum_where(snapshot, user_id, |t| t.kind == TransactionKind::Debit)
}

/// Sum of all Debt entries, settled or not.
pub fn total_debt(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    sum_where(snapshot, user_id, |t| t.kind == TransactionKind::Debt)
}

/// Sum of unsettled Debt entries.
pub fn remaining_debt(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    sum_where(snapshot, user_id, Transaction::is_open_debt)
}

/// Spendable cash: cleared inflow minus cleared outflow. Debts are excluded;
/// this is not a net-worth figure.
pub fn available_balance(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    let inflow = sum_where(snapshot, user_id, |t| {
        t.kind == TransactionKind::Credit && t.is_cleared
    });
    let outflow = sum_where(snapshot, user_id, |t| {
        t.kind == TransactionKind::Debit && t.is_cleared
    });
    inflow - outflow
}

/// Solvency figure: inflow minus outflow minus outstanding (uncleared) debt.
pub fn net_balance(snapshot: &LedgerSnapshot, user_id: UserId) -> Decimal {
    total_inflow(snapshot, user_id)
        - (total_outflow(snapshot, user_id) + remaining_debt(snapshot, user_id))
}

/// Top `count` transactions by amount, descending when `highest`, ascending
/// otherwise. The sort is stable, so ties keep their record order.
pub fn top_transactions(
    snapshot: &LedgerSnapshot,
    user_id: UserId,
    highest: bool,
    count: usize,
) -> Vec<Transaction> {
    let mut txns: Vec<Transaction> = snapshot.transactions_for(user_id).cloned().collect();
    if highest {
        txns.sort_by(|a, b| b.amount.cmp(&a.amount));
    } else {
        txns.sort_by(|a, b| a.amount.cmp(&b.amount));
    }
    txns.truncate(count);
    txns
}
