//! Ledger transactions.
//!
//! The ledger is append-only: a transaction is never deleted, and the only
//! mutation the core ever performs is flipping `is_cleared` from false to
//! true when a debt is settled.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::{TransactionId, UserId};

/// Kind of a ledger transaction (determines the sign of its contribution
/// to balances; amounts themselves are always non-negative).
///
/// Serialized as the literal variant name; lowercase spellings are accepted
/// on read to tolerate hand-edited store files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(alias = "credit")]
    Credit,
    #[serde(alias = "debit")]
    Debit,
    #[serde(alias = "debt")]
    Debt,
}

/// A single ledger entry.
///
/// Wire field names follow the persisted-store contract; `Notes` and
/// `DueDate` are omitted when absent rather than written as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "TransactionId", alias = "transactionid")]
    pub id: TransactionId,
    #[serde(rename = "Amount", alias = "amount")]
    pub amount: Decimal,
    #[serde(rename = "Label", alias = "label")]
    pub label: String,
    #[serde(
        rename = "Notes",
        alias = "notes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(rename = "TransactionType", alias = "transactiontype")]
    pub kind: TransactionKind,
    #[serde(rename = "TransactionDateTime", alias = "transactiondatetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "UserId", alias = "userid")]
    pub user_id: UserId,
    #[serde(rename = "UserName", alias = "username")]
    pub user_name: String,
    /// Repayment deadline; only meaningful for `Debt` entries.
    #[serde(
        rename = "DueDate",
        alias = "duedate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Whether the obligation is settled. Credits and ordinary debits are
    /// born cleared; debts stay uncleared until settled.
    #[serde(rename = "IsCleared", alias = "iscleared", default = "cleared")]
    pub is_cleared: bool,
}

fn cleared() -> bool {
    true
}

impl Transaction {
    /// A cleared entry of the given kind, timestamped now.
    pub fn cleared(
        kind: TransactionKind,
        user_id: UserId,
        user_name: impl Into<String>,
        label: impl Into<String>,
        notes: Option<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            label: label.into(),
            notes,
            kind,
            timestamp: Utc::now(),
            user_id,
            user_name: user_name.into(),
            due_date: None,
            is_cleared: true,
        }
    }

    /// An uncleared debt due one month from now.
    pub fn debt(
        user_id: UserId,
        user_name: impl Into<String>,
        amount: Decimal,
        label: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            amount,
            label: label.into(),
            notes,
            kind: TransactionKind::Debt,
            timestamp: now,
            user_id,
            user_name: user_name.into(),
            due_date: now.checked_add_months(Months::new(1)).or(Some(now)),
            is_cleared: false,
        }
    }

    /// True for an unsettled debt entry.
    pub fn is_open_debt(&self) -> bool {
        self.kind == TransactionKind::Debt && !self.is_cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn wire_names_follow_store_contract() {
        let txn = Transaction::cleared(
            TransactionKind::Credit,
            UserId::new(),
            "ana",
            "salary",
            None,
            dec!(1200.50),
        );
        let value = serde_json::to_value(&txn).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("TransactionId"));
        assert!(obj.contains_key("TransactionDateTime"));
        assert_eq!(obj["TransactionType"], "Credit");
        assert_eq!(obj["IsCleared"], true);
        // Optional fields are omitted, not null.
        assert!(!obj.contains_key("Notes"));
        assert!(!obj.contains_key("DueDate"));
    }

    #[test]
    fn reads_lowercase_field_names() {
        let user_id = UserId::new();
        let json = format!(
            r#"{{
                "transactionid": "{}",
                "amount": "42.00",
                "label": "rent",
                "transactiontype": "debit",
                "transactiondatetime": "2026-01-05T10:00:00Z",
                "userid": "{}",
                "username": "ana"
            }}"#,
            TransactionId::new(),
            user_id
        );
        let txn: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn.kind, TransactionKind::Debit);
        assert_eq!(txn.amount, dec!(42.00));
        // Missing IsCleared defaults to cleared, matching the legacy files.
        assert!(txn.is_cleared);
        assert_eq!(txn.notes, None);
    }

    #[test]
    fn debts_are_born_uncleared_with_a_due_date() {
        let debt = Transaction::debt(UserId::new(), "ana", dec!(80), "loan", None);
        assert!(debt.is_open_debt());
        let due = debt.due_date.unwrap();
        assert!(due > debt.timestamp);
        // One month out, give or take month-length: 28..=31 days.
        let days = (due - debt.timestamp).num_days();
        assert!((28..=31).contains(&days), "due in {days} days");
    }
}
