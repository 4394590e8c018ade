//! The ledger snapshot: root aggregate and unit of persistence.

use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::transaction::Transaction;
use crate::user::User;

/// Complete in-memory state of the ledger: every user and every transaction.
///
/// Loaded fresh from storage per operation and written back whole. Order of
/// `transactions` is record (insertion) order, which settlement policy
/// depends on; it is not necessarily sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(rename = "Users", alias = "users", default)]
    pub users: Vec<User>,
    #[serde(rename = "Transactions", alias = "transactions", default)]
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    /// Look up a user by name, case-insensitively.
    pub fn user_named(&self, name: &str) -> Option<&User> {
        let wanted = name.to_lowercase();
        self.users.iter().find(|u| u.name.to_lowercase() == wanted)
    }

    /// All transactions owned by `user_id`, in record order.
    pub fn transactions_for(&self, user_id: UserId) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |t| t.user_id == user_id)
    }

    /// True if the user carries any unsettled debt.
    pub fn has_open_debt(&self, user_id: UserId) -> bool {
        self.transactions_for(user_id).any(Transaction::is_open_debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_round_trips() {
        let snapshot = LedgerSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn user_lookup_ignores_case() {
        let snapshot = LedgerSnapshot {
            users: vec![User::new("Ana", "ana@example.com", "token")],
            transactions: vec![],
        };
        assert!(snapshot.user_named("ANA").is_some());
        assert!(snapshot.user_named("bob").is_none());
    }

    #[test]
    fn tolerates_missing_collections() {
        let snapshot: LedgerSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.users.is_empty());
        assert!(snapshot.transactions.is_empty());
    }
}
