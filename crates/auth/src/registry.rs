//! Account registration and login verification.

use std::sync::Arc;

use tracing::{debug, info};

use tally_core::user::MAX_NAME_LEN;
use tally_core::{DomainError, User};
use tally_store::{JsonLedgerStore, StoreError};

use crate::password;

/// Outcome of a registration attempt. Duplicate names are a policy result,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(User),
    DuplicateName,
}

/// Registry failure: invalid input or a failed persist.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Manages user identity records on top of the snapshot store.
#[derive(Debug)]
pub struct AccountRegistry {
    store: Arc<JsonLedgerStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<JsonLedgerStore>) -> Self {
        Self { store }
    }

    /// Register a new user.
    ///
    /// Names are unique case-insensitively; the check and the append run
    /// under the store guard so two racing registrations cannot both claim
    /// the same name.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, RegistryError> {
        if name.is_empty() {
            return Err(DomainError::validation("user name must not be empty").into());
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(
                DomainError::validation(format!("user name exceeds {MAX_NAME_LEN} characters"))
                    .into(),
            );
        }

        let _guard = self.store.guard();
        let mut snapshot = self.store.load();

        if snapshot.user_named(name).is_some() {
            debug!(user = %name, "registration rejected: name already taken");
            return Ok(RegisterOutcome::DuplicateName);
        }

        let user = User::new(name, email, password::hash(password));
        snapshot.users.push(user.clone());
        self.store.save(&snapshot)?;

        info!(user = %name, id = %user.id, "registered user");
        Ok(RegisterOutcome::Registered(user))
    }

    /// Verify a login: find the user by name (case-insensitive) and check
    /// the password against the stored token. `None` on unknown user or
    /// mismatch, indistinguishably.
    pub fn authenticate(&self, name: &str, password: &str) -> Option<User> {
        let snapshot = self.store.load();
        let user = snapshot.user_named(name)?;
        password::verify(password, &user.password_hash).then(|| user.clone())
    }
}
