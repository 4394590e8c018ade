//! User identity records.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Maximum accepted user-name length, part of the registration contract.
pub const MAX_NAME_LEN: usize = 100;

/// A registered user.
///
/// Created once at registration and never mutated or deleted by the core.
/// `password_hash` is the encoded salt + derived key, never a plaintext
/// password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "UserId", alias = "userid")]
    pub id: UserId,
    #[serde(rename = "UserName", alias = "username")]
    pub name: String,
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
    #[serde(rename = "Password", alias = "password")]
    pub password_hash: String,
}

impl User {
    /// A new user with a freshly generated identifier.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_follow_store_contract() {
        let user = User::new("Ana", "ana@example.com", "token");
        let value = serde_json::to_value(&user).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("UserId"));
        assert_eq!(obj["UserName"], "Ana");
        assert_eq!(obj["Email"], "ana@example.com");
        assert_eq!(obj["Password"], "token");
    }
}
