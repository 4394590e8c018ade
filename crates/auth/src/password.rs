//! Salted password hashing.
//!
//! PBKDF2-HMAC-SHA256 over a random 16-byte salt, 10 000 iterations,
//! 20-byte derived key; the token is base64(salt ‖ key). These parameters
//! are part of the persisted format: stored hashes become unverifiable if
//! they change, so any new scheme needs a migration path.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 20;
const ITERATIONS: u32 = 10_000;

/// Hash a password into an encoded token.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut key);

    let mut token = [0u8; SALT_LEN + KEY_LEN];
    token[..SALT_LEN].copy_from_slice(&salt);
    token[SALT_LEN..].copy_from_slice(&key);
    STANDARD.encode(token)
}

/// Check a password against a stored token.
///
/// Any decode failure (bad base64, truncated token) counts as a mismatch;
/// this never returns an error.
pub fn verify(password: &str, token: &str) -> bool {
    let Ok(bytes) = STANDARD.decode(token) else {
        return false;
    };
    if bytes.len() != SALT_LEN + KEY_LEN {
        return false;
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &bytes[..SALT_LEN], ITERATIONS, &mut key);
    bytes[SALT_LEN..] == key
}
