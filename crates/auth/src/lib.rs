//! `tally-auth` — credential hashing and account registration.

pub mod password;
pub mod registry;

pub use registry::{AccountRegistry, RegisterOutcome, RegistryError};
