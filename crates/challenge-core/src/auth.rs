//! # Password Policies
//!
//! How user passwords are stored and checked at login.
//!
//! The repository never compares passwords itself; it hands the stored
//! value and the supplied password to a [`PasswordPolicy`]. Switching from
//! plaintext to hashed storage is a constructor change, not an API change.
//!
//! ```text
//! create_user ──► policy.protect(plain) ──► users.password
//! verify_login ─► policy.verify(plain, users.password) ──► bool
//!              └─► policy.verify_unknown_user(plain)     (no such nickname)
//! ```
//!
//! A login for an unknown nickname still pays for one verification, so
//! response time does not reveal which nicknames exist.

use std::fmt::Debug;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{CoreError, CoreResult};

/// Storage and verification strategy for user passwords.
pub trait PasswordPolicy: Send + Sync + Debug {
    /// Returns the value to persist for `plain`.
    fn protect(&self, plain: &str) -> CoreResult<String>;

    /// Checks a supplied password against the persisted value.
    fn verify(&self, plain: &str, stored: &str) -> bool;

    /// A stored value that costs as much to verify against as a real one.
    fn dummy_stored(&self) -> &str;

    /// Verifies `plain` against [`dummy_stored`](Self::dummy_stored) and
    /// discards the outcome.
    fn verify_unknown_user(&self, plain: &str) {
        let _ = self.verify(plain, self.dummy_stored());
    }
}

/// Stores passwords as given and compares them for equality.
///
/// Matches how existing user rows were written. Prefer [`Argon2Policy`]
/// for new deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextPolicy;

impl PasswordPolicy for PlaintextPolicy {
    fn protect(&self, plain: &str) -> CoreResult<String> {
        Ok(plain.to_string())
    }

    fn verify(&self, plain: &str, stored: &str) -> bool {
        plain == stored
    }

    fn dummy_stored(&self) -> &str {
        "\0"
    }
}

/// Salted Argon2id hashes in PHC string format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Policy;

impl PasswordPolicy for Argon2Policy {
    fn protect(&self, plain: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, stored: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hashed once per process with the same parameters as real rows.
    fn dummy_stored(&self) -> &str {
        static DUMMY_HASH: OnceLock<String> = OnceLock::new();

        DUMMY_HASH.get_or_init(|| self.protect("unknown-user").unwrap_or_default())
    }
}
