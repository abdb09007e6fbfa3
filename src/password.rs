//! Password hashing.
//!
//! `PasswordHash` holds a salted and hashed password, and `PasswordEncoder`
//! is the seam the user use cases hash and verify passwords through.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a plain text password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// A value of at least 12 is recommended. Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(raw_password: &str, cost: u32) -> Result<Self, Error> {
        match hash(raw_password, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hashes passwords and checks plain text passwords against stored hashes.
pub trait PasswordEncoder {
    /// Hash `raw_password`.
    fn encode(&self, raw_password: &str) -> Result<PasswordHash, Error>;

    /// Whether `raw_password` hashes to `encoded_password`.
    fn matches(&self, raw_password: &str, encoded_password: &str) -> Result<bool, Error>;
}

/// A [PasswordEncoder] backed by bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordEncoder {
    cost: u32,
}

impl BcryptPasswordEncoder {
    /// Create an encoder that hashes with the bcrypt `cost`.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordEncoder {
    fn default() -> Self {
        Self::new(PasswordHash::DEFAULT_COST)
    }
}

impl PasswordEncoder for BcryptPasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<PasswordHash, Error> {
        PasswordHash::new(raw_password, self.cost)
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> Result<bool, Error> {
        PasswordHash::new_unchecked(encoded_password).verify(raw_password)
    }
}

#[cfg(test)]
mod password_hash_tests {
    use super::{BcryptPasswordEncoder, PasswordEncoder, PasswordHash};

    #[test]
    fn verify_password_succeeds_for_valid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "okon";

        assert!(hash.verify(password).unwrap());
    }

    #[test]
    fn verify_password_fails_for_invalid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "thewrongpassword";

        assert!(!hash.verify(password).unwrap());
    }

    #[test]
    fn encoder_produces_verifiable_hash() {
        let encoder = BcryptPasswordEncoder::new(4);
        let password = "Roosters1!";

        let hash = encoder.encode(password).unwrap();

        assert!(encoder.matches(password, &hash.to_string()).unwrap());
        assert!(!encoder.matches("Turkeys1!", &hash.to_string()).unwrap());
    }

    #[test]
    fn hash_duplicate_password_produces_unique_hash() {
        let encoder = BcryptPasswordEncoder::new(4);

        let hash = encoder.encode("Turkeys1!").unwrap();
        let dupe_hash = encoder.encode("Turkeys1!").unwrap();

        assert_ne!(hash, dupe_hash);
    }

    #[test]
    fn matches_fails_on_malformed_hash() {
        let encoder = BcryptPasswordEncoder::new(4);

        assert!(encoder.matches("Turkeys1!", "not a bcrypt hash").is_err());
    }
}
