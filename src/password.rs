//! Password validation and hashing for user accounts.
//!
//! Passwords are checked for guessability with `zxcvbn` before being
//! hashed with `bcrypt`. Only the hash is ever stored.

use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// A password that has been validated against a strength checker.
///
/// Possession of this type means the inner string is acceptable to store
/// (after hashing), not that it belongs to any particular user.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// The minimum `zxcvbn` score for a password to be accepted.
    const MINIMUM_SCORE: Score = Score::Three;

    /// Validate `password` against the strength checker.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] with a human readable hint if the password
    /// is too easy to guess.
    pub fn new(password: &str) -> Result<Self, Error> {
        let entropy = zxcvbn(password, &[]);

        if entropy.score() < Self::MINIMUM_SCORE {
            let hint = entropy
                .feedback()
                .and_then(|feedback| feedback.warning())
                .map(|warning| warning.to_string())
                .unwrap_or_else(|| "Try a longer password with more variety.".to_owned());

            return Err(Error::TooWeak(hint));
        }

        Ok(Self(password.to_owned()))
    }

    /// Create a validated password without checking its strength.
    ///
    /// This should only be used for passwords that have already been
    /// validated, e.g. in tests.
    pub fn new_unchecked(password: &str) -> Self {
        Self(password.to_owned())
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The default bcrypt cost factor.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the underlying hashing library fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash string that came from the database.
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_owned())
    }

    /// Check whether `password` matches this hash.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the hash string is malformed.
    pub fn verify(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
