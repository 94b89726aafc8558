//! Password hashing and the slow comparison primitive.
//!
//! Password hashes are stored as PHC strings produced by Argon2id:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
//! ```
//!
//! Verifying one is deliberately expensive. [`PasswordComparator`] is the
//! seam the verification cache memoizes; [`Argon2Comparator`] is the
//! production implementation.
//!
//! # Example
//!
//! ```
//! use credgate_auth::password::{Argon2Comparator, PasswordComparator, hash_password};
//!
//! let hashed = hash_password("correct horse").unwrap();
//! assert!(hashed.hash.starts_with("$argon2id$"));
//!
//! let comparator = Argon2Comparator::new();
//! assert!(comparator.compare("correct horse", &hashed.hash).unwrap());
//! assert!(!comparator.compare("battery staple", &hashed.hash).unwrap());
//! ```

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::ComparisonError;

/// The expensive password check being memoized.
///
/// Implementations must be pure for a fixed input: the verification cache may
/// run the same comparison more than once under concurrent misses.
pub trait PasswordComparator: Send + Sync {
    /// Compares `plaintext` against `stored_hash`.
    ///
    /// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonError`] when the stored hash is malformed or the
    /// primitive fails.
    fn compare(&self, plaintext: &str, stored_hash: &str) -> Result<bool, ComparisonError>;
}

impl<F> PasswordComparator for F
where
    F: Fn(&str, &str) -> Result<bool, ComparisonError> + Send + Sync,
{
    fn compare(&self, plaintext: &str, stored_hash: &str) -> Result<bool, ComparisonError> {
        self(plaintext, stored_hash)
    }
}

/// Argon2 verification of PHC hash strings.
///
/// Algorithm variant, version and cost parameters are read from the stored
/// hash, so hashes created with different parameters verify side by side.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Comparator;

impl Argon2Comparator {
    /// Creates a new comparator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PasswordComparator for Argon2Comparator {
    fn compare(&self, plaintext: &str, stored_hash: &str) -> Result<bool, ComparisonError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| ComparisonError::malformed_hash(e.to_string()))?;

        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ComparisonError::hashing(e.to_string())),
        }
    }
}

/// A freshly computed password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    /// PHC string to store as the password hash.
    pub hash: String,
    /// B64-encoded salt embedded in `hash`.
    pub salt: String,
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedPassword")
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

/// Hash a password for storage using Argon2id with default parameters.
///
/// # Errors
///
/// Returns [`ComparisonError::Hashing`] if hashing fails (rare).
pub fn hash_password(plaintext: &str) -> Result<HashedPassword, ComparisonError> {
    hash_with(&Argon2::default(), plaintext)
}

/// Hash a password using Argon2id with explicit cost parameters.
///
/// # Errors
///
/// Returns [`ComparisonError::Hashing`] if hashing fails.
pub fn hash_password_with_params(
    plaintext: &str,
    params: Params,
) -> Result<HashedPassword, ComparisonError> {
    hash_with(
        &Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        plaintext,
    )
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<HashedPassword, ComparisonError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| ComparisonError::hashing(e.to_string()))?;

    Ok(HashedPassword {
        hash: hash.to_string(),
        salt: salt.as_str().to_string(),
    })
}

#[cfg(test)]
pub(crate) fn cheap_params() -> Params {
    Params::new(256, 1, 1, None).expect("valid argon2 params")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id() {
        let hashed = hash_password_with_params("pw", cheap_params()).unwrap();
        assert!(hashed.hash.starts_with("$argon2id$"));
        assert!(hashed.hash.contains(&hashed.salt));
    }

    #[test]
    fn test_verify_correct_and_wrong_password() {
        let hashed = hash_password_with_params("correct-pw", cheap_params()).unwrap();
        let comparator = Argon2Comparator::new();

        assert!(comparator.compare("correct-pw", &hashed.hash).unwrap());
        assert!(!comparator.compare("wrong-pw", &hashed.hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = hash_password_with_params("pw", cheap_params()).unwrap();
        let second = hash_password_with_params("pw", cheap_params()).unwrap();
        assert_ne!(first.hash, second.hash);
        assert_ne!(first.salt, second.salt);

        let comparator = Argon2Comparator::new();
        assert!(comparator.compare("pw", &first.hash).unwrap());
        assert!(comparator.compare("pw", &second.hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let err = Argon2Comparator::new()
            .compare("pw", "not-a-phc-string")
            .unwrap_err();
        assert!(matches!(err, ComparisonError::MalformedHash { .. }));
    }

    #[test]
    fn test_closure_comparator() {
        let comparator =
            |plaintext: &str, hash: &str| Ok::<bool, ComparisonError>(plaintext == hash);
        assert!(comparator.compare("a", "a").unwrap());
        assert!(!comparator.compare("a", "b").unwrap());
    }

    #[test]
    fn test_debug_hides_hash() {
        let hashed = hash_password_with_params("pw", cheap_params()).unwrap();
        let debug = format!("{hashed:?}");
        assert!(!debug.contains(&hashed.hash));
    }
}
