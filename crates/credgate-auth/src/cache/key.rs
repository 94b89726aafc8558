//! Cache keys for memoized verification outcomes.
//!
//! A key is the subject id plus a fingerprint of the exact plaintext, so a
//! cached `true` only ever answers for the credential that produced it.

use std::hash::{BuildHasher, RandomState};

/// Key of one memoized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    subject_id: Box<str>,
    fingerprint: u64,
}

/// Fast keyed digest of plaintext credentials.
///
/// Uses SipHash with keys drawn randomly when the fingerprinter is created.
/// Fingerprints are stable for its lifetime and meaningless outside it.
/// They index the cache and never stand in for the slow comparison.
#[derive(Clone, Default)]
pub struct Fingerprinter {
    state: RandomState,
}

impl Fingerprinter {
    /// Creates a fingerprinter with fresh random keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint of a plaintext credential.
    #[inline]
    #[must_use]
    pub fn fingerprint(&self, credential: &str) -> u64 {
        self.state.hash_one(credential)
    }

    /// Derives the cache key for a (subject, credential) pair.
    #[must_use]
    pub fn key(&self, subject_id: &str, credential: &str) -> CacheKey {
        CacheKey {
            subject_id: subject_id.into(),
            fingerprint: self.fingerprint(credential),
        }
    }
}

impl std::fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprinter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let fp = Fingerprinter::new();
        assert_eq!(fp.key("u1", "secret"), fp.key("u1", "secret"));
    }

    #[test]
    fn test_key_depends_on_credential() {
        let fp = Fingerprinter::new();
        assert_ne!(fp.key("u1", "secret"), fp.key("u1", "Secret"));
        assert_ne!(fp.key("u1", "secret"), fp.key("u1", "secret "));
    }

    #[test]
    fn test_key_depends_on_subject() {
        let fp = Fingerprinter::new();
        assert_ne!(fp.key("u1", "secret"), fp.key("u2", "secret"));
    }

    #[test]
    fn test_fingerprints_are_keyed_per_instance() {
        // Two instances disagree on practically every input.
        let first = Fingerprinter::new();
        let second = Fingerprinter::new();
        let differing = ["a", "b", "c", "d"]
            .iter()
            .filter(|pw| first.fingerprint(pw) != second.fingerprint(pw))
            .count();
        assert!(differing > 0);
    }
}
