//! Caching of password verification outcomes.
//!
//! - [`VerificationCache`] - TTL memoization in front of the slow comparison
//! - [`Fingerprinter`] / [`CacheKey`] - keying by subject and plaintext digest

pub mod key;
pub mod verification;

pub use key::{CacheKey, Fingerprinter};
pub use verification::{VerificationCache, VerificationCacheStats};
