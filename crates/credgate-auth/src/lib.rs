//! # credgate-auth
//!
//! Password authentication with memoized verification outcomes.
//!
//! This crate provides:
//! - A TTL cache of verification outcomes in front of a slow hash comparison
//! - An authenticator applying lookup, verification and account-status policy
//! - Argon2 PHC hashing and verification
//! - Storage traits for user records
//!
//! ## Modules
//!
//! - [`config`] - Verification cache configuration
//! - [`error`] - Error types
//! - [`password`] - The slow comparison primitive and hashing helpers
//! - [`cache`] - Verification outcome cache and its background sweep
//! - [`authenticator`] - The authentication state machine
//! - [`storage`] - Storage traits for user records
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use credgate_auth::prelude::*;
//!
//! let cache = VerificationCache::new(
//!     Arc::new(Argon2Comparator::new()),
//!     &VerificationCacheConfig::default(),
//! )?;
//! let auth = Authenticator::new(users, cache);
//!
//! match auth.authenticate("alice", "correct horse").await? {
//!     AuthOutcome::Success(user) => println!("welcome {}", user.username),
//!     AuthOutcome::Rejected(reason) => println!("rejected: {reason}"),
//! }
//! ```

pub mod authenticator;
pub mod cache;
pub mod config;
pub mod error;
pub mod password;
pub mod storage;

pub use authenticator::{AuthOutcome, Authenticator, RejectReason, normalize_username};
pub use cache::{VerificationCache, VerificationCacheStats};
pub use config::{AuthConfig, ConfigError, VerificationCacheConfig};
pub use error::{AuthError, ComparisonError, ErrorCategory};
pub use password::{Argon2Comparator, HashedPassword, PasswordComparator, hash_password};
pub use storage::{User, UserBuilder, UserStorage};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use credgate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::authenticator::{AuthOutcome, Authenticator, RejectReason, normalize_username};
    pub use crate::cache::{VerificationCache, VerificationCacheStats};
    pub use crate::config::{AuthConfig, ConfigError, VerificationCacheConfig};
    pub use crate::error::{AuthError, ComparisonError, ErrorCategory};
    pub use crate::password::{Argon2Comparator, PasswordComparator, hash_password};
    pub use crate::storage::{User, UserBuilder, UserStorage};
}
