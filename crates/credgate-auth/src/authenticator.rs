//! Password authentication.
//!
//! [`Authenticator`] looks a subject up, delegates the password check to the
//! shared [`VerificationCache`], then applies account-status policy:
//!
//! ```text
//! lookup ──absent──────────────▶ Rejected(unknown credentials)
//!   │  └──store failure────────▶ Error
//!   ▼
//! verify ──false───────────────▶ Rejected(unknown credentials)
//!   │  └──primitive failure────▶ Error
//!   ▼
//! active? ──no─────────────────▶ Rejected(inactive)
//!   │
//!   ▼
//! Success(subject)
//! ```
//!
//! Nothing is retried. Unknown users and wrong passwords share one rejection
//! reason so callers cannot tell them apart.

use std::fmt;
use std::sync::Arc;

use crate::AuthResult;
use crate::cache::VerificationCache;
use crate::storage::{User, UserStorage};

/// Message shown to end users for any rejection.
pub const PUBLIC_REJECTION_MESSAGE: &str = "authentication failed";

/// Folds a username into the form user stores index by.
///
/// Surrounding whitespace is trimmed and the result is lowercased.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Why an authentication attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No such subject, no usable password, or the password did not match.
    UnknownCredentials,
    /// The password matched but the account is inactive.
    Inactive,
}

impl RejectReason {
    /// Returns the reason as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownCredentials => "unknown credentials",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-error result of an authentication attempt.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Credentials are valid and the account is active.
    Success(User),
    /// The attempt was refused.
    Rejected(RejectReason),
}

impl AuthOutcome {
    /// Returns `true` for [`AuthOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The authenticated subject, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Success(user) => Some(user),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Success(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }

    /// Message safe to show to end users.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Success(_) => "authenticated",
            Self::Rejected(_) => PUBLIC_REJECTION_MESSAGE,
        }
    }
}

/// Authenticates subjects by password.
///
/// Cheap to clone; clones share the store and the verification cache.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStorage>,
    cache: Arc<VerificationCache>,
}

impl Authenticator {
    /// Creates an authenticator over a user store and a shared cache.
    pub fn new(users: Arc<dyn UserStorage>, cache: Arc<VerificationCache>) -> Self {
        Self { users, cache }
    }

    /// The verification cache this authenticator consults.
    #[must_use]
    pub fn cache(&self) -> &Arc<VerificationCache> {
        &self.cache
    }

    /// Authenticates `username` with `password`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`](crate::AuthError) if the user store or the
    /// password primitive fails. Rejections are `Ok`.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<AuthOutcome> {
        let username = normalize_username(username);

        let user = self
            .users
            .find_by_username(&username)
            .await
            .inspect_err(|e| {
                tracing::error!(username = %username, stage = e.stage(), error = %e, "Authentication failed");
            })?;

        let Some(user) = user else {
            tracing::warn!(
                username = %username,
                reason = RejectReason::UnknownCredentials.as_str(),
                "Authentication rejected"
            );
            return Ok(AuthOutcome::Rejected(RejectReason::UnknownCredentials));
        };

        self.check_password(user, password).await
    }

    /// Re-checks the password of an already identified subject.
    ///
    /// Runs the same policy as [`authenticate`](Self::authenticate), looking
    /// the subject up by its stable id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`](crate::AuthError) if the user store or the
    /// password primitive fails.
    pub async fn reauthenticate(&self, user_id: &str, password: &str) -> AuthResult<AuthOutcome> {
        let user = self.users.find_by_id(user_id).await.inspect_err(|e| {
            tracing::error!(user_id = %user_id, stage = e.stage(), error = %e, "Reauthentication failed");
        })?;

        match user {
            Some(user) => self.check_password(user, password).await,
            None => {
                tracing::warn!(
                    user_id = %user_id,
                    reason = RejectReason::UnknownCredentials.as_str(),
                    "Reauthentication rejected"
                );
                Ok(AuthOutcome::Rejected(RejectReason::UnknownCredentials))
            }
        }
    }

    async fn check_password(&self, user: User, password: &str) -> AuthResult<AuthOutcome> {
        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Ok(reject(&user, RejectReason::UnknownCredentials));
        };

        let matched = match self.cache.verify(&user.id, password, stored_hash).await {
            Ok(matched) => matched,
            Err(e) => {
                let err = crate::AuthError::from(e);
                tracing::error!(
                    user_id = %user.id,
                    stage = err.stage(),
                    category = %err.category(),
                    error = %err,
                    "Authentication failed"
                );
                return Err(err);
            }
        };

        if !matched {
            return Ok(reject(&user, RejectReason::UnknownCredentials));
        }

        if !user.is_active() {
            return Ok(reject(&user, RejectReason::Inactive));
        }

        tracing::info!(user_id = %user.id, username = %user.username, "Authentication succeeded");
        Ok(AuthOutcome::Success(user))
    }
}

fn reject(user: &User, reason: RejectReason) -> AuthOutcome {
    tracing::warn!(
        user_id = %user.id,
        username = %user.username,
        reason = reason.as_str(),
        "Authentication rejected"
    );
    AuthOutcome::Rejected(reason)
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerificationCacheConfig;
    use crate::error::{AuthError, ComparisonError};
    use crate::password::PasswordComparator;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Matches `"hash:<pw>"` against `<pw>` and counts invocations.
    #[derive(Default)]
    struct PrefixComparator {
        calls: AtomicUsize,
    }

    impl PasswordComparator for PrefixComparator {
        fn compare(&self, plaintext: &str, stored_hash: &str) -> Result<bool, ComparisonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            stored_hash
                .strip_prefix("hash:")
                .map(|expected| expected == plaintext)
                .ok_or_else(|| ComparisonError::malformed_hash("missing prefix"))
        }
    }

    #[derive(Default)]
    struct MockStorage {
        users: Mutex<HashMap<String, User>>,
        fail: AtomicBool,
    }

    impl MockStorage {
        fn with_user(user: User) -> Self {
            let storage = Self::default();
            storage.put(user);
            storage
        }

        fn put(&self, user: User) {
            self.users.lock().unwrap().insert(user.id.clone(), user);
        }

        fn set_active(&self, id: &str, active: bool) {
            if let Some(user) = self.users.lock().unwrap().get_mut(id) {
                user.active = active;
            }
        }
    }

    #[async_trait]
    impl UserStorage for MockStorage {
        async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::storage("connection refused"));
            }
            Ok(self.users.lock().unwrap().get(user_id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::storage("connection refused"));
            }
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| normalize_username(&u.username) == username)
                .cloned())
        }
    }

    fn alice() -> User {
        User::builder("alice")
            .id("u1")
            .password_hash("hash:correct-pw")
            .build()
    }

    fn setup(storage: MockStorage) -> (Authenticator, Arc<MockStorage>, Arc<PrefixComparator>) {
        let storage = Arc::new(storage);
        let comparator = Arc::new(PrefixComparator::default());
        let config = VerificationCacheConfig {
            offload: false,
            ..VerificationCacheConfig::default()
        };
        let cache = VerificationCache::new(comparator.clone(), &config).unwrap();
        (
            Authenticator::new(storage.clone(), cache),
            storage,
            comparator,
        )
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Alice "), "alice");
        assert_eq!(normalize_username("ÉMILE"), "émile");
        assert_eq!(normalize_username("bob"), "bob");
    }

    #[test]
    fn test_reject_reason_strings() {
        assert_eq!(RejectReason::UnknownCredentials.as_str(), "unknown credentials");
        assert_eq!(RejectReason::Inactive.to_string(), "inactive");
        let outcome = AuthOutcome::Rejected(RejectReason::Inactive);
        assert_eq!(outcome.public_message(), PUBLIC_REJECTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_success() {
        let (auth, _, _) = setup(MockStorage::with_user(alice()));

        let outcome = auth.authenticate("alice", "correct-pw").await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.user().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_username_is_normalized() {
        let (auth, _, _) = setup(MockStorage::with_user(alice()));

        let outcome = auth.authenticate("  ALICE ", "correct-pw").await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let (auth, _, comparator) = setup(MockStorage::with_user(alice()));

        let unknown = auth.authenticate("mallory", "correct-pw").await.unwrap();
        let wrong = auth.authenticate("alice", "wrong-pw").await.unwrap();

        assert_eq!(unknown.reject_reason(), Some(RejectReason::UnknownCredentials));
        assert_eq!(wrong.reject_reason(), Some(RejectReason::UnknownCredentials));
        // Unknown subjects never reach the primitive
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_success_hits_cache() {
        let (auth, _, comparator) = setup(MockStorage::with_user(alice()));

        for _ in 0..5 {
            let outcome = auth.authenticate("alice", "correct-pw").await.unwrap();
            assert!(outcome.is_success());
        }
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth.cache().stats().hits, 4);
    }

    #[tokio::test]
    async fn test_inactive_after_successful_verification() {
        let (auth, storage, comparator) = setup(MockStorage::with_user(alice()));

        assert!(auth.authenticate("alice", "correct-pw").await.unwrap().is_success());
        storage.set_active("u1", false);

        let outcome = auth.authenticate("alice", "correct-pw").await.unwrap();
        assert_eq!(outcome.reject_reason(), Some(RejectReason::Inactive));
        assert_eq!(auth.cache().get("u1", "correct-pw"), Some(true));
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inactive_with_wrong_password_is_unknown_credentials() {
        let user = User::builder("alice")
            .id("u1")
            .password_hash("hash:correct-pw")
            .active(false)
            .build();
        let (auth, _, _) = setup(MockStorage::with_user(user));

        let outcome = auth.authenticate("alice", "wrong-pw").await.unwrap();
        assert_eq!(outcome.reject_reason(), Some(RejectReason::UnknownCredentials));
    }

    #[tokio::test]
    async fn test_user_without_password_is_rejected() {
        let user = User::builder("svc").id("u9").build();
        let (auth, _, comparator) = setup(MockStorage::with_user(user));

        let outcome = auth.authenticate("svc", "anything").await.unwrap();
        assert_eq!(outcome.reject_reason(), Some(RejectReason::UnknownCredentials));
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_error() {
        let storage = MockStorage::with_user(alice());
        storage.fail.store(true, Ordering::SeqCst);
        let (auth, _, comparator) = setup(storage);

        let err = auth.authenticate("alice", "correct-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage { .. }));
        assert_eq!(err.stage(), "lookup");
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primitive_failure_is_error_and_not_retried() {
        let user = User::builder("alice")
            .id("u1")
            .password_hash("corrupted")
            .build();
        let (auth, _, comparator) = setup(MockStorage::with_user(user));

        let err = auth.authenticate("alice", "correct-pw").await.unwrap_err();
        assert_eq!(err.stage(), "verify");
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 1);

        // Not cached: the next attempt invokes the primitive again
        assert!(auth.authenticate("alice", "correct-pw").await.is_err());
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reauthenticate_by_id() {
        let (auth, _, comparator) = setup(MockStorage::with_user(alice()));

        assert!(auth.reauthenticate("u1", "correct-pw").await.unwrap().is_success());
        assert_eq!(
            auth.reauthenticate("u1", "wrong-pw").await.unwrap().reject_reason(),
            Some(RejectReason::UnknownCredentials)
        );
        assert_eq!(
            auth.reauthenticate("nope", "correct-pw").await.unwrap().reject_reason(),
            Some(RejectReason::UnknownCredentials)
        );

        // Shares cache entries with username authentication
        assert!(auth.authenticate("alice", "correct-pw").await.unwrap().is_success());
        assert_eq!(comparator.calls.load(Ordering::SeqCst), 2);
    }
}
