//! User storage trait.
//!
//! Defines the lookup interface the authenticator needs from a user store.
//! Persistence, registration, and schema concerns live in the backends
//! (e.g. `credgate-db-memory`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::password::HashedPassword;

/// Default datetime value for deserialization when field is missing.
fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn default_active() -> bool {
    true
}

// =============================================================================
// User Type
// =============================================================================

/// A subject that can authenticate with a password.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique, stable identifier. Verification outcomes are cached under it.
    #[serde(default)]
    pub id: String,

    /// Username for authentication. Lookups are case-folded.
    pub username: String,

    /// Email address (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Salt embedded in `password_hash`, kept alongside for operators.
    #[serde(default, alias = "passwordSalt", skip_serializing_if = "Option::is_none")]
    pub password_salt: Option<String>,

    /// PHC-formatted password hash (None for password-less subjects).
    #[serde(default, alias = "passwordHash")]
    pub password_hash: Option<String>,

    /// Whether the account is active. Inactive users cannot authenticate.
    #[serde(default = "default_active")]
    pub active: bool,

    /// When the user was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// Credential material stays out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("has_password", &self.password_hash.is_some())
            .field("active", &self.active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Creates a new active user with the given username and no password.
    ///
    /// A new UUID is generated as the ID.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: None,
            name: None,
            password_salt: None,
            password_hash: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(username: impl Into<String>) -> UserBuilder {
        UserBuilder::new(username)
    }

    /// Returns `true` if the user account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if the user can authenticate with a password.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

// =============================================================================
// User Builder
// =============================================================================

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    fn new(username: impl Into<String>) -> Self {
        Self {
            user: User::new(username),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = id.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = Some(name.into());
        self
    }

    /// Sets a raw PHC password hash. The salt field is left untouched.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.user.password_hash = Some(hash.into());
        self
    }

    /// Sets the password from a freshly computed hash, salt included.
    #[must_use]
    pub fn password(mut self, hashed: HashedPassword) -> Self {
        self.user.password_salt = Some(hashed.salt);
        self.user.password_hash = Some(hashed.hash);
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Lookup operations the authenticator needs from a user store.
///
/// # Example
///
/// ```ignore
/// use credgate_auth::storage::UserStorage;
///
/// async fn example(storage: &impl UserStorage) {
///     if let Some(user) = storage.find_by_username("alice").await? {
///         println!("Found user: {}", user.id);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;

    /// Find a user by their username.
    ///
    /// Callers pass an already case-folded username (see
    /// [`normalize_username`](crate::authenticator::normalize_username)).
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;
}

// =============================================================================
// Tests
// =============================================================================
