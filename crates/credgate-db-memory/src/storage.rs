use std::path::Path;

use async_trait::async_trait;
use credgate_auth::password::HashedPassword;
use credgate_auth::{AuthError, AuthResult, User, UserStorage, normalize_username};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

/// In-memory user store.
///
/// Users are keyed by id with a secondary index from the case-folded username
/// to the id. Writers always lock the username index before the id map.
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    by_id: DashMap<String, User>,
    by_username: DashMap<String, String>,
}

impl InMemoryUserStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `users`.
    ///
    /// # Errors
    ///
    /// Returns a storage error on a duplicate id or username.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> AuthResult<Self> {
        let storage = Self::new();
        for user in users {
            storage.insert(user)?;
        }
        Ok(storage)
    }

    /// Creates a store from a JSON array of users.
    ///
    /// Users without an id are assigned a random UUID.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the JSON is invalid or contains duplicates.
    pub fn from_json_str(json: &str) -> AuthResult<Self> {
        let users: Vec<User> = serde_json::from_str(json)
            .map_err(|e| AuthError::storage(format!("invalid user seed: {e}")))?;

        Self::from_users(users.into_iter().map(|mut user| {
            if user.id.is_empty() {
                user.id = uuid::Uuid::new_v4().to_string();
            }
            user
        }))
    }

    /// Creates a store from a JSON file containing an array of users.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::storage(format!("failed to read {}: {e}", path.display()))
        })?;

        let storage = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), users = storage.len(), "Loaded user seed");
        Ok(storage)
    }

    /// Adds a new user.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the id or the folded username is taken.
    pub fn insert(&self, user: User) -> AuthResult<()> {
        let username = normalize_username(&user.username);

        let Entry::Vacant(name_slot) = self.by_username.entry(username) else {
            return Err(AuthError::storage(format!(
                "username already exists: {}",
                user.username
            )));
        };

        match self.by_id.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage(format!(
                "user id already exists: {}",
                user.id
            ))),
            Entry::Vacant(id_slot) => {
                let id = user.id.clone();
                // Id first so a visible username always resolves
                id_slot.insert(user);
                name_slot.insert(id);
                Ok(())
            }
        }
    }

    /// Inserts or replaces the user with the same id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the folded username belongs to another user.
    pub fn upsert(&self, mut user: User) -> AuthResult<Option<User>> {
        let username = normalize_username(&user.username);
        let id = user.id.clone();
        user.updated_at = OffsetDateTime::now_utc();

        let previous = match self.by_username.entry(username.clone()) {
            Entry::Occupied(owner) if owner.get() != &id => {
                return Err(AuthError::storage(format!(
                    "username already exists: {}",
                    user.username
                )));
            }
            Entry::Occupied(_) => self.by_id.insert(id.clone(), user),
            Entry::Vacant(name_slot) => {
                let previous = self.by_id.insert(id.clone(), user);
                name_slot.insert(id.clone());
                previous
            }
        };

        if let Some(previous) = &previous {
            let old_username = normalize_username(&previous.username);
            if old_username != username {
                self.by_username.remove_if(&old_username, |_, owner| owner == &id);
            }
        }

        Ok(previous)
    }

    /// Activates or deactivates a user. Returns `false` if the id is unknown.
    pub fn set_active(&self, user_id: &str, active: bool) -> bool {
        self.update(user_id, |user| user.active = active)
    }

    /// Replaces a user's password. Returns `false` if the id is unknown.
    pub fn set_password(&self, user_id: &str, hashed: HashedPassword) -> bool {
        self.update(user_id, |user| {
            user.password_salt = Some(hashed.salt);
            user.password_hash = Some(hashed.hash);
        })
    }

    fn update(&self, user_id: &str, apply: impl FnOnce(&mut User)) -> bool {
        match self.by_id.get_mut(user_id) {
            Some(mut user) => {
                apply(&mut *user);
                user.updated_at = OffsetDateTime::now_utc();
                true
            }
            None => false,
        }
    }

    /// Removes a user by id.
    pub fn remove(&self, user_id: &str) -> Option<User> {
        let (_, user) = self.by_id.remove(user_id)?;
        let username = normalize_username(&user.username);
        self.by_username
            .remove_if(&username, |_, owner| owner == user_id);
        Some(user)
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no users are stored.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        Ok(self.by_id.get(user_id).map(|user| user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let username = normalize_username(username);
        let Some(id) = self.by_username.get(&username).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|user| user.clone()))
    }
}
