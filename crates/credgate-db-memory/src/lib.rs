//! In-memory user storage backend for credgate.
//!
//! This crate provides an in-memory implementation of the `UserStorage` trait
//! from `credgate-auth`, using `dashmap` for concurrent access. Users can be
//! seeded from a JSON array, which is what the `credgate` CLI does.
//!
//! # Example
//!
//! ```ignore
//! use credgate_db_memory::InMemoryUserStorage;
//! use credgate_auth::UserStorage;
//!
//! let storage = InMemoryUserStorage::from_json_file("users.json")?;
//! let alice = storage.find_by_username("alice").await?;
//! ```

pub mod storage;

pub use storage::InMemoryUserStorage;
