//! Storage traits for authentication data.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `credgate-db-memory` - in-memory backend

pub mod user;

pub use user::{User, UserBuilder, UserStorage};
