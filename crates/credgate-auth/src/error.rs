//! Authentication error types.
//!
//! A rejected login is not an error: unknown users, wrong passwords and
//! inactive accounts are reported through [`AuthOutcome`](crate::AuthOutcome).
//! The types here cover collaborator failures that the caller has to surface.

use std::fmt;

/// Generic message shown to end users for any [`AuthError`].
pub const PUBLIC_ERROR_MESSAGE: &str = "authentication is temporarily unavailable";

/// Errors raised by the slow comparison primitive.
///
/// These are never memoized by the verification cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    /// The stored hash could not be parsed.
    #[error("Malformed password hash: {message}")]
    MalformedHash {
        /// Description of the parse failure.
        message: String,
    },

    /// Hashing or verification failed inside the primitive.
    #[error("Hashing failed: {message}")]
    Hashing {
        /// Description of the failure.
        message: String,
    },

    /// The offloaded comparison task panicked or was cancelled.
    #[error("Comparison task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },
}

impl ComparisonError {
    /// Creates a new `MalformedHash` error.
    #[must_use]
    pub fn malformed_hash(message: impl Into<String>) -> Self {
        Self::MalformedHash {
            message: message.into(),
        }
    }

    /// Creates a new `Hashing` error.
    #[must_use]
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Creates a new `Task` error.
    #[must_use]
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }
}

/// Errors that can occur while authenticating.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The user store failed to look up a subject.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The slow comparison primitive failed.
    #[error("Password verification failed: {0}")]
    Comparison(#[from] ComparisonError),

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Name of the authentication stage that failed, for operator logs.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Storage { .. } => "lookup",
            Self::Comparison(_) => "verify",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Comparison(ComparisonError::MalformedHash { .. }) => ErrorCategory::Credential,
            Self::Comparison(_) => ErrorCategory::Internal,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// Message safe to show to end users. Never includes internal detail.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        PUBLIC_ERROR_MESSAGE
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Stored credential material is unusable.
    Credential,
    /// Configuration errors.
    Configuration,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Credential => write!(f, "credential"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
