//! Error types for Estia operations.
//!
//! Every service operation reports one of these kinds; callers map kinds to
//! their own surface (response codes, RPC statuses) without inspecting
//! messages.

use thiserror::Error;

/// Result type alias using Estia Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Operation error kinds for Estia services.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed shape or range validation before any write.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced user or application does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated (duplicate email, open application).
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A domain invariant would be broken (e.g. demoting the last admin).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Credit deduction larger than the current balance.
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    /// Application was already approved or rejected.
    #[error("Already decided: {0}")]
    AlreadyDecided(String),

    /// A store call exceeded its deadline. `step` names the failing call.
    #[error("Store call timed out during {step}")]
    Timeout { step: &'static str },

    /// Underlying store failure, with the failing step for retry context.
    #[error("Store failure during {step}: {message}")]
    StoreFailure { step: &'static str, message: String },
}

impl Error {
    /// Wrap a storage-layer error with the name of the step that failed.
    pub fn store(step: &'static str, err: impl std::fmt::Display) -> Self {
        Self::StoreFailure {
            step,
            message: err.to_string(),
        }
    }
}
