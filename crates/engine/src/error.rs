//! The module contains the errors the engine can throw.
//!
//! The taxonomy is intentionally small:
//!
//! - [`InvalidInput`] for user-correctable input (malformed amount, empty name).
//! - [`InvalidPeriod`] for period expressions outside the recognized shapes.
//! - [`NotFound`] for missing users/wallets/transactions/share edges.
//! - [`InvalidGrant`] / [`DuplicateGrant`] for rejected share operations.
//! - [`Database`] for storage failures, surfaced untouched.
//!
//! [`InvalidInput`]: EngineError::InvalidInput
//! [`InvalidPeriod`]: EngineError::InvalidPeriod
//! [`NotFound`]: EngineError::NotFound
//! [`InvalidGrant`]: EngineError::InvalidGrant
//! [`DuplicateGrant`]: EngineError::DuplicateGrant
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),
    #[error("Duplicate grant: {0}")]
    DuplicateGrant(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidGrant(a), Self::InvalidGrant(b)) => a == b,
            (Self::DuplicateGrant(a), Self::DuplicateGrant(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
