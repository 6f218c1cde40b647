//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidData`] thrown when a new entry misses a required field.
//! - [`MissingId`] thrown when a deletion does not name an entry.
//! - [`Storage`] and [`Corrupt`] thrown when the backing store cannot be
//!   read, parsed or written.
//!
//!  [`InvalidData`]: EngineError::InvalidData
//!  [`MissingId`]: EngineError::MissingId
//!  [`Storage`]: EngineError::Storage
//!  [`Corrupt`]: EngineError::Corrupt
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("ID is required")]
    MissingId,
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("corrupt storage: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidData(a), Self::InvalidData(b)) => a == b,
            (Self::MissingId, Self::MissingId) => true,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Corrupt(a), Self::Corrupt(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
