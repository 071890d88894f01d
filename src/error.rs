//! Assignor error types
//!
//! Configuration problems surface synchronously from the parser so a member
//! fails fast before joining its group. Contract violations mean the group
//! transport handed the engine structurally inconsistent input; they are
//! programming errors and are never retried here.

use thiserror::Error;

use crate::constants::MAX_PARTITION_INDEX;

/// Errors that can occur while configuring or running the assignor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignorError {
    /// A raw `allowed.partitions` (or related) option could not be normalized
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The caller broke the engine's preconditions
    #[error("Assignment contract violated: {0}")]
    ContractViolation(String),

    /// Subscription or assignment bytes are malformed
    #[error("Corrupt message: {message}")]
    CorruptMessage { message: String },

    /// Allowed-partitions user data was written by an unknown layout version
    #[error("Unsupported allowed-partitions metadata version: {0}")]
    UnsupportedVersion(i16),
}

impl AssignorError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        AssignorError::CorruptMessage {
            message: message.into(),
        }
    }

    pub(crate) fn out_of_bounds(value: impl std::fmt::Display) -> Self {
        AssignorError::InvalidConfiguration(format!(
            "partition {} is outside 0..={}",
            value, MAX_PARTITION_INDEX
        ))
    }

    /// Whether this error was raised at configuration time
    pub fn is_configuration(&self) -> bool {
        matches!(self, AssignorError::InvalidConfiguration(_))
    }
}

/// Result type alias for assignor operations
pub type Result<T> = std::result::Result<T, AssignorError>;
