//! Error types for the member ledger

use crate::types::{MemberLevel, MemberStatus};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced account, user or transaction does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Amount or points must be strictly positive
    #[error("Invalid amount: {0} (must be > 0)")]
    InvalidAmount(i64),

    /// Consume or refund beyond the current balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Requested amount (minor units)
        required: i64,
        /// Current balance (minor units)
        available: i64,
    },

    /// Points deduction beyond the current points
    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientPoints {
        /// Requested points
        required: i64,
        /// Current points
        available: i64,
    },

    /// Operation needs an active account
    #[error("Account {account_id} is not active (status: {status})")]
    InactiveAccount {
        /// Account identifier
        account_id: String,
        /// Current status
        status: MemberStatus,
    },

    /// Upgrade target is not strictly above the current level
    #[error("Invalid level transition: {from} -> {to}")]
    InvalidLevelTransition {
        /// Current level
        from: MemberLevel,
        /// Requested level (raw input, may be unrecognized)
        to: String,
    },

    /// Malformed input at the store boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (writer mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short stable label, used as a metrics dimension
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::InsufficientBalance { .. } => "insufficient_balance",
            Error::InsufficientPoints { .. } => "insufficient_points",
            Error::InactiveAccount { .. } => "inactive_account",
            Error::InvalidLevelTransition { .. } => "invalid_level_transition",
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }

    /// Whether a caller may retry the same request.
    ///
    /// Business-rule violations never become valid on retry; only
    /// infrastructure failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::Concurrency(_) | Error::Io(_)
        )
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_not_transient() {
        assert!(!Error::InvalidAmount(0).is_transient());
        assert!(!Error::InsufficientBalance {
            required: 700,
            available: 600
        }
        .is_transient());
        assert!(!Error::NotFound("acct".into()).is_transient());
        assert!(Error::Storage("disk full".into()).is_transient());
        assert!(Error::Concurrency("mailbox closed".into()).is_transient());
    }

    #[test]
    fn test_error_messages_distinguish_kinds() {
        let err = Error::InsufficientBalance {
            required: 700,
            available: 600,
        };
        assert_eq!(err.kind(), "insufficient_balance");
        assert!(err.to_string().contains("required 700"));

        let err = Error::InvalidLevelTransition {
            from: MemberLevel::Silver,
            to: "basic".into(),
        };
        assert_eq!(err.to_string(), "Invalid level transition: silver -> basic");
    }
}
