//! Member Ledger
//!
//! Stored-value and loyalty-points ledger for franchise members.
//!
//! # Architecture
//!
//! - **Projection + Log**: Each account row is the running projection of its
//!   append-only transaction log
//! - **Single Writer per Account**: Accounts are sharded onto writer actors,
//!   so read-modify-write cycles never interleave
//! - **Atomic Postings**: Account row, transaction record and indices commit
//!   in one RocksDB write batch
//!
//! # Invariants
//!
//! - Balance and points never go negative
//! - balance == total_recharge - total_consumption - total_refunded
//! - Every successful balance or points change appends exactly one record
//! - Member level only moves upward

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod types;
pub mod storage;
pub mod operation;
pub mod ledger;
pub mod error;
pub mod actor;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    AccountFilter, AccountId, AccountStats, AccountUpdate, MemberAccount, MemberLevel,
    MemberStatus, Metadata, NewMemberAccount, Page, Paginated, Reconciliation, TransactionFilter,
    TransactionId, TransactionKind, TransactionRecord, TransactionStatus, TransactionType,
    TransactionUpdate, UserId,
};
pub use ledger::MemberLedger;
pub use config::Config;
pub use storage::Storage;
pub use metrics::Metrics;
