//! Core types for the member ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (integer minor currency units, never floats)
//! - Time-ordered identifiers (UUIDv7 keys sort by creation)

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Free-form string metadata attached to accounts and transactions
pub type Metadata = BTreeMap<String, String>;

/// Payment method recorded on consumption transactions
pub const BALANCE_PAYMENT_METHOD: &str = "balance";

/// Convert minor currency units (cents) to a display amount
pub fn to_major_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Member account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new time-ordered account ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::Validation(format!("malformed account id {:?}: {}", s, e)))
    }
}

/// Owning user identifier (issued by the registration system)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a new time-ordered transaction ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::Validation(format!("malformed transaction id {:?}: {}", s, e)))
    }
}

/// Membership tier, ordered lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MemberLevel {
    /// Entry tier
    Basic = 1,
    /// Silver tier
    Silver = 2,
    /// Gold tier
    Gold = 3,
    /// Platinum tier
    Platinum = 4,
    /// Diamond tier (highest)
    Diamond = 5,
}

impl MemberLevel {
    /// All levels in rank order
    pub const ALL: [MemberLevel; 5] = [
        MemberLevel::Basic,
        MemberLevel::Silver,
        MemberLevel::Gold,
        MemberLevel::Platinum,
        MemberLevel::Diamond,
    ];

    /// Rank, 1 (basic) through 5 (diamond)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Next level up, `None` at diamond
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.rank() as usize).copied()
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberLevel::Basic => "basic",
            MemberLevel::Silver => "silver",
            MemberLevel::Gold => "gold",
            MemberLevel::Platinum => "platinum",
            MemberLevel::Diamond => "diamond",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl Default for MemberLevel {
    fn default() -> Self {
        MemberLevel::Basic
    }
}

impl fmt::Display for MemberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Normal operation
    Active,
    /// Administratively suspended
    Suspended,
    /// Membership lapsed
    Expired,
}

impl MemberStatus {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Suspended => "suspended",
            MemberStatus::Expired => "expired",
        }
    }
}

impl Default for MemberStatus {
    fn default() -> Self {
        MemberStatus::Active
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "suspended" => Ok(MemberStatus::Suspended),
            "expired" => Ok(MemberStatus::Expired),
            other => Err(Error::Validation(format!("unknown member status {:?}", other))),
        }
    }
}

/// Current-state projection of a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccount {
    /// Account ID (UUIDv7)
    pub id: AccountId,

    /// Owning user (unique across accounts)
    pub user_id: UserId,

    /// Balance in minor currency units, never negative
    pub balance: i64,

    /// Loyalty points, never negative
    pub points: i64,

    /// Cumulative recharged amount (monotonic)
    pub total_recharge: i64,

    /// Cumulative consumed amount (monotonic)
    pub total_consumption: i64,

    /// Cumulative refunded amount (monotonic)
    pub total_refunded: i64,

    /// Membership tier
    pub level: MemberLevel,

    /// Account status
    pub status: MemberStatus,

    /// Membership expiry
    pub expires_at: Option<DateTime<Utc>>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl MemberAccount {
    /// Build a fresh account from creation input
    pub fn open(new: NewMemberAccount, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::generate(),
            user_id: new.user_id,
            balance: 0,
            points: 0,
            total_recharge: 0,
            total_consumption: 0,
            total_refunded: 0,
            level: new.level,
            status: MemberStatus::Active,
            expires_at: new.expires_at,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether consumption is allowed
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Whether the expiry timestamp has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// Input for account creation (registration or admin bootstrap)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMemberAccount {
    /// Owning user
    pub user_id: UserId,
    /// Starting level
    #[serde(default)]
    pub level: MemberLevel,
    /// Optional expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewMemberAccount {
    /// Basic-level account for a user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            level: MemberLevel::Basic,
            expires_at: None,
            metadata: Metadata::new(),
        }
    }

    /// Set starting level
    pub fn with_level(mut self, level: MemberLevel) -> Self {
        self.level = level;
        self
    }

    /// Set expiry
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Check field shape
    pub fn validate(&self) -> Result<()> {
        if self.user_id.as_str().trim().is_empty() {
            return Err(Error::Validation("user id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Administrative partial update of an account.
///
/// Balance, points and the cumulative totals are deliberately absent: only
/// ledger operations may change them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// New level
    pub level: Option<MemberLevel>,
    /// New status
    pub status: Option<MemberStatus>,
    /// New expiry (`Some(None)` clears it)
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// Replacement metadata
    pub metadata: Option<Metadata>,
}

impl AccountUpdate {
    /// Status-only update
    pub fn status(status: MemberStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge into an account and stamp the update time
    pub fn apply_to(&self, account: &mut MemberAccount, now: DateTime<Utc>) {
        if let Some(level) = self.level {
            account.level = level;
        }
        if let Some(status) = self.status {
            account.status = status;
        }
        if let Some(expires_at) = self.expires_at {
            account.expires_at = expires_at;
        }
        if let Some(ref metadata) = self.metadata {
            account.metadata = metadata.clone();
        }
        account.updated_at = now;
    }
}

/// Account listing filter
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Only this level
    pub level: Option<MemberLevel>,
    /// Only this status
    pub status: Option<MemberStatus>,
    /// Only this user
    pub user_id: Option<UserId>,
}

impl AccountFilter {
    /// True when every account passes
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.status.is_none() && self.user_id.is_none()
    }

    /// Check if an account passes the filter
    pub fn matches(&self, account: &MemberAccount) -> bool {
        self.level.map_or(true, |level| account.level == level)
            && self.status.map_or(true, |status| account.status == status)
            && self
                .user_id
                .as_ref()
                .map_or(true, |user_id| &account.user_id == user_id)
    }
}

/// Pagination request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Page size (`None` = configured default)
    pub limit: Option<usize>,
    /// Items to skip
    pub offset: usize,
}

impl Page {
    /// Page with explicit size and offset
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }
}

/// One page of results, newest first
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items
    pub total: usize,
    /// Effective page size
    pub limit: usize,
    /// Items skipped
    pub offset: usize,
}

impl<T> Paginated<T> {
    /// Cut one page out of a full, already ordered result set
    pub fn from_ordered(all: Vec<T>, limit: usize, offset: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

/// Flat transaction type, used for filtering and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Balance top-up
    Recharge,
    /// Purchase paid from balance
    Consumption,
    /// Points grant or deduction
    PointsAdjust,
    /// Money returned to the member
    Refund,
}

impl TransactionType {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Recharge => "recharge",
            TransactionType::Consumption => "consumption",
            TransactionType::PointsAdjust => "points_adjust",
            TransactionType::Refund => "refund",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of event a transaction records, with the fields each kind needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Balance top-up from an external payment
    Recharge {
        /// Payment method (e.g. "wechat", "alipay")
        payment_method: String,
        /// Processor-side payment reference
        external_payment_id: Option<String>,
    },
    /// Purchase paid from balance
    Consumption,
    /// Points grant (positive) or deduction (negative)
    PointsAdjust {
        /// Signed points delta
        points_change: i64,
    },
    /// Money returned to the member's payment method
    Refund {
        /// Payment method the refund goes back to
        payment_method: String,
        /// Processor-side refund reference
        external_payment_id: Option<String>,
    },
}

impl TransactionKind {
    /// Flat type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Recharge { .. } => TransactionType::Recharge,
            TransactionKind::Consumption => TransactionType::Consumption,
            TransactionKind::PointsAdjust { .. } => TransactionType::PointsAdjust,
            TransactionKind::Refund { .. } => TransactionType::Refund,
        }
    }

    /// Payment method, if the kind has one
    pub fn payment_method(&self) -> Option<&str> {
        match self {
            TransactionKind::Recharge { payment_method, .. }
            | TransactionKind::Refund { payment_method, .. } => Some(payment_method),
            TransactionKind::Consumption => Some(BALANCE_PAYMENT_METHOD),
            TransactionKind::PointsAdjust { .. } => None,
        }
    }

    /// External payment reference, if any
    pub fn external_payment_id(&self) -> Option<&str> {
        match self {
            TransactionKind::Recharge {
                external_payment_id,
                ..
            }
            | TransactionKind::Refund {
                external_payment_id,
                ..
            } => external_payment_id.as_deref(),
            _ => None,
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting confirmation
    Pending,
    /// Applied
    Completed,
    /// Failed
    Failed,
    /// Cancelled
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
        })
    }
}

/// Append-only record of one balance/points-affecting event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction ID (UUIDv7)
    pub id: TransactionId,

    /// Owning account
    pub account_id: AccountId,

    /// Kind with kind-specific fields
    pub kind: TransactionKind,

    /// Amount in minor units (0 for pure points adjustments)
    pub amount: i64,

    /// Balance before the operation
    pub balance_before: i64,

    /// Balance after the operation
    pub balance_after: i64,

    /// Points before the operation
    pub points_before: i64,

    /// Points after the operation
    pub points_after: i64,

    /// Free-text description
    pub description: String,

    /// Status
    pub status: TransactionStatus,

    /// Additional metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Completed timestamp
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Flat type
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Signed points delta
    pub fn points_change(&self) -> i64 {
        self.points_after - self.points_before
    }
}

/// Administrative correction of a transaction record
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// New status
    pub status: Option<TransactionStatus>,
    /// New description
    pub description: Option<String>,
    /// Replacement metadata
    pub metadata: Option<Metadata>,
}

impl TransactionUpdate {
    /// Merge into a record
    pub fn apply_to(&self, record: &mut TransactionRecord, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            record.status = status;
            if status == TransactionStatus::Completed && record.completed_at.is_none() {
                record.completed_at = Some(now);
            }
        }
        if let Some(ref description) = self.description {
            record.description = description.clone();
        }
        if let Some(ref metadata) = self.metadata {
            record.metadata = metadata.clone();
        }
    }
}

/// Transaction listing filter
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only this type
    pub transaction_type: Option<TransactionType>,
    /// Only this status
    pub status: Option<TransactionStatus>,
    /// Only this payment method
    pub payment_method: Option<String>,
}

impl TransactionFilter {
    /// Only one transaction type
    pub fn of_type(transaction_type: TransactionType) -> Self {
        Self {
            transaction_type: Some(transaction_type),
            ..Default::default()
        }
    }

    /// True when every record passes
    pub fn is_empty(&self) -> bool {
        self.transaction_type.is_none() && self.status.is_none() && self.payment_method.is_none()
    }

    /// Check if a record passes the filter
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.transaction_type
            .map_or(true, |t| record.transaction_type() == t)
            && self.status.map_or(true, |s| record.status == s)
            && self
                .payment_method
                .as_deref()
                .map_or(true, |m| record.kind.payment_method() == Some(m))
    }
}

/// Read-only aggregate view of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStats {
    /// Account ID
    pub account_id: AccountId,
    /// Current balance
    pub balance: i64,
    /// Current points
    pub points: i64,
    /// Cumulative recharge
    pub total_recharge: i64,
    /// Cumulative consumption
    pub total_consumption: i64,
    /// Cumulative refunds
    pub total_refunded: i64,
    /// Current level
    pub level: MemberLevel,
    /// Current status
    pub status: MemberStatus,
    /// Recharge transactions in the log
    pub recharge_count: usize,
    /// Consumption transactions in the log
    pub consumption_count: usize,
    /// Refund transactions in the log
    pub refund_count: usize,
    /// Points adjustments in the log
    pub points_adjust_count: usize,
}

/// Result of replaying an account's log against its stored state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Account ID
    pub account_id: AccountId,
    /// Completed records replayed
    pub replayed_transactions: usize,
    /// Balance derived from the log
    pub expected_balance: i64,
    /// Balance stored on the account
    pub stored_balance: i64,
    /// Points derived from the log
    pub expected_points: i64,
    /// Points stored on the account
    pub stored_points: i64,
    /// Recharge total derived from the log
    pub expected_total_recharge: i64,
    /// Recharge total stored on the account
    pub stored_total_recharge: i64,
    /// Consumption total derived from the log
    pub expected_total_consumption: i64,
    /// Consumption total stored on the account
    pub stored_total_consumption: i64,
    /// Refund total derived from the log
    pub expected_total_refunded: i64,
    /// Refund total stored on the account
    pub stored_total_refunded: i64,
}

impl Reconciliation {
    /// Stored state equals the replayed log
    pub fn is_consistent(&self) -> bool {
        self.expected_balance == self.stored_balance
            && self.expected_points == self.stored_points
            && self.expected_total_recharge == self.stored_total_recharge
            && self.expected_total_consumption == self.stored_total_consumption
            && self.expected_total_refunded == self.stored_total_refunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> MemberAccount {
        MemberAccount::open(NewMemberAccount::for_user("user-1"), Utc::now())
    }

    #[test]
    fn test_level_order() {
        assert!(MemberLevel::Basic < MemberLevel::Silver);
        assert!(MemberLevel::Platinum < MemberLevel::Diamond);
        assert_eq!(MemberLevel::Basic.next(), Some(MemberLevel::Silver));
        assert_eq!(MemberLevel::Diamond.next(), None);
        assert_eq!(MemberLevel::Gold.rank(), 3);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(MemberLevel::parse("gold"), Some(MemberLevel::Gold));
        assert_eq!(MemberLevel::parse(" Diamond "), Some(MemberLevel::Diamond));
        assert_eq!(MemberLevel::parse("bronze"), None);
    }

    #[test]
    fn test_new_account_defaults() {
        let account = test_account();
        assert_eq!(account.balance, 0);
        assert_eq!(account.points, 0);
        assert_eq!(account.level, MemberLevel::Basic);
        assert_eq!(account.status, MemberStatus::Active);
        assert!(account.is_active());
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let result = NewMemberAccount::for_user("  ").validate();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_account_update_leaves_money_alone() {
        let mut account = test_account();
        account.balance = 500;

        let update = AccountUpdate {
            level: Some(MemberLevel::Gold),
            status: Some(MemberStatus::Suspended),
            ..Default::default()
        };
        update.apply_to(&mut account, Utc::now());

        assert_eq!(account.level, MemberLevel::Gold);
        assert_eq!(account.status, MemberStatus::Suspended);
        assert_eq!(account.balance, 500);
    }

    #[test]
    fn test_account_filter() {
        let mut account = test_account();
        account.level = MemberLevel::Silver;

        assert!(AccountFilter::default().matches(&account));
        assert!(AccountFilter {
            level: Some(MemberLevel::Silver),
            status: Some(MemberStatus::Active),
            user_id: Some(UserId::new("user-1")),
        }
        .matches(&account));
        assert!(!AccountFilter {
            status: Some(MemberStatus::Expired),
            ..Default::default()
        }
        .matches(&account));
    }

    #[test]
    fn test_consumption_pays_from_balance() {
        assert_eq!(
            TransactionKind::Consumption.payment_method(),
            Some(BALANCE_PAYMENT_METHOD)
        );
        let recharge = TransactionKind::Recharge {
            payment_method: "wechat".into(),
            external_payment_id: Some("wx-1".into()),
        };
        assert_eq!(recharge.transaction_type(), TransactionType::Recharge);
        assert_eq!(recharge.external_payment_id(), Some("wx-1"));
        assert_eq!(
            TransactionKind::PointsAdjust { points_change: 5 }.payment_method(),
            None
        );
    }

    #[test]
    fn test_paginated_slices() {
        let page = Paginated::from_ordered((0..10).collect::<Vec<_>>(), 3, 8);
        assert_eq!(page.items, vec![8, 9]);
        assert_eq!(page.total, 10);
    }

    #[test]
    fn test_major_units() {
        assert_eq!(to_major_units(1050).to_string(), "10.50");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Suspended".parse::<MemberStatus>().unwrap(), MemberStatus::Suspended);
        assert!("frozen".parse::<MemberStatus>().is_err());
    }
}
