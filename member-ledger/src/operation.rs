//! Ledger operations as pure state transitions
//!
//! Every mutating operation is expressed as a [`LedgerOperation`] that, given
//! the account's current state, either fails with a business error or
//! produces a [`Posting`]: the next account state plus the transaction record
//! describing the change. Nothing here touches storage; the writer actor
//! commits a posting atomically.
//!
//! # Invariants
//!
//! - `balance >= 0` and `points >= 0` after every posting
//! - `total_recharge`, `total_consumption` and `total_refunded` never decrease
//! - the record's before/after fields equal the account state on either side

use crate::error::{Error, Result};
use crate::types::{
    MemberAccount, MemberLevel, Metadata, Reconciliation, TransactionId, TransactionKind,
    TransactionRecord, TransactionStatus, TransactionType,
};
use chrono::{DateTime, Utc};

/// A balance- or points-affecting request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOperation {
    /// Top up balance from an external payment
    Recharge {
        /// Amount in minor units
        amount: i64,
        /// Description
        description: String,
        /// Payment method
        payment_method: String,
        /// Processor reference, used for idempotency
        external_payment_id: Option<String>,
    },
    /// Pay from balance
    Consume {
        /// Amount in minor units
        amount: i64,
        /// Description
        description: String,
        /// Extra metadata (order id, etc.)
        metadata: Metadata,
    },
    /// Grant points
    AddPoints {
        /// Points to add
        points: i64,
        /// Description
        description: String,
        /// Extra metadata
        metadata: Metadata,
    },
    /// Redeem points
    DeductPoints {
        /// Points to remove
        points: i64,
        /// Description
        description: String,
        /// Extra metadata
        metadata: Metadata,
    },
    /// Return money to the member's payment method
    Refund {
        /// Amount in minor units
        amount: i64,
        /// Description
        description: String,
        /// Payment method the money goes back to
        payment_method: String,
        /// Processor reference
        external_payment_id: Option<String>,
    },
}

/// Result of applying an operation: new account state plus its log entry
#[derive(Debug, Clone)]
pub struct Posting {
    /// Account after the operation
    pub account: MemberAccount,
    /// Record to append
    pub record: TransactionRecord,
}

impl LedgerOperation {
    /// Operation name (logs, metrics)
    pub fn name(&self) -> &'static str {
        match self {
            LedgerOperation::Recharge { .. } => "recharge",
            LedgerOperation::Consume { .. } => "consume",
            LedgerOperation::AddPoints { .. } => "add_points",
            LedgerOperation::DeductPoints { .. } => "deduct_points",
            LedgerOperation::Refund { .. } => "refund",
        }
    }

    /// Requested amount or points
    pub fn quantity(&self) -> i64 {
        match self {
            LedgerOperation::Recharge { amount, .. }
            | LedgerOperation::Consume { amount, .. }
            | LedgerOperation::Refund { amount, .. } => *amount,
            LedgerOperation::AddPoints { points, .. }
            | LedgerOperation::DeductPoints { points, .. } => *points,
        }
    }

    /// Type of the record this operation appends
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            LedgerOperation::Recharge { .. } => TransactionType::Recharge,
            LedgerOperation::Consume { .. } => TransactionType::Consumption,
            LedgerOperation::AddPoints { .. } | LedgerOperation::DeductPoints { .. } => {
                TransactionType::PointsAdjust
            }
            LedgerOperation::Refund { .. } => TransactionType::Refund,
        }
    }

    /// External payment reference carried by recharges and refunds
    pub fn external_payment_id(&self) -> Option<&str> {
        match self {
            LedgerOperation::Recharge {
                external_payment_id,
                ..
            }
            | LedgerOperation::Refund {
                external_payment_id,
                ..
            } => external_payment_id.as_deref(),
            _ => None,
        }
    }

    /// Payment method carried by recharges and refunds
    pub fn payment_method(&self) -> Option<&str> {
        match self {
            LedgerOperation::Recharge { payment_method, .. }
            | LedgerOperation::Refund { payment_method, .. } => Some(payment_method),
            _ => None,
        }
    }

    /// Reject zero and negative amounts or points
    pub fn check_quantity(&self) -> Result<()> {
        let quantity = self.quantity();
        if quantity <= 0 {
            return Err(Error::InvalidAmount(quantity));
        }
        Ok(())
    }

    /// True if `record` is an earlier posting of this same request
    pub fn is_replay_of(&self, record: &TransactionRecord) -> bool {
        record.transaction_type() == self.transaction_type()
            && record.amount == self.quantity()
            && record.kind.payment_method() == self.payment_method()
    }

    /// Validate against the current account and compute the posting
    pub fn apply(self, account: &MemberAccount, now: DateTime<Utc>) -> Result<Posting> {
        self.check_quantity()?;

        let mut next = account.clone();

        let (kind, amount, description, metadata) = match self {
            LedgerOperation::Recharge {
                amount,
                description,
                payment_method,
                external_payment_id,
            } => {
                next.balance = checked(account.balance.checked_add(amount), "balance")?;
                next.total_recharge =
                    checked(account.total_recharge.checked_add(amount), "total_recharge")?;
                let kind = TransactionKind::Recharge {
                    payment_method,
                    external_payment_id,
                };
                (kind, amount, description, Metadata::new())
            }

            LedgerOperation::Consume {
                amount,
                description,
                metadata,
            } => {
                if !account.is_active() {
                    return Err(Error::InactiveAccount {
                        account_id: account.id.to_string(),
                        status: account.status,
                    });
                }
                if account.balance < amount {
                    return Err(Error::InsufficientBalance {
                        required: amount,
                        available: account.balance,
                    });
                }
                next.balance = account.balance - amount;
                next.total_consumption = checked(
                    account.total_consumption.checked_add(amount),
                    "total_consumption",
                )?;
                (TransactionKind::Consumption, amount, description, metadata)
            }

            LedgerOperation::AddPoints {
                points,
                description,
                metadata,
            } => {
                next.points = checked(account.points.checked_add(points), "points")?;
                let kind = TransactionKind::PointsAdjust {
                    points_change: points,
                };
                (kind, 0, description, metadata)
            }

            LedgerOperation::DeductPoints {
                points,
                description,
                metadata,
            } => {
                if account.points < points {
                    return Err(Error::InsufficientPoints {
                        required: points,
                        available: account.points,
                    });
                }
                next.points = account.points - points;
                let kind = TransactionKind::PointsAdjust {
                    points_change: -points,
                };
                (kind, 0, description, metadata)
            }

            LedgerOperation::Refund {
                amount,
                description,
                payment_method,
                external_payment_id,
            } => {
                if account.balance < amount {
                    return Err(Error::InsufficientBalance {
                        required: amount,
                        available: account.balance,
                    });
                }
                next.balance = account.balance - amount;
                next.total_refunded =
                    checked(account.total_refunded.checked_add(amount), "total_refunded")?;
                let kind = TransactionKind::Refund {
                    payment_method,
                    external_payment_id,
                };
                (kind, amount, description, Metadata::new())
            }
        };

        next.updated_at = now;

        let record = TransactionRecord {
            id: TransactionId::generate(),
            account_id: account.id,
            kind,
            amount,
            balance_before: account.balance,
            balance_after: next.balance,
            points_before: account.points,
            points_after: next.points,
            description,
            status: TransactionStatus::Completed,
            metadata,
            created_at: now,
            completed_at: Some(now),
        };

        Ok(Posting {
            account: next,
            record,
        })
    }
}

fn checked(value: Option<i64>, field: &str) -> Result<i64> {
    value.ok_or_else(|| Error::Validation(format!("{} would overflow", field)))
}

/// Resolve an upgrade request against the current level.
///
/// Only strictly higher, recognized levels are accepted.
pub fn resolve_level_upgrade(current: MemberLevel, requested: &str) -> Result<MemberLevel> {
    match MemberLevel::parse(requested) {
        Some(target) if target > current => Ok(target),
        _ => Err(Error::InvalidLevelTransition {
            from: current,
            to: requested.to_string(),
        }),
    }
}

/// Replay an account's log and compare it with the stored projection.
///
/// Only completed records count; pending, failed and cancelled entries never
/// moved money.
pub fn replay<'a>(
    account: &MemberAccount,
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> Reconciliation {
    let mut rec = Reconciliation {
        account_id: account.id,
        replayed_transactions: 0,
        expected_balance: 0,
        stored_balance: account.balance,
        expected_points: 0,
        stored_points: account.points,
        expected_total_recharge: 0,
        stored_total_recharge: account.total_recharge,
        expected_total_consumption: 0,
        stored_total_consumption: account.total_consumption,
        expected_total_refunded: 0,
        stored_total_refunded: account.total_refunded,
    };

    for record in records {
        if record.status != TransactionStatus::Completed {
            continue;
        }
        rec.replayed_transactions += 1;
        match record.kind {
            TransactionKind::Recharge { .. } => {
                rec.expected_balance += record.amount;
                rec.expected_total_recharge += record.amount;
            }
            TransactionKind::Consumption => {
                rec.expected_balance -= record.amount;
                rec.expected_total_consumption += record.amount;
            }
            TransactionKind::Refund { .. } => {
                rec.expected_balance -= record.amount;
                rec.expected_total_refunded += record.amount;
            }
            TransactionKind::PointsAdjust { points_change } => {
                rec.expected_points += points_change;
            }
        }
    }

    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberStatus, NewMemberAccount};

    fn account_with(balance: i64, points: i64) -> MemberAccount {
        let mut account = MemberAccount::open(NewMemberAccount::for_user("u-1"), Utc::now());
        account.balance = balance;
        account.total_recharge = balance;
        account.points = points;
        account
    }

    fn recharge(amount: i64) -> LedgerOperation {
        LedgerOperation::Recharge {
            amount,
            description: "top-up".into(),
            payment_method: "wechat".into(),
            external_payment_id: None,
        }
    }

    fn consume(amount: i64) -> LedgerOperation {
        LedgerOperation::Consume {
            amount,
            description: "purchase".into(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_replay_requires_same_details() {
        let account = account_with(0, 0);
        let record = recharge(1000).apply(&account, Utc::now()).unwrap().record;

        assert!(recharge(1000).is_replay_of(&record));
        assert!(!recharge(999).is_replay_of(&record));
        assert!(!LedgerOperation::Recharge {
            amount: 1000,
            description: "top-up".into(),
            payment_method: "alipay".into(),
            external_payment_id: None,
        }
        .is_replay_of(&record));
        assert!(!consume(1000).is_replay_of(&record));
    }

    #[test]
    fn test_recharge_brackets_state() {
        let account = account_with(0, 0);
        let posting = recharge(1000).apply(&account, Utc::now()).unwrap();

        assert_eq!(posting.account.balance, 1000);
        assert_eq!(posting.account.total_recharge, 1000);
        assert_eq!(posting.record.transaction_type(), TransactionType::Recharge);
        assert_eq!(posting.record.balance_before, 0);
        assert_eq!(posting.record.balance_after, 1000);
        assert_eq!(posting.record.status, TransactionStatus::Completed);
        assert!(posting.record.completed_at.is_some());
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let account = account_with(100, 100);
        assert!(matches!(
            recharge(0).apply(&account, Utc::now()),
            Err(Error::InvalidAmount(0))
        ));
        assert!(matches!(
            consume(-5).apply(&account, Utc::now()),
            Err(Error::InvalidAmount(-5))
        ));
    }

    #[test]
    fn test_consume_checks_balance() {
        let account = account_with(600, 0);
        let result = consume(700).apply(&account, Utc::now());
        assert!(matches!(
            result,
            Err(Error::InsufficientBalance {
                required: 700,
                available: 600
            })
        ));

        let posting = consume(600).apply(&account, Utc::now()).unwrap();
        assert_eq!(posting.account.balance, 0);
        assert_eq!(posting.record.kind.payment_method(), Some("balance"));
    }

    #[test]
    fn test_consume_requires_active() {
        let mut account = account_with(10_000, 0);
        account.status = MemberStatus::Suspended;
        let result = consume(1).apply(&account, Utc::now());
        assert!(matches!(result, Err(Error::InactiveAccount { .. })));
    }

    #[test]
    fn test_recharge_ignores_status() {
        let mut account = account_with(0, 0);
        account.status = MemberStatus::Expired;
        assert!(recharge(50).apply(&account, Utc::now()).is_ok());
    }

    #[test]
    fn test_points_adjustments() {
        let account = account_with(0, 100);
        let deduct = LedgerOperation::DeductPoints {
            points: 150,
            description: "redeem".into(),
            metadata: Metadata::new(),
        };
        assert!(matches!(
            deduct.apply(&account, Utc::now()),
            Err(Error::InsufficientPoints { .. })
        ));

        let add = LedgerOperation::AddPoints {
            points: 25,
            description: "promo".into(),
            metadata: Metadata::new(),
        };
        let posting = add.apply(&account, Utc::now()).unwrap();
        assert_eq!(posting.account.points, 125);
        assert_eq!(posting.record.amount, 0);
        assert_eq!(
            posting.record.kind,
            TransactionKind::PointsAdjust { points_change: 25 }
        );
    }

    #[test]
    fn test_refund_keeps_recharge_total() {
        let account = account_with(1000, 0);
        let refund = LedgerOperation::Refund {
            amount: 300,
            description: "return".into(),
            payment_method: "wechat".into(),
            external_payment_id: None,
        };
        let posting = refund.apply(&account, Utc::now()).unwrap();
        assert_eq!(posting.account.balance, 700);
        assert_eq!(posting.account.total_recharge, 1000);
        assert_eq!(posting.account.total_refunded, 300);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let account = account_with(i64::MAX, 0);
        assert!(matches!(
            recharge(1).apply(&account, Utc::now()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_level_upgrade_rules() {
        assert_eq!(
            resolve_level_upgrade(MemberLevel::Basic, "silver").unwrap(),
            MemberLevel::Silver
        );
        assert!(resolve_level_upgrade(MemberLevel::Silver, "basic").is_err());
        assert!(resolve_level_upgrade(MemberLevel::Basic, "basic").is_err());
        assert!(resolve_level_upgrade(MemberLevel::Diamond, "diamond").is_err());
        assert!(matches!(
            resolve_level_upgrade(MemberLevel::Basic, "bronze"),
            Err(Error::InvalidLevelTransition { .. })
        ));
    }

    #[test]
    fn test_replay_matches_postings() {
        let mut account = account_with(0, 0);
        let mut records = Vec::new();
        for op in [recharge(1000), consume(400), recharge(50), consume(650)] {
            let posting = op.apply(&account, Utc::now()).unwrap();
            account = posting.account;
            records.push(posting.record);
        }

        let rec = replay(&account, &records);
        assert!(rec.is_consistent());
        assert_eq!(rec.expected_balance, 0);
        assert_eq!(rec.replayed_transactions, 4);

        records[0].status = TransactionStatus::Failed;
        assert!(!replay(&account, &records).is_consistent());
    }
}
