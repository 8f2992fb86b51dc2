//! Member ledger service
//!
//! This module ties together storage, the writer actors and metrics into
//! the API the back-office calls: account lifecycle, recharge, consumption,
//! points, refunds, level upgrades and read-side queries.
//!
//! Every mutation is routed to the writer actor owning the account, which
//! loads the account, validates, computes the next state and commits the
//! account row together with its transaction record in one atomic batch.
//! Reads go straight to storage.
//!
//! # Example
//!
//! ```no_run
//! use member_ledger::{Config, MemberLedger, NewMemberAccount};
//!
//! #[tokio::main]
//! async fn main() -> member_ledger::Result<()> {
//!     let ledger = MemberLedger::open(Config::default()).await?;
//!
//!     let account = ledger.create_account(NewMemberAccount::for_user("user-42")).await?;
//!     let account = ledger.recharge(account.id, 1000, "top-up", "wechat", None).await?;
//!     assert_eq!(account.balance, 1000);
//!
//!     ledger.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_writer_actors, LedgerHandle},
    operation::{replay, LedgerOperation},
    storage::StorageStats,
    types::{
        AccountFilter, AccountId, AccountStats, AccountUpdate, MemberAccount, MemberStatus,
        Metadata, NewMemberAccount, Page, Paginated, Reconciliation, TransactionFilter,
        TransactionId, TransactionRecord, TransactionType, TransactionUpdate, UserId,
    },
    Config, Error, Metrics, Result, Storage,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Main ledger interface
pub struct MemberLedger {
    /// Writer actors for mutations
    handle: LedgerHandle,

    /// Actor tasks, joined on shutdown
    tasks: Vec<JoinHandle<()>>,

    /// Direct storage access (for reads)
    storage: Arc<Storage>,

    /// Prometheus metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl MemberLedger {
    /// Open ledger with configuration
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let storage = Arc::new(Storage::open(&config)?);
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        let (handle, tasks) = spawn_writer_actors(
            storage.clone(),
            config.writers.shards,
            config.writers.mailbox_capacity,
        );

        tracing::info!(
            data_dir = ?config.data_dir,
            shards = config.writers.shards,
            "Member ledger opened"
        );

        Ok(Self {
            handle,
            tasks,
            storage,
            metrics,
            config,
        })
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // Account lifecycle

    /// Open an account for a newly registered user
    pub async fn create_account(&self, new: NewMemberAccount) -> Result<MemberAccount> {
        let started = Instant::now();
        let result = self.storage.create_account(new);
        self.metrics
            .record_outcome("create_account", &result, started.elapsed().as_secs_f64());

        let account = result?;
        self.metrics.record_account_created();
        tracing::info!(
            account_id = %account.id,
            user_id = %account.user_id,
            level = %account.level,
            "Member account created"
        );
        Ok(account)
    }

    /// Get account by ID
    pub fn get_account(&self, account_id: AccountId) -> Result<MemberAccount> {
        self.storage.get_account(account_id)
    }

    /// Get account by owning user
    pub fn get_account_by_user(&self, user_id: &str) -> Result<MemberAccount> {
        self.storage.get_account_by_user(&UserId::new(user_id))
    }

    /// List accounts, newest first
    pub fn list_accounts(
        &self,
        filter: &AccountFilter,
        page: Page,
    ) -> Result<Paginated<MemberAccount>> {
        let limit = self.config.pagination.effective_limit(page.limit);
        self.storage.page_accounts(filter, limit, page.offset)
    }

    /// Administrative update of level, status, expiry or metadata.
    ///
    /// Writes no transaction record.
    pub async fn update_account(
        &self,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<MemberAccount> {
        let started = Instant::now();
        let result = self.handle.update_account(account_id, update).await;
        self.metrics
            .record_outcome("update_account", &result, started.elapsed().as_secs_f64());

        match result {
            Ok(account) => {
                tracing::info!(
                    account_id = %account_id,
                    level = %account.level,
                    status = %account.status,
                    "Member account updated"
                );
                Ok(account)
            }
            Err(e) => Err(self.rejected("update_account", account_id, e)),
        }
    }

    /// Remove an account row. The transaction log is kept.
    pub async fn delete_account(&self, account_id: AccountId) -> Result<bool> {
        let started = Instant::now();
        let result = self.handle.delete_account(account_id).await;
        self.metrics
            .record_outcome("delete_account", &result, started.elapsed().as_secs_f64());

        match result {
            Ok(removed) => {
                if removed {
                    tracing::warn!(account_id = %account_id, "Member account deleted");
                }
                Ok(removed)
            }
            Err(e) => Err(self.rejected("delete_account", account_id, e)),
        }
    }

    // Ledger operations

    /// Top up balance. Allowed whatever the account status.
    pub async fn recharge(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        payment_method: &str,
        external_payment_id: Option<&str>,
    ) -> Result<MemberAccount> {
        self.post(
            account_id,
            LedgerOperation::Recharge {
                amount,
                description: description.to_string(),
                payment_method: payment_method.to_string(),
                external_payment_id: external_payment_id.map(str::to_string),
            },
        )
        .await
    }

    /// Pay from balance. Requires an active account and enough balance.
    pub async fn consume(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        metadata: Option<Metadata>,
    ) -> Result<MemberAccount> {
        self.post(
            account_id,
            LedgerOperation::Consume {
                amount,
                description: description.to_string(),
                metadata: metadata.unwrap_or_default(),
            },
        )
        .await
    }

    /// Grant points
    pub async fn add_points(
        &self,
        account_id: AccountId,
        points: i64,
        description: &str,
        metadata: Option<Metadata>,
    ) -> Result<MemberAccount> {
        self.post(
            account_id,
            LedgerOperation::AddPoints {
                points,
                description: description.to_string(),
                metadata: metadata.unwrap_or_default(),
            },
        )
        .await
    }

    /// Redeem points
    pub async fn deduct_points(
        &self,
        account_id: AccountId,
        points: i64,
        description: &str,
        metadata: Option<Metadata>,
    ) -> Result<MemberAccount> {
        self.post(
            account_id,
            LedgerOperation::DeductPoints {
                points,
                description: description.to_string(),
                metadata: metadata.unwrap_or_default(),
            },
        )
        .await
    }

    /// Return money from balance to the member's payment method
    pub async fn refund(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        payment_method: &str,
        external_payment_id: Option<&str>,
    ) -> Result<MemberAccount> {
        self.post(
            account_id,
            LedgerOperation::Refund {
                amount,
                description: description.to_string(),
                payment_method: payment_method.to_string(),
                external_payment_id: external_payment_id.map(str::to_string),
            },
        )
        .await
    }

    /// Raise the member level. Downgrades, no-ops and unknown levels fail.
    pub async fn upgrade_level(
        &self,
        account_id: AccountId,
        new_level: &str,
    ) -> Result<MemberAccount> {
        let started = Instant::now();
        let result = self
            .handle
            .upgrade_level(account_id, new_level.to_string())
            .await;
        self.metrics
            .record_outcome("upgrade_level", &result, started.elapsed().as_secs_f64());

        match result {
            Ok(account) => {
                tracing::info!(
                    account_id = %account_id,
                    level = %account.level,
                    "Member level upgraded"
                );
                Ok(account)
            }
            Err(e) => Err(self.rejected("upgrade_level", account_id, e)),
        }
    }

    async fn post(
        &self,
        account_id: AccountId,
        operation: LedgerOperation,
    ) -> Result<MemberAccount> {
        let name = operation.name();
        let started = Instant::now();
        let result = self.handle.post(account_id, operation).await;
        self.metrics
            .record_outcome(name, &result, started.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                if let Some(record) = outcome.record {
                    tracing::info!(
                        account_id = %account_id,
                        transaction_id = %record.id,
                        operation = name,
                        amount = record.amount,
                        balance = record.balance_after,
                        points = record.points_after,
                        "Ledger operation applied"
                    );
                }
                Ok(outcome.account)
            }
            Err(e) => Err(self.rejected(name, account_id, e)),
        }
    }

    fn rejected(&self, operation: &str, account_id: AccountId, error: Error) -> Error {
        if error.is_transient() {
            tracing::error!(
                account_id = %account_id,
                operation,
                error = %error,
                "Ledger operation failed"
            );
        } else {
            tracing::warn!(
                account_id = %account_id,
                operation,
                error = %error,
                "Ledger operation rejected"
            );
        }
        error
    }

    // Read side

    /// Balances, totals and log counts for an account
    pub fn get_stats(&self, account_id: AccountId) -> Result<AccountStats> {
        let account = self.storage.get_account(account_id)?;
        let records = self
            .storage
            .list_transactions(account_id, &TransactionFilter::default())?;

        let count = |t: TransactionType| {
            records
                .iter()
                .filter(|r| r.transaction_type() == t)
                .count()
        };

        Ok(AccountStats {
            account_id,
            balance: account.balance,
            points: account.points,
            total_recharge: account.total_recharge,
            total_consumption: account.total_consumption,
            total_refunded: account.total_refunded,
            level: account.level,
            status: account.status,
            recharge_count: count(TransactionType::Recharge),
            consumption_count: count(TransactionType::Consumption),
            refund_count: count(TransactionType::Refund),
            points_adjust_count: count(TransactionType::PointsAdjust),
        })
    }

    /// An account's transactions, newest first
    pub fn get_transactions(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Paginated<TransactionRecord>> {
        // Surface NotFound for unknown accounts rather than an empty page
        self.storage.get_account(account_id)?;

        let limit = self.config.pagination.effective_limit(page.limit);
        self.storage
            .page_transactions(account_id, filter, limit, page.offset)
    }

    /// Get transaction by ID
    pub fn get_transaction(&self, transaction_id: TransactionId) -> Result<TransactionRecord> {
        self.storage.get_transaction(transaction_id)
    }

    /// Look up the record for a payment-processor reference
    pub fn get_transaction_by_external_payment_id(
        &self,
        external_payment_id: &str,
    ) -> Result<TransactionRecord> {
        self.storage.get_transaction_by_external_id(external_payment_id)
    }

    /// Administrative correction of a record. Balances are not adjusted.
    pub fn update_transaction(
        &self,
        transaction_id: TransactionId,
        update: &TransactionUpdate,
    ) -> Result<TransactionRecord> {
        let record = self.storage.update_transaction(transaction_id, update)?;
        tracing::warn!(
            transaction_id = %transaction_id,
            account_id = %record.account_id,
            status = %record.status,
            "Transaction record corrected"
        );
        Ok(record)
    }

    /// Administrative cleanup of a record. Balances are not adjusted.
    pub fn delete_transaction(&self, transaction_id: TransactionId) -> Result<bool> {
        let removed = self.storage.delete_transaction(transaction_id)?;
        if removed {
            tracing::warn!(transaction_id = %transaction_id, "Transaction record deleted");
        }
        Ok(removed)
    }

    /// Replay the account's log and compare with the stored projection
    pub fn reconcile(&self, account_id: AccountId) -> Result<Reconciliation> {
        let account = self.storage.get_account(account_id)?;
        let records = self
            .storage
            .list_transactions(account_id, &TransactionFilter::default())?;

        let reconciliation = replay(&account, &records);
        if !reconciliation.is_consistent() {
            tracing::error!(
                account_id = %account_id,
                expected_balance = reconciliation.expected_balance,
                stored_balance = reconciliation.stored_balance,
                "Account projection diverges from transaction log"
            );
        }
        Ok(reconciliation)
    }

    /// Mark active accounts whose expiry has passed as expired
    pub async fn expire_due_accounts(&self, now: DateTime<Utc>) -> Result<Vec<MemberAccount>> {
        let candidates = self.storage.list_accounts(&AccountFilter {
            status: Some(MemberStatus::Active),
            ..Default::default()
        })?;

        let mut expired = Vec::new();
        for account in candidates.into_iter().filter(|a| a.is_overdue(now)) {
            // Re-checked by the writer; expiry may have been extended meanwhile
            if let Some(account) = self.handle.expire_if_due(account.id, now).await? {
                tracing::info!(account_id = %account.id, "Member account expired");
                expired.push(account);
            }
        }
        Ok(expired)
    }

    /// Approximate row counts
    pub fn storage_stats(&self) -> Result<StorageStats> {
        self.storage.get_stats()
    }

    /// Shutdown ledger, waiting for in-flight writes
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        for task in self.tasks {
            task.await
                .map_err(|e| Error::Concurrency(format!("Writer task failed: {}", e)))?;
        }
        tracing::info!("Member ledger shut down");
        Ok(())
    }
}
