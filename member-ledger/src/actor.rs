//! Actor-based concurrency for the member ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - Every read-modify-write of an account row runs inside one actor task
//! - Accounts are hashed onto a fixed set of actors, so mutations of one
//!   account are linearizable while other accounts proceed in parallel
//! - Async message passing with backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 MemberLedger (API)                    │
//! │        validated account id + operation               │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │     blake3(account_id) % shards -> mailbox            │
//! └──────────┬──────────────────────────────┬────────────┘
//!            │ mpsc (bounded)               │ mpsc (bounded)
//!            ▼                              ▼
//! ┌──────────────────────┐       ┌──────────────────────┐
//! │  WriterActor #0      │  ...  │  WriterActor #N-1    │
//! │  load -> validate -> │       │                      │
//! │  Storage::commit_    │       │                      │
//! │  posting (WriteBatch)│       │                      │
//! └──────────────────────┘       └──────────────────────┘
//! ```

use crate::operation::{resolve_level_upgrade, LedgerOperation};
use crate::types::{AccountId, AccountUpdate, MemberAccount, MemberStatus, TransactionRecord};
use crate::{Error, Result, Storage};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Outcome of a posted operation
#[derive(Debug, Clone)]
pub struct PostOutcome {
    /// Account after the operation
    pub account: MemberAccount,

    /// Appended record; `None` when a duplicate external payment was ignored
    pub record: Option<TransactionRecord>,
}

/// Message sent to a writer actor
pub enum LedgerMessage {
    /// Apply a balance/points operation
    Post {
        account_id: AccountId,
        operation: LedgerOperation,
        response: oneshot::Sender<Result<PostOutcome>>,
    },

    /// Raise the member level
    UpgradeLevel {
        account_id: AccountId,
        level: String,
        response: oneshot::Sender<Result<MemberAccount>>,
    },

    /// Administrative field update
    UpdateAccount {
        account_id: AccountId,
        update: AccountUpdate,
        response: oneshot::Sender<Result<MemberAccount>>,
    },

    /// Mark expired if the expiry timestamp has passed
    ExpireIfDue {
        account_id: AccountId,
        now: DateTime<Utc>,
        response: oneshot::Sender<Result<Option<MemberAccount>>>,
    },

    /// Remove the account row
    DeleteAccount {
        account_id: AccountId,
        response: oneshot::Sender<Result<bool>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns writes for one shard of accounts
pub struct WriterActor {
    /// Shard number (for logs)
    shard: usize,

    /// Storage backend
    storage: Arc<Storage>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl WriterActor {
    /// Create new actor
    pub fn new(
        shard: usize,
        storage: Arc<Storage>,
        mailbox: mpsc::Receiver<LedgerMessage>,
    ) -> Self {
        Self {
            shard,
            storage,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }
        tracing::debug!(shard = self.shard, "Writer actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Post {
                account_id,
                operation,
                response,
            } => {
                let _ = response.send(self.post(account_id, operation));
            }

            LedgerMessage::UpgradeLevel {
                account_id,
                level,
                response,
            } => {
                let _ = response.send(self.upgrade_level(account_id, &level));
            }

            LedgerMessage::UpdateAccount {
                account_id,
                update,
                response,
            } => {
                let _ = response.send(self.storage.update_account(account_id, &update));
            }

            LedgerMessage::ExpireIfDue {
                account_id,
                now,
                response,
            } => {
                let _ = response.send(self.expire_if_due(account_id, now));
            }

            LedgerMessage::DeleteAccount {
                account_id,
                response,
            } => {
                let _ = response.send(self.storage.delete_account(account_id));
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Load, validate, compute and commit one operation
    fn post(&self, account_id: AccountId, operation: LedgerOperation) -> Result<PostOutcome> {
        operation.check_quantity()?;
        let account = self.storage.get_account(account_id)?;

        if let Some(external_id) = operation.external_payment_id() {
            if let Some(existing) = self.storage.find_transaction_by_external_id(external_id)? {
                if existing.account_id != account_id || !operation.is_replay_of(&existing) {
                    return Err(Error::Validation(format!(
                        "external payment {} already recorded as transaction {}",
                        external_id, existing.id
                    )));
                }
                tracing::info!(
                    account_id = %account_id,
                    transaction_id = %existing.id,
                    external_payment_id = external_id,
                    "Duplicate external payment ignored"
                );
                return Ok(PostOutcome {
                    account,
                    record: None,
                });
            }
        }

        let posting = operation.apply(&account, Utc::now())?;
        self.storage.commit_posting(&posting)?;

        Ok(PostOutcome {
            account: posting.account,
            record: Some(posting.record),
        })
    }

    fn upgrade_level(&self, account_id: AccountId, level: &str) -> Result<MemberAccount> {
        let mut account = self.storage.get_account(account_id)?;
        account.level = resolve_level_upgrade(account.level, level)?;
        account.updated_at = Utc::now();
        self.storage.put_account(&account)?;
        Ok(account)
    }

    fn expire_if_due(
        &self,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<MemberAccount>> {
        let account = self.storage.get_account(account_id)?;
        if account.status != MemberStatus::Active || !account.is_overdue(now) {
            return Ok(None);
        }
        self.storage
            .update_account(account_id, &AccountUpdate::status(MemberStatus::Expired))
            .map(Some)
    }
}

/// Handle for sending messages to the writer actors
#[derive(Clone)]
pub struct LedgerHandle {
    senders: Vec<mpsc::Sender<LedgerMessage>>,
}

impl LedgerHandle {
    /// Create new handle over one sender per shard
    pub fn new(senders: Vec<mpsc::Sender<LedgerMessage>>) -> Self {
        assert!(!senders.is_empty(), "at least one writer shard required");
        Self { senders }
    }

    /// Number of shards
    pub fn shards(&self) -> usize {
        self.senders.len()
    }

    /// Shard owning an account
    pub fn shard_for(&self, account_id: AccountId) -> usize {
        let hash = blake3::hash(account_id.as_bytes());
        let bytes = hash.as_bytes();
        let hash_u32 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        hash_u32 as usize % self.senders.len()
    }

    async fn request<T>(
        &self,
        account_id: AccountId,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.senders[self.shard_for(account_id)]
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Writer mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Apply a balance/points operation
    pub async fn post(
        &self,
        account_id: AccountId,
        operation: LedgerOperation,
    ) -> Result<PostOutcome> {
        self.request(account_id, |response| LedgerMessage::Post {
            account_id,
            operation,
            response,
        })
        .await
    }

    /// Raise the member level
    pub async fn upgrade_level(
        &self,
        account_id: AccountId,
        level: String,
    ) -> Result<MemberAccount> {
        self.request(account_id, |response| LedgerMessage::UpgradeLevel {
            account_id,
            level,
            response,
        })
        .await
    }

    /// Administrative field update
    pub async fn update_account(
        &self,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<MemberAccount> {
        self.request(account_id, |response| LedgerMessage::UpdateAccount {
            account_id,
            update,
            response,
        })
        .await
    }

    /// Mark expired if due
    pub async fn expire_if_due(
        &self,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<MemberAccount>> {
        self.request(account_id, |response| LedgerMessage::ExpireIfDue {
            account_id,
            now,
            response,
        })
        .await
    }

    /// Remove the account row
    pub async fn delete_account(&self, account_id: AccountId) -> Result<bool> {
        self.request(account_id, |response| LedgerMessage::DeleteAccount {
            account_id,
            response,
        })
        .await
    }

    /// Shutdown all actors
    pub async fn shutdown(&self) -> Result<()> {
        for sender in &self.senders {
            sender
                .send(LedgerMessage::Shutdown)
                .await
                .map_err(|_| Error::Concurrency("Writer mailbox closed".to_string()))?;
        }
        Ok(())
    }
}

/// Spawn one writer actor per shard
pub fn spawn_writer_actors(
    storage: Arc<Storage>,
    shards: usize,
    mailbox_capacity: usize,
) -> (LedgerHandle, Vec<JoinHandle<()>>) {
    let mut senders = Vec::with_capacity(shards);
    let mut tasks = Vec::with_capacity(shards);

    for shard in 0..shards {
        // Bounded channel for backpressure
        let (tx, rx) = mpsc::channel(mailbox_capacity);
        let actor = WriterActor::new(shard, storage.clone(), rx);
        tasks.push(tokio::spawn(actor.run()));
        senders.push(tx);
    }

    (LedgerHandle::new(senders), tasks)
}
