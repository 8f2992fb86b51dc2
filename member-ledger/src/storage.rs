//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `accounts` - Member account projections (key: account_id)
//! - `transactions` - Append-mostly transaction log (key: transaction_id)
//! - `indices` - Secondary indices for fast lookups
//!
//! Both account and transaction IDs are UUIDv7, so key order is creation
//! order and "newest first" is a reverse scan.
//!
//! # Indices
//!
//! - `user|<user_id>` -> account_id (one account per user)
//! - `acct-tx|<account_id><transaction_id>` -> empty
//! - `ext|<external_payment_id>` -> transaction_id

use crate::{
    error::{Error, Result},
    operation::Posting,
    types::{
        AccountFilter, AccountId, AccountUpdate, MemberAccount, NewMemberAccount, Paginated,
        TransactionFilter, TransactionId, TransactionRecord, TransactionUpdate, UserId,
    },
    Config,
};
use chrono::Utc;
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch,
    WriteOptions, DB,
};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_ACCOUNTS: &str = "accounts";
const CF_TRANSACTIONS: &str = "transactions";
const CF_INDICES: &str = "indices";

/// Index key prefixes
const IDX_USER: &[u8] = b"user|";
const IDX_ACCOUNT_TX: &[u8] = b"acct-tx|";
const IDX_EXTERNAL: &[u8] = b"ext|";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,

    /// fsync WAL on ledger commits
    sync_writes: bool,

    /// Serializes user-index check-and-write (create/delete)
    index_lock: Mutex<()>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Self::cf_options_accounts()),
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_transactions()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened member ledger store");

        Ok(Self {
            db: Arc::new(db),
            sync_writes: config.rocksdb.sync_writes,
            index_lock: Mutex::new(()),
        })
    }

    // Column family options

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Accounts are read on every operation, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_transactions() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    // Helpers

    fn cf_handle(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        self.db.write_opt(batch, &opts)?;
        Ok(())
    }

    /// Keys under `prefix` in the indices CF, ascending
    fn scan_index(&self, prefix: &[u8]) -> Result<Vec<Box<[u8]>>> {
        let cf = self.cf_handle(CF_INDICES)?;
        let mut keys = Vec::new();
        for item in self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key);
        }
        Ok(keys)
    }

    // Account operations

    /// Create a new account; fails if the user already has one
    pub fn create_account(&self, new: NewMemberAccount) -> Result<MemberAccount> {
        new.validate()?;

        let _guard = self.index_lock.lock();

        if self.find_account_id_by_user(&new.user_id)?.is_some() {
            return Err(Error::Validation(format!(
                "user {} already has a member account",
                new.user_id
            )));
        }

        let account = MemberAccount::open(new, Utc::now());

        let mut batch = WriteBatch::default();
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        batch.put_cf(&cf_accounts, account.id.as_bytes(), bincode::serialize(&account)?);
        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.put_cf(
            &cf_indices,
            Self::index_key_user(&account.user_id),
            account.id.as_bytes(),
        );
        self.write(batch)?;

        tracing::debug!(account_id = %account.id, user_id = %account.user_id, "Account stored");

        Ok(account)
    }

    /// Get account by ID, `None` if absent
    pub fn find_account(&self, id: AccountId) -> Result<Option<MemberAccount>> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;
        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Get account by ID
    pub fn get_account(&self, id: AccountId) -> Result<MemberAccount> {
        self.find_account(id)?
            .ok_or_else(|| Error::NotFound(format!("account {}", id)))
    }

    /// Get account by owning user
    pub fn get_account_by_user(&self, user_id: &UserId) -> Result<MemberAccount> {
        let id = self
            .find_account_id_by_user(user_id)?
            .ok_or_else(|| Error::NotFound(format!("account for user {}", user_id)))?;
        self.get_account(id)
    }

    fn find_account_id_by_user(&self, user_id: &UserId) -> Result<Option<AccountId>> {
        let cf = self.cf_handle(CF_INDICES)?;
        match self.db.get_cf(&cf, Self::index_key_user(user_id))? {
            Some(value) => Ok(Some(AccountId::from_uuid(Self::uuid_from(&value)?))),
            None => Ok(None),
        }
    }

    /// Accounts matching the filter, newest first
    pub fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<MemberAccount>> {
        if let Some(ref user_id) = filter.user_id {
            return match self.find_account_id_by_user(user_id)? {
                Some(id) => Ok(self
                    .find_account(id)?
                    .into_iter()
                    .filter(|account| filter.matches(account))
                    .collect()),
                None => Ok(Vec::new()),
            };
        }

        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item?;
            let account: MemberAccount = bincode::deserialize(&value)?;
            if filter.matches(&account) {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    /// One page of accounts matching the filter, newest first.
    ///
    /// Without a filter, rows outside the page are counted but not decoded.
    pub fn page_accounts(
        &self,
        filter: &AccountFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Paginated<MemberAccount>> {
        if filter.user_id.is_some() {
            return Ok(Paginated::from_ordered(self.list_accounts(filter)?, limit, offset));
        }

        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let unfiltered = filter.is_empty();
        let mut items = Vec::new();
        let mut total = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item?;
            let in_page = total >= offset && items.len() < limit;
            if unfiltered && !in_page {
                total += 1;
                continue;
            }
            let account: MemberAccount = bincode::deserialize(&value)?;
            if filter.matches(&account) {
                if in_page {
                    items.push(account);
                }
                total += 1;
            }
        }

        Ok(Paginated {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Overwrite an account row
    pub fn put_account(&self, account: &MemberAccount) -> Result<()> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, account.id.as_bytes(), bincode::serialize(account)?);
        self.write(batch)
    }

    /// Merge an administrative update into an account
    pub fn update_account(&self, id: AccountId, update: &AccountUpdate) -> Result<MemberAccount> {
        let mut account = self.get_account(id)?;
        update.apply_to(&mut account, Utc::now());
        self.put_account(&account)?;
        Ok(account)
    }

    /// Remove an account; the transaction log is left in place
    pub fn delete_account(&self, id: AccountId) -> Result<bool> {
        let _guard = self.index_lock.lock();

        let account = match self.find_account(id)? {
            Some(account) => account,
            None => return Ok(false),
        };

        let mut batch = WriteBatch::default();
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        batch.delete_cf(&cf_accounts, id.as_bytes());
        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.delete_cf(&cf_indices, Self::index_key_user(&account.user_id));
        self.write(batch)?;

        Ok(true)
    }

    // Transaction log operations

    /// Append a record with its indices. Never touches the account row.
    pub fn append_transaction(&self, record: &TransactionRecord) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.stage_transaction(&mut batch, record)?;
        self.write(batch)?;

        tracing::debug!(
            transaction_id = %record.id,
            account_id = %record.account_id,
            "Transaction appended"
        );

        Ok(())
    }

    /// Get transaction by ID, `None` if absent
    pub fn find_transaction(&self, id: TransactionId) -> Result<Option<TransactionRecord>> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Get transaction by ID
    pub fn get_transaction(&self, id: TransactionId) -> Result<TransactionRecord> {
        self.find_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Find the record carrying an external payment reference
    pub fn find_transaction_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<TransactionRecord>> {
        let cf = self.cf_handle(CF_INDICES)?;
        match self
            .db
            .get_cf(&cf, Self::index_key_external(external_payment_id))?
        {
            Some(value) => {
                let id = TransactionId::from_uuid(Self::uuid_from(&value)?);
                self.find_transaction(id)
            }
            None => Ok(None),
        }
    }

    /// Get the record carrying an external payment reference
    pub fn get_transaction_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<TransactionRecord> {
        self.find_transaction_by_external_id(external_payment_id)?
            .ok_or_else(|| {
                Error::NotFound(format!("transaction for payment {}", external_payment_id))
            })
    }

    /// An account's transactions matching the filter, newest first
    pub fn list_transactions(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>> {
        let prefix = Self::index_key_account_tx(account_id, None);
        let keys = self.scan_index(&prefix)?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys.iter().rev() {
            let id = TransactionId::from_uuid(Self::uuid_from(&key[prefix.len()..])?);
            // Index entries may outlive a record removed by administrative cleanup
            if let Some(record) = self.find_transaction(id)? {
                if filter.matches(&record) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    /// One page of an account's transactions, newest first.
    ///
    /// Without a filter only the records on the page are read; the index
    /// alone gives the total.
    pub fn page_transactions(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Paginated<TransactionRecord>> {
        let prefix = Self::index_key_account_tx(account_id, None);
        let keys = self.scan_index(&prefix)?;
        let unfiltered = filter.is_empty();

        let mut items = Vec::new();
        let mut total = 0;
        for key in keys.iter().rev() {
            let in_page = total >= offset && items.len() < limit;
            if unfiltered && !in_page {
                total += 1;
                continue;
            }
            let id = TransactionId::from_uuid(Self::uuid_from(&key[prefix.len()..])?);
            if let Some(record) = self.find_transaction(id)? {
                if filter.matches(&record) {
                    if in_page {
                        items.push(record);
                    }
                    total += 1;
                }
            }
        }

        Ok(Paginated {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Administrative correction of a record
    pub fn update_transaction(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> Result<TransactionRecord> {
        let mut record = self.get_transaction(id)?;
        update.apply_to(&mut record, Utc::now());

        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, id.as_bytes(), bincode::serialize(&record)?);
        self.write(batch)?;

        Ok(record)
    }

    /// Administrative cleanup; the account row is not adjusted
    pub fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let record = match self.find_transaction(id)? {
            Some(record) => record,
            None => return Ok(false),
        };

        let mut batch = WriteBatch::default();
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;
        batch.delete_cf(&cf_transactions, id.as_bytes());

        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.delete_cf(
            &cf_indices,
            Self::index_key_account_tx(record.account_id, Some(id)),
        );
        if let Some(external_id) = record.kind.external_payment_id() {
            batch.delete_cf(&cf_indices, Self::index_key_external(external_id));
        }
        self.write(batch)?;

        Ok(true)
    }

    // Batch operations (atomic)

    /// Commit account state and its transaction record in one write batch
    pub fn commit_posting(&self, posting: &Posting) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        batch.put_cf(
            &cf_accounts,
            posting.account.id.as_bytes(),
            bincode::serialize(&posting.account)?,
        );
        self.stage_transaction(&mut batch, &posting.record)?;

        self.write(batch)
    }

    fn stage_transaction(&self, batch: &mut WriteBatch, record: &TransactionRecord) -> Result<()> {
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;
        batch.put_cf(
            &cf_transactions,
            record.id.as_bytes(),
            bincode::serialize(record)?,
        );

        let cf_indices = self.cf_handle(CF_INDICES)?;
        batch.put_cf(
            &cf_indices,
            Self::index_key_account_tx(record.account_id, Some(record.id)),
            b"",
        );
        if let Some(external_id) = record.kind.external_payment_id() {
            batch.put_cf(
                &cf_indices,
                Self::index_key_external(external_id),
                record.id.as_bytes(),
            );
        }
        Ok(())
    }

    // Index key helpers

    fn index_key_user(user_id: &UserId) -> Vec<u8> {
        let mut key = IDX_USER.to_vec();
        key.extend_from_slice(user_id.as_str().as_bytes());
        key
    }

    fn index_key_account_tx(account_id: AccountId, tx_id: Option<TransactionId>) -> Vec<u8> {
        let mut key = IDX_ACCOUNT_TX.to_vec();
        key.extend_from_slice(account_id.as_bytes());
        if let Some(tx_id) = tx_id {
            key.extend_from_slice(tx_id.as_bytes());
        }
        key
    }

    fn index_key_external(external_payment_id: &str) -> Vec<u8> {
        let mut key = IDX_EXTERNAL.to_vec();
        key.extend_from_slice(external_payment_id.as_bytes());
        key
    }

    fn uuid_from(bytes: &[u8]) -> Result<Uuid> {
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::Storage(format!("corrupt index entry ({} bytes)", bytes.len())))?;
        Ok(Uuid::from_bytes(bytes))
    }

    // Statistics

    /// Get storage statistics
    pub fn get_stats(&self) -> Result<StorageStats> {
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;

        let total_accounts = self
            .db
            .property_int_value_cf(&cf_accounts, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);
        let total_transactions = self
            .db
            .property_int_value_cf(&cf_transactions, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);

        Ok(StorageStats {
            total_accounts,
            total_transactions,
        })
    }
}

/// Storage statistics (approximate)
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Estimated account rows
    pub total_accounts: u64,
    /// Estimated transaction rows
    pub total_transactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::LedgerOperation;
    use crate::types::{MemberLevel, MemberStatus, Metadata, TransactionStatus, TransactionType};
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        config.rocksdb.sync_writes = false;
        (Storage::open(&config).unwrap(), temp_dir)
    }

    fn recharge_posting(account: &MemberAccount, amount: i64, ext: Option<&str>) -> Posting {
        LedgerOperation::Recharge {
            amount,
            description: "top-up".into(),
            payment_method: "wechat".into(),
            external_payment_id: ext.map(str::to_string),
        }
        .apply(account, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_create_and_get_account() {
        let (storage, _temp) = test_storage();

        let account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();

        let by_id = storage.get_account(account.id).unwrap();
        assert_eq!(by_id, account);

        let by_user = storage.get_account_by_user(&UserId::new("user-1")).unwrap();
        assert_eq!(by_user.id, account.id);
    }

    #[test]
    fn test_one_account_per_user() {
        let (storage, _temp) = test_storage();

        storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();
        let second = storage.create_account(NewMemberAccount::for_user("user-1"));
        assert!(matches!(second, Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_account() {
        let (storage, _temp) = test_storage();
        let result = storage.get_account(AccountId::generate());
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result = storage.update_account(AccountId::generate(), &AccountUpdate::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_accounts_newest_first_with_filters() {
        let (storage, _temp) = test_storage();

        let first = storage
            .create_account(NewMemberAccount::for_user("a"))
            .unwrap();
        let second = storage
            .create_account(NewMemberAccount::for_user("b").with_level(MemberLevel::Gold))
            .unwrap();
        let third = storage
            .create_account(NewMemberAccount::for_user("c"))
            .unwrap();

        let all = storage.list_accounts(&AccountFilter::default()).unwrap();
        let ids: Vec<_> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let gold = storage
            .list_accounts(&AccountFilter {
                level: Some(MemberLevel::Gold),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(gold.len(), 1);
        assert_eq!(gold[0].id, second.id);

        let by_user = storage
            .list_accounts(&AccountFilter {
                user_id: Some(UserId::new("c")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].id, third.id);
    }

    #[test]
    fn test_update_and_delete_account() {
        let (storage, _temp) = test_storage();
        let account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();

        let updated = storage
            .update_account(account.id, &AccountUpdate::status(MemberStatus::Suspended))
            .unwrap();
        assert_eq!(updated.status, MemberStatus::Suspended);

        assert!(storage.delete_account(account.id).unwrap());
        assert!(!storage.delete_account(account.id).unwrap());

        // User is free to register again
        assert!(storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .is_ok());
    }

    #[test]
    fn test_commit_posting_is_atomic_unit() {
        let (storage, _temp) = test_storage();
        let account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();

        let posting = recharge_posting(&account, 1000, Some("wx-1"));
        storage.commit_posting(&posting).unwrap();

        assert_eq!(storage.get_account(account.id).unwrap().balance, 1000);

        let record = storage.get_transaction(posting.record.id).unwrap();
        assert_eq!(record.balance_after, 1000);

        let by_external = storage.get_transaction_by_external_id("wx-1").unwrap();
        assert_eq!(by_external.id, posting.record.id);
    }

    #[test]
    fn test_list_transactions_newest_first() {
        let (storage, _temp) = test_storage();
        let mut account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();
        let other = storage
            .create_account(NewMemberAccount::for_user("user-2"))
            .unwrap();

        let mut ids = Vec::new();
        for amount in [100, 200, 300] {
            let posting = recharge_posting(&account, amount, None);
            storage.commit_posting(&posting).unwrap();
            ids.push(posting.record.id);
            account = posting.account;
        }
        let consume = LedgerOperation::Consume {
            amount: 50,
            description: "purchase".into(),
            metadata: Metadata::new(),
        }
        .apply(&account, Utc::now())
        .unwrap();
        storage.commit_posting(&consume).unwrap();
        storage
            .commit_posting(&recharge_posting(&other, 999, None))
            .unwrap();

        let all = storage
            .list_transactions(account.id, &TransactionFilter::default())
            .unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, consume.record.id);
        assert_eq!(all[3].id, ids[0]);

        let recharges = storage
            .list_transactions(
                account.id,
                &TransactionFilter::of_type(TransactionType::Recharge),
            )
            .unwrap();
        assert_eq!(recharges.len(), 3);

        let by_method = storage
            .list_transactions(
                account.id,
                &TransactionFilter {
                    payment_method: Some("balance".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(by_method.len(), 1);
    }

    #[test]
    fn test_page_transactions_matches_full_listing() {
        let (storage, _temp) = test_storage();
        let mut account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();

        for amount in 1..=7 {
            let posting = recharge_posting(&account, amount, None);
            storage.commit_posting(&posting).unwrap();
            account = posting.account;
        }
        let consume = LedgerOperation::Consume {
            amount: 3,
            description: "purchase".into(),
            metadata: Metadata::new(),
        }
        .apply(&account, Utc::now())
        .unwrap();
        storage.commit_posting(&consume).unwrap();

        let all = TransactionFilter::default();
        let full = storage.list_transactions(account.id, &all).unwrap();
        let page = storage.page_transactions(account.id, &all, 3, 2).unwrap();
        assert_eq!(page.total, 8);
        let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
        let expected: Vec<_> = full[2..5].iter().map(|r| r.id).collect();
        assert_eq!(ids, expected);

        let recharges = TransactionFilter::of_type(TransactionType::Recharge);
        let page = storage.page_transactions(account.id, &recharges, 2, 6).unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].amount, 1);

        let past_end = storage.page_transactions(account.id, &all, 5, 20).unwrap();
        assert_eq!(past_end.total, 8);
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_page_accounts() {
        let (storage, _temp) = test_storage();
        let mut ids = Vec::new();
        for i in 0..5 {
            let level = if i % 2 == 0 { MemberLevel::Gold } else { MemberLevel::Basic };
            let account = storage
                .create_account(NewMemberAccount::for_user(format!("user-{}", i)).with_level(level))
                .unwrap();
            ids.push(account.id);
        }

        let page = storage.page_accounts(&AccountFilter::default(), 2, 1).unwrap();
        assert_eq!(page.total, 5);
        let page_ids: Vec<_> = page.items.iter().map(|a| a.id).collect();
        assert_eq!(page_ids, vec![ids[3], ids[2]]);

        let gold = AccountFilter {
            level: Some(MemberLevel::Gold),
            ..Default::default()
        };
        let page = storage.page_accounts(&gold, 2, 0).unwrap();
        assert_eq!(page.total, 3);
        let page_ids: Vec<_> = page.items.iter().map(|a| a.id).collect();
        assert_eq!(page_ids, vec![ids[4], ids[2]]);
    }

    #[test]
    fn test_update_and_delete_transaction() {
        let (storage, _temp) = test_storage();
        let account = storage
            .create_account(NewMemberAccount::for_user("user-1"))
            .unwrap();
        let posting = recharge_posting(&account, 100, Some("wx-9"));
        storage.append_transaction(&posting.record).unwrap();

        // Append alone leaves the account untouched
        assert_eq!(storage.get_account(account.id).unwrap().balance, 0);

        let updated = storage
            .update_transaction(
                posting.record.id,
                &TransactionUpdate {
                    status: Some(TransactionStatus::Failed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Failed);

        assert!(storage.delete_transaction(posting.record.id).unwrap());
        assert!(storage
            .find_transaction_by_external_id("wx-9")
            .unwrap()
            .is_none());
        assert!(storage
            .list_transactions(account.id, &TransactionFilter::default())
            .unwrap()
            .is_empty());
    }
}
