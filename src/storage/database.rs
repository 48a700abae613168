// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `admins`, `users`, `companies`, `campaigns`, `notifications`:
//!   document id (UUID string) → JSON document bytes
//! - `admin_emails`: lowercase email → admin id
//! - `user_emails`: lowercase email → user id
//! - `user_phones`: phone number → user id
//!
//! Unique indexes are checked and written in the same write transaction as
//! the document, so two concurrent registrations cannot both succeed.
//! Single-document updates are atomic; there are no multi-document
//! transactions above this layer.

use std::path::Path;

use redb::{
    backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, TableDefinition,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub type DocTable = TableDefinition<'static, &'static str, &'static [u8]>;
pub type IndexTable = TableDefinition<'static, &'static str, &'static str>;

pub const ADMINS: DocTable = TableDefinition::new("admins");
pub const USERS: DocTable = TableDefinition::new("users");
pub const COMPANIES: DocTable = TableDefinition::new("companies");
pub const CAMPAIGNS: DocTable = TableDefinition::new("campaigns");
pub const NOTIFICATIONS: DocTable = TableDefinition::new("notifications");

pub const ADMIN_EMAILS: IndexTable = TableDefinition::new("admin_emails");
pub const USER_EMAILS: IndexTable = TableDefinition::new("user_emails");
pub const USER_PHONES: IndexTable = TableDefinition::new("user_phones");

const DOC_TABLES: [DocTable; 5] = [ADMINS, USERS, COMPANIES, CAMPAIGNS, NOTIFICATIONS];
const INDEX_TABLES: [IndexTable; 3] = [ADMIN_EMAILS, USER_EMAILS, USER_PHONES];

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("permission denied: user {user_id} cannot access {resource}")]
    PermissionDenied { user_id: String, resource: &'static str },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A unique-index entry to claim when inserting a document.
pub struct UniqueKey<'a> {
    pub index: IndexTable,
    pub key: &'a str,
    /// Human readable name used in the conflict error ("Email", "Phone number").
    pub label: &'static str,
}

// =============================================================================
// DocumentStore
// =============================================================================

/// Embedded ACID document store.
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::with_database(db)
    }

    /// Open a throwaway database held entirely in memory.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> StoreResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            for table in DOC_TABLES {
                write_txn.open_table(table)?;
            }
            for index in INDEX_TABLES {
                write_txn.open_table(index)?;
            }
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Cheap read probe used by the health endpoint.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(ADMINS)?;
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up a single document by id.
    pub fn get<T: DeserializeOwned>(&self, table: DocTable, id: &str) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve a unique index key to a document id.
    pub fn lookup(&self, index: IndexTable, key: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(index)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    /// Return every document matching `filter`, in storage order.
    pub fn find<T, F>(&self, table: DocTable, filter: F) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut docs = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: T = serde_json::from_slice(value.value())?;
            if filter(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Count documents matching `filter`.
    pub fn count<T, F>(&self, table: DocTable, filter: F) -> StoreResult<usize>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        Ok(self.find(table, filter)?.len())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a new document, claiming the given unique index keys.
    ///
    /// Fails with `UniqueViolation` (nothing written) if any key is taken.
    pub fn insert<T: Serialize>(
        &self,
        table: DocTable,
        id: &str,
        doc: &T,
        unique: &[UniqueKey<'_>],
    ) -> StoreResult<()> {
        let json = serde_json::to_vec(doc)?;

        let write_txn = self.db.begin_write()?;
        {
            for entry in unique {
                let index = write_txn.open_table(entry.index)?;
                if index.get(entry.key)?.is_some() {
                    return Err(StoreError::UniqueViolation(entry.label.to_string()));
                }
            }
            for entry in unique {
                let mut index = write_txn.open_table(entry.index)?;
                index.insert(entry.key, id)?;
            }

            let mut docs = write_txn.open_table(table)?;
            docs.insert(id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Insert several documents in one transaction (no unique keys).
    pub fn insert_many<T: Serialize>(&self, table: DocTable, docs: &[(String, T)]) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tbl = write_txn.open_table(table)?;
            for (id, doc) in docs {
                let json = serde_json::to_vec(doc)?;
                tbl.insert(id.as_str(), json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(docs.len())
    }

    /// Read-modify-write a document by id and return the updated document.
    ///
    /// Returns `Ok(None)` if no document has that id.
    pub fn update<T, F>(&self, table: DocTable, id: &str, mutate: F) -> StoreResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut tbl = write_txn.open_table(table)?;

            // Copy the bytes out before mutating the table
            let existing = match tbl.get(id)? {
                Some(value) => value.value().to_vec(),
                None => return Ok(None),
            };

            let mut doc: T = serde_json::from_slice(&existing)?;
            mutate(&mut doc);

            let json = serde_json::to_vec(&doc)?;
            tbl.insert(id, json.as_slice())?;
            doc
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete every document matching `filter`; returns how many were removed.
    pub fn delete_many<T, F>(&self, table: DocTable, filter: F) -> StoreResult<usize>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut tbl = write_txn.open_table(table)?;

            let mut doomed = Vec::new();
            for entry in tbl.iter()? {
                let (key, value) = entry?;
                let doc: T = serde_json::from_slice(value.value())?;
                if filter(&doc) {
                    doomed.push(key.value().to_string());
                }
            }

            for id in &doomed {
                tbl.remove(id.as_str())?;
            }
            doomed.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
