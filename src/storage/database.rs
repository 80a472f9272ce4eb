// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded club database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! Every table maps a string key to a JSON-serialized record:
//!
//! - `clubs`: club_id → Club
//! - `club_memberships`: membership_id → ClubMembership
//! - `club_settings`: settings_id → ClubSettings
//! - `club_events`: event_id → ClubEvent
//! - `years`: code → Year
//! - `departments`: code → Department
//! - `audit_events`: `timestamp|event_id` → AuditEvent
//!
//! redb allows a single writer at a time, so every multi-step write performed
//! inside [`ClubDatabase::write`] is atomic with respect to other writers.

use std::path::Path;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, Table, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const CLUBS: TableDefinition<&str, &[u8]> = TableDefinition::new("clubs");

pub(crate) const MEMBERSHIPS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("club_memberships");

pub(crate) const CLUB_SETTINGS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("club_settings");

pub(crate) const CLUB_EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("club_events");

pub(crate) const YEARS: TableDefinition<&str, &[u8]> = TableDefinition::new("years");

pub(crate) const DEPARTMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("departments");

pub(crate) const AUDIT_EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("audit_events");

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

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("You are already a member of this club")]
    AlreadyMember,

    #[error("You are not a member of this club")]
    NotAMember,

    #[error("Membership is not pending approval")]
    NotPending,

    #[error("exactly one target must be selected, got {0}")]
    AmbiguousBulkTarget(usize),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Record Helpers
// =============================================================================

/// Read and deserialize a single record.
pub(crate) fn load<T, R>(table: &R, key: &str) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Deserialize every record of a table, in key order.
pub(crate) fn load_all<T, R>(table: &R) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

/// Serialize and insert (or overwrite) a record.
pub(crate) fn put<T: Serialize>(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    key: &str,
    record: &T,
) -> StoreResult<()> {
    let json = serde_json::to_vec(record)?;
    table.insert(key, json.as_slice())?;
    Ok(())
}

// =============================================================================
// ClubDatabase
// =============================================================================

/// Embedded ACID store for all club entities.
pub struct ClubDatabase {
    db: Database,
}

impl ClubDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLUBS)?;
            let _ = write_txn.open_table(MEMBERSHIPS)?;
            let _ = write_txn.open_table(CLUB_SETTINGS)?;
            let _ = write_txn.open_table(CLUB_EVENTS)?;
            let _ = write_txn.open_table(YEARS)?;
            let _ = write_txn.open_table(DEPARTMENTS)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Run `f` inside a read transaction.
    pub fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&ReadTransaction) -> StoreResult<T>,
    {
        let read_txn = self.db.begin_read()?;
        f(&read_txn)
    }

    /// Run `f` inside a write transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; on error it is
    /// dropped and every change made by `f` is discarded.
    pub fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&WriteTransaction) -> StoreResult<T>,
    {
        let write_txn = self.db.begin_write()?;
        let value = f(&write_txn)?;
        write_txn.commit()?;
        Ok(value)
    }

    /// Verify that the database can serve a read.
    pub fn health_check(&self) -> StoreResult<()> {
        self.read(|txn| {
            let table = txn.open_table(CLUBS)?;
            let _ = table.first()?;
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        name: String,
    }

    fn temp_db() -> (ClubDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = ClubDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn put_and_load_roundtrip() {
        let (db, _dir) = temp_db();
        db.write(|txn| {
            let mut table = txn.open_table(YEARS)?;
            put(&mut table, "1", &Probe { name: "first".into() })
        })
        .unwrap();

        let loaded: Option<Probe> = db
            .read(|txn| load(&txn.open_table(YEARS)?, "1"))
            .unwrap();
        assert_eq!(loaded, Some(Probe { name: "first".into() }));
    }

    #[test]
    fn failed_write_is_rolled_back() {
        let (db, _dir) = temp_db();
        let result: StoreResult<()> = db.write(|txn| {
            let mut table = txn.open_table(YEARS)?;
            put(&mut table, "1", &Probe { name: "first".into() })?;
            Err(StoreError::Validation("abort".into()))
        });
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let all: Vec<Probe> = db.read(|txn| load_all(&txn.open_table(YEARS)?)).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn health_check_on_fresh_database() {
        let (db, _dir) = temp_db();
        assert!(db.health_check().is_ok());
    }
}
