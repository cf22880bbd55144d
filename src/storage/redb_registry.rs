// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable wallet registry backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallets`: user_id → serialized WalletRecord (JSON bytes)
//!
//! ## Atomicity
//!
//! redb admits one write transaction at a time. `create` inserts the record
//! and inspects the value the insert displaced; if there was one, the
//! transaction is aborted and nothing is written. The existence test and the
//! write are the same storage operation.

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

use super::{RegistryError, RegistryResult, WalletRecord, WalletRegistry};
use crate::hd::Seed;

/// File name of the registry database inside the data directory.
pub const REGISTRY_DB_FILE: &str = "wallets.redb";

/// user_id → serialized WalletRecord (JSON bytes).
const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

pub struct RedbWalletRegistry {
    db: Database,
}

impl RedbWalletRegistry {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> RegistryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open `wallets.redb` inside `data_dir`.
    pub fn open_in(data_dir: &Path) -> RegistryResult<Self> {
        Self::open(&data_dir.join(REGISTRY_DB_FILE))
    }
}

impl WalletRegistry for RedbWalletRegistry {
    fn create(&self, user_id: &str, seed: Seed) -> RegistryResult<WalletRecord> {
        let record = WalletRecord::new(user_id, seed);
        let json = serde_json::to_vec(&record)?;

        let write_txn = self.db.begin_write()?;
        let displaced = {
            let mut table = write_txn.open_table(WALLETS)?;
            let previous = table.insert(user_id, json.as_slice())?;
            previous.is_some()
        };

        if displaced {
            write_txn.abort()?;
            return Err(RegistryError::Conflict(user_id.to_string()));
        }

        write_txn.commit()?;
        Ok(record)
    }

    fn find(&self, user_id: &str) -> RegistryResult<WalletRecord> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(RegistryError::NotFound(user_id.to_string())),
        }
    }
}
