// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet registry contract and record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hd::Seed;

/// The single (user → seed) association.
///
/// The seed never leaves the registry through an API response; the owner
/// receives the recoverable mnemonic once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Unique record identifier (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Root key material
    seed: Seed,
    /// When the wallet was provisioned
    pub created_at: DateTime<Utc>,
}

impl WalletRecord {
    pub fn new(user_id: impl Into<String>, seed: Seed) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            seed,
            created_at: Utc::now(),
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("wallet already exists for user {0}")]
    Conflict(String),

    #[error("no wallet for user {0}")]
    NotFound(String),

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

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry lock poisoned")]
    Poisoned,
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Per-user wallet storage.
///
/// Implementations must make `create` atomic with respect to concurrent
/// `create` calls for the same user, across every process sharing the
/// backing store.
pub trait WalletRegistry: Send + Sync {
    /// Store a new wallet for `user_id`, or fail with
    /// [`RegistryError::Conflict`] if one already exists.
    fn create(&self, user_id: &str, seed: Seed) -> RegistryResult<WalletRecord>;

    /// Look up the wallet of `user_id`, or fail with [`RegistryError::NotFound`].
    fn find(&self, user_id: &str) -> RegistryResult<WalletRecord>;
}
