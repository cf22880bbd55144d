// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local registry.
//!
//! The insert-if-vacant happens under a single write lock, so it is atomic
//! within one process. It gives no guarantee across service instances; use
//! [`super::RedbWalletRegistry`] for anything that must survive a restart.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{RegistryError, RegistryResult, WalletRecord, WalletRegistry};
use crate::hd::Seed;

#[derive(Default)]
pub struct InMemoryWalletRegistry {
    wallets: RwLock<HashMap<String, WalletRecord>>,
}

impl InMemoryWalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored wallets.
    pub fn len(&self) -> usize {
        self.wallets.read().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WalletRegistry for InMemoryWalletRegistry {
    fn create(&self, user_id: &str, seed: Seed) -> RegistryResult<WalletRecord> {
        let mut wallets = self.wallets.write().map_err(|_| RegistryError::Poisoned)?;
        match wallets.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::Conflict(user_id.to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(WalletRecord::new(user_id, seed)).clone()),
        }
    }

    fn find(&self, user_id: &str) -> RegistryResult<WalletRecord> {
        let wallets = self.wallets.read().map_err(|_| RegistryError::Poisoned)?;
        wallets
            .get(user_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(user_id.to_string()))
    }
}
