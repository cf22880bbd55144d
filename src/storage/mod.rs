// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Registry Storage
//!
//! The registry is the only stateful part of the system: one record per user,
//! holding that user's seed. Records are written once and never updated or
//! deleted.
//!
//! ## Implementations
//!
//! - [`RedbWalletRegistry`] - embedded ACID database, used in production
//! - [`InMemoryWalletRegistry`] - process-local map for tests and development
//!
//! ## One Wallet Per User
//!
//! `create` is a single conditional write. Neither implementation checks for
//! an existing record and then writes in a separate step; two racing creates
//! for the same user always resolve to exactly one success and one
//! [`RegistryError::Conflict`].

pub mod memory;
pub mod redb_registry;
pub mod registry;

pub use memory::InMemoryWalletRegistry;
pub use redb_registry::RedbWalletRegistry;
pub use registry::{RegistryError, RegistryResult, WalletRecord, WalletRegistry};
