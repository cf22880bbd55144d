// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Provisioning
//!
//! Orchestrates key generation, the wallet registry and address derivation.
//! Key material comes either from an in-process [`KeyMaterialGenerator`] or
//! from a remote generator over HTTP ([`GeneratorClient`]).

pub mod cache;
pub mod client;
pub mod generator;
pub mod service;

pub use cache::AddressCache;
pub use client::{GeneratorClient, GeneratorClientError};
pub use generator::{GeneratedWallet, KeyMaterialGenerator};
pub use service::{
    CreatedWallet, KeySource, KeySourceError, ProvisioningError, ProvisioningResult,
    WalletProvisioningService,
};
