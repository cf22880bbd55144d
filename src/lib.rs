// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational HD Wallet - Deterministic Wallet Provisioning
//!
//! Issues one BIP-39/BIP-32 wallet per user and derives Ethereum addresses
//! on demand along `m/44'/60'/0'/0/{index}`. Derived addresses are never
//! stored; only the 64-byte seed is.
//!
//! One binary serves two roles, picked by `SERVICE_ROLE`:
//!
//! - **generator**: stateless mnemonic generation and address derivation
//! - **registry**: the authenticated one-wallet-per-user service, deriving
//!   in-process or through a remote generator
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Caller identity (HS256 JWT)
//! - `hd` - Mnemonic, seed and address derivation
//! - `provisioning` - Wallet creation and lookup orchestration
//! - `storage` - Wallet registry (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod hd;
pub mod models;
pub mod provisioning;
pub mod state;
pub mod storage;
pub mod telemetry;
