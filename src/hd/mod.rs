// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Hierarchical Deterministic Wallet Engine
//!
//! Everything in this module is pure and stateless apart from the entropy
//! source. It is safe to call from any number of concurrent requests without
//! locking.
//!
//! ## Pipeline
//!
//! ```text
//! EntropySource ──16 bytes──▶ MnemonicGenerator ──12 words──▶ SeedDeriver
//!                                                                │ 64 bytes
//!                                                                ▼
//!                       DerivationPath m/44'/60'/0'/0/{i} ──▶ AddressDeriver ──▶ 0x…
//! ```
//!
//! ## Secret Material
//!
//! [`Mnemonic`] and [`Seed`] redact themselves in `Debug` output and neither
//! implements `Display`. Seed bytes and every copy of the phrase handed out
//! are wrapped in `Zeroizing`.

pub mod address;
pub mod entropy;
pub mod error;
pub mod mnemonic;
pub mod path;
pub mod seed;

pub use address::{Address, AddressDeriver};
pub use entropy::{EntropySource, OsEntropy};
pub use error::{HdError, HdResult};
pub use mnemonic::{Mnemonic, MnemonicGenerator, ENTROPY_BYTES, WORD_COUNT};
pub use path::{AddressIndex, DerivationPath};
pub use seed::{Seed, SeedDeriver, SEED_LEN};
