// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors raised by the derivation engine.

/// Derivation engine error.
#[derive(Debug, thiserror::Error)]
pub enum HdError {
    /// The entropy source could not produce random bytes.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    /// Externally supplied mnemonic text is not a valid 12-word phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Seed bytes have the wrong length or encoding.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Address index is not a non-hardened child number.
    #[error("invalid address index: {0}")]
    InvalidIndex(String),

    /// BIP-32 child key derivation failed.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

pub type HdResult<T> = Result<T, HdError>;
