// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BIP-39 seed derivation (PBKDF2-HMAC-SHA512, 2048 rounds).
//!
//! The passphrase is a process-wide pepper shared by the generator and the
//! registry. It is read once from configuration and never logged or sent.

use std::fmt;

use alloy::hex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use super::{HdError, HdResult, Mnemonic};

/// Seed length in bytes (512 bits).
pub const SEED_LEN: usize = 64;

/// Root key material of one wallet.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> HdResult<Self> {
        let array: [u8; SEED_LEN] = bytes.try_into().map_err(|_| {
            HdError::InvalidSeed(format!("expected {SEED_LEN} bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_bytes(array))
    }

    /// Decode a 128-character hex string (optional `0x` prefix).
    pub fn from_hex(text: &str) -> HdResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(text.trim()).map_err(|e| HdError::InvalidSeed(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

// Storage encoding only. API responses never carry a `Seed`.
impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Zeroizing::new(String::deserialize(deserializer)?);
        Seed::from_hex(&text).map_err(de::Error::custom)
    }
}

/// Stretches a mnemonic into a [`Seed`] using the configured passphrase.
#[derive(Clone)]
pub struct SeedDeriver {
    passphrase: Zeroizing<String>,
}

impl SeedDeriver {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    /// Deterministic: the same mnemonic and passphrase always give the same seed.
    pub fn derive(&self, mnemonic: &Mnemonic) -> Seed {
        Seed::from_bytes(mnemonic.to_seed(&self.passphrase))
    }
}

impl fmt::Debug for SeedDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedDeriver")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}
