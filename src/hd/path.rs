// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BIP-44 derivation paths for Ethereum-style accounts.
//!
//! Every wallet uses `m/44'/60'/0'/0/{address_index}`. Only the last
//! component varies, and it is always non-hardened, so it must stay below
//! 2^31.

use std::fmt;
use std::str::FromStr;

use bip32::ChildNumber;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::{HdError, HdResult};

/// BIP-44 purpose (hardened).
pub const PURPOSE: u32 = 44;
/// SLIP-44 coin type for Ethereum (hardened).
pub const COIN_TYPE: u32 = 60;
/// Account (hardened).
pub const ACCOUNT: u32 = 0;
/// External chain.
pub const CHANGE: u32 = 0;

/// Index of one address inside a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AddressIndex(u32);

impl AddressIndex {
    /// Largest non-hardened child number.
    pub const MAX: u32 = ChildNumber::HARDENED_FLAG - 1;

    /// The address returned at wallet creation.
    pub const FIRST: Self = Self(0);

    pub fn new(value: u32) -> HdResult<Self> {
        if value > Self::MAX {
            return Err(HdError::InvalidIndex(format!(
                "{value} exceeds maximum {}",
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u64> for AddressIndex {
    type Error = HdError;

    fn try_from(value: u64) -> HdResult<Self> {
        let narrowed = u32::try_from(value).map_err(|_| {
            HdError::InvalidIndex(format!("{value} exceeds maximum {}", Self::MAX))
        })?;
        Self::new(narrowed)
    }
}

impl FromStr for AddressIndex {
    type Err = HdError;

    fn from_str(s: &str) -> HdResult<Self> {
        if s.is_empty() {
            return Err(HdError::InvalidIndex("index is required".to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HdError::InvalidIndex(format!(
                "{s:?} is not a non-negative integer"
            )));
        }
        let value: u64 = s.parse().map_err(|_| {
            HdError::InvalidIndex(format!("{s:?} exceeds maximum {}", Self::MAX))
        })?;
        Self::try_from(value)
    }
}

impl fmt::Display for AddressIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for AddressIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        Self::try_from(value).map_err(de::Error::custom)
    }
}

/// A full `m/44'/60'/0'/0/{i}` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    address_index: AddressIndex,
}

impl DerivationPath {
    pub fn for_index(address_index: AddressIndex) -> Self {
        Self { address_index }
    }

    pub fn address_index(&self) -> AddressIndex {
        self.address_index
    }

    /// Components from the master key down, with hardening applied.
    pub(crate) fn child_numbers(&self) -> HdResult<[ChildNumber; 5]> {
        let child = |index: u32, hardened: bool| {
            ChildNumber::new(index, hardened).map_err(|e| HdError::Derivation(e.to_string()))
        };
        Ok([
            child(PURPOSE, true)?,
            child(COIN_TYPE, true)?,
            child(ACCOUNT, true)?,
            child(CHANGE, false)?,
            child(self.address_index.value(), false)?,
        ])
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{PURPOSE}'/{COIN_TYPE}'/{ACCOUNT}'/{CHANGE}/{}",
            self.address_index
        )
    }
}
