// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Seed + path → Ethereum address.
//!
//! Ethereum addresses are derived by:
//! 1. BIP-32 master key from the 64-byte seed (`HMAC-SHA512("Bitcoin seed", seed)`)
//! 2. Child key derivation down `m/44'/60'/0'/0/{i}`
//! 3. Uncompressed secp256k1 public key (65 bytes: 0x04 || x || y)
//! 4. keccak256 of the 64 coordinate bytes, last 20 bytes
//! 5. EIP-55 checksummed hex with `0x` prefix (42 characters)

use std::fmt;

use alloy::primitives::Address as EvmAddress;
use bip32::XPrv;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DerivationPath, HdError, HdResult, Seed};

/// EIP-55 checksummed Ethereum address (`0x` + 40 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Validate address text received from another component and normalize
    /// it to its checksummed form.
    pub fn parse(text: &str) -> HdResult<Self> {
        let has_shape = text.len() == 42
            && text.starts_with("0x")
            && text[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !has_shape {
            return Err(HdError::Derivation(format!("malformed address {text:?}")));
        }
        let parsed: EvmAddress = text
            .parse()
            .map_err(|e| HdError::Derivation(format!("malformed address {text:?}: {e}")))?;
        Ok(Self(parsed.to_checksum(None)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Pure address derivation. Identical inputs always give identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressDeriver;

impl AddressDeriver {
    pub fn derive_address(&self, seed: &Seed, path: &DerivationPath) -> HdResult<Address> {
        let mut key =
            XPrv::new(seed.as_bytes()).map_err(|e| HdError::Derivation(e.to_string()))?;
        for child in path.child_numbers()? {
            key = key
                .derive_child(child)
                .map_err(|e| HdError::Derivation(format!("{path}: {e}")))?;
        }

        let public_key = key.private_key().verifying_key().to_encoded_point(false);
        let address = EvmAddress::from_raw_public_key(&public_key.as_bytes()[1..]);

        Ok(Address(address.to_checksum(None)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::hd::mnemonic::tests::ABANDON_ABOUT;
    use crate::hd::{AddressIndex, Mnemonic, MnemonicGenerator, OsEntropy, SeedDeriver};

    fn abandon_seed() -> Seed {
        SeedDeriver::new("").derive(&Mnemonic::parse(ABANDON_ABOUT).unwrap())
    }

    fn path(index: u32) -> DerivationPath {
        DerivationPath::for_index(AddressIndex::new(index).unwrap())
    }

    fn is_evm_address(text: &str) -> bool {
        text.len() == 42
            && text.starts_with("0x")
            && text[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn matches_well_known_first_address() {
        let address = AddressDeriver.derive_address(&abandon_seed(), &path(0)).unwrap();
        assert_eq!(
            address.as_str(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
    }

    #[test]
    fn parse_normalizes_case() {
        let parsed = Address::parse("0x9858effd232b4033e47d90003d41ec34ecaeda94").unwrap();
        assert_eq!(parsed.as_str(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("9858effd232b4033e47d90003d41ec34ecaeda9400").is_err());
    }

    #[test]
    fn output_is_checksummed_hex() {
        let address = AddressDeriver.derive_address(&abandon_seed(), &path(9)).unwrap();
        assert!(is_evm_address(address.as_str()));
    }

    #[test]
    fn derivation_is_deterministic() {
        let seed = abandon_seed();
        let first = AddressDeriver.derive_address(&seed, &path(5)).unwrap();
        for _ in 0..5 {
            assert_eq!(AddressDeriver.derive_address(&seed, &path(5)).unwrap(), first);
        }
    }

    #[test]
    fn distinct_indices_give_distinct_addresses() {
        let seed = abandon_seed();
        let mut seen = HashSet::new();
        for index in 0..1000 {
            let address = AddressDeriver.derive_address(&seed, &path(index)).unwrap();
            assert!(seen.insert(address), "collision at index {index}");
        }
    }

    #[test]
    fn largest_index_is_derivable() {
        let address = AddressDeriver
            .derive_address(&abandon_seed(), &path(AddressIndex::MAX))
            .unwrap();
        assert!(is_evm_address(address.as_str()));
    }

    #[test]
    fn independent_seeds_give_distinct_first_addresses() {
        let generator = MnemonicGenerator::new(Arc::new(OsEntropy));
        let deriver = SeedDeriver::new("pepper");
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let seed = deriver.derive(&generator.generate().unwrap());
            assert!(seen.insert(AddressDeriver.derive_address(&seed, &path(0)).unwrap()));
        }
    }
}
