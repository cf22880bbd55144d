// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process key material: mnemonic, seed and addresses.
//!
//! Backs the generator role's endpoints and the registry's local mode.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::hd::{
    Address, AddressDeriver, AddressIndex, DerivationPath, EntropySource, HdResult, Mnemonic,
    MnemonicGenerator, OsEntropy, Seed, SeedDeriver,
};

/// Output of one wallet generation.
pub struct GeneratedWallet {
    pub mnemonic: Mnemonic,
    pub seed: Seed,
    /// Address at index 0.
    pub address: Address,
}

/// Composes the pure derivation steps behind one handle.
#[derive(Clone)]
pub struct KeyMaterialGenerator {
    mnemonics: MnemonicGenerator,
    seeds: SeedDeriver,
    addresses: AddressDeriver,
}

impl KeyMaterialGenerator {
    pub fn new(entropy: Arc<dyn EntropySource>, passphrase: &str) -> Self {
        Self {
            mnemonics: MnemonicGenerator::new(entropy),
            seeds: SeedDeriver::new(passphrase),
            addresses: AddressDeriver,
        }
    }

    pub fn with_os_entropy(passphrase: &str) -> Self {
        Self::new(Arc::new(OsEntropy), passphrase)
    }

    /// Generate a fresh wallet and its index-0 address.
    pub fn generate(&self) -> HdResult<GeneratedWallet> {
        let mnemonic = self.mnemonics.generate()?;
        let seed = self.seeds.derive(&mnemonic);
        let address = self.address_at(&seed, AddressIndex::FIRST)?;
        Ok(GeneratedWallet {
            mnemonic,
            seed,
            address,
        })
    }

    pub fn seed_for(&self, mnemonic: &Mnemonic) -> Seed {
        self.seeds.derive(mnemonic)
    }

    pub fn address_at(&self, seed: &Seed, index: AddressIndex) -> HdResult<Address> {
        self.addresses
            .derive_address(seed, &DerivationPath::for_index(index))
    }

    /// Derive from caller-supplied mnemonic text.
    pub fn address_for_phrase(&self, phrase: &str, index: AddressIndex) -> HdResult<Address> {
        let phrase = Zeroizing::new(phrase.to_string());
        let mnemonic = Mnemonic::parse(&phrase)?;
        self.address_at(&self.seed_for(&mnemonic), index)
    }
}
