// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BIP-39 mnemonic generation and parsing.
//!
//! Wallets always use 128 bits of entropy, which encodes to 12 words from the
//! English wordlist (11 bits per word, the last 4 bits being a checksum).

use std::fmt;
use std::sync::Arc;

use bip39::Language;
use zeroize::Zeroizing;

use super::{EntropySource, HdError, HdResult, OsEntropy};

/// Bytes of entropy drawn per mnemonic (128 bits).
pub const ENTROPY_BYTES: usize = 16;

/// Words in a mnemonic built from [`ENTROPY_BYTES`] of entropy.
pub const WORD_COUNT: usize = 12;

/// A validated 12-word English BIP-39 phrase.
#[derive(Clone)]
pub struct Mnemonic {
    inner: bip39::Mnemonic,
}

impl Mnemonic {
    /// Encode raw entropy as a mnemonic.
    pub fn from_entropy(entropy: &[u8; ENTROPY_BYTES]) -> HdResult<Self> {
        let inner = bip39::Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| HdError::InvalidMnemonic(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parse externally supplied mnemonic text.
    ///
    /// Surrounding and repeated whitespace is ignored. The phrase must use the
    /// English wordlist, carry a valid checksum and have exactly
    /// [`WORD_COUNT`] words.
    pub fn parse(text: &str) -> HdResult<Self> {
        let normalized: Zeroizing<String> =
            Zeroizing::new(text.split_whitespace().collect::<Vec<_>>().join(" "));

        let words = normalized.split(' ').filter(|w| !w.is_empty()).count();
        if words != WORD_COUNT {
            return Err(HdError::InvalidMnemonic(format!(
                "expected {WORD_COUNT} words, got {words}"
            )));
        }

        let inner = bip39::Mnemonic::parse_in(Language::English, normalized.as_str())
            .map_err(|e| HdError::InvalidMnemonic(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The space-separated phrase.
    ///
    /// This is the wallet owner's recovery secret. It is returned exactly once,
    /// in the wallet creation response.
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.to_string())
    }

    /// Number of words in the phrase.
    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    pub(crate) fn to_seed(&self, passphrase: &str) -> [u8; 64] {
        self.inner.to_seed(passphrase)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words, <redacted>)", self.word_count())
    }
}

/// Produces fresh mnemonics from an [`EntropySource`].
#[derive(Clone)]
pub struct MnemonicGenerator {
    entropy: Arc<dyn EntropySource>,
}

impl MnemonicGenerator {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Draw 128 bits of entropy and encode them as a 12-word mnemonic.
    pub fn generate(&self) -> HdResult<Mnemonic> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        self.entropy.fill_bytes(entropy.as_mut())?;
        Mnemonic::from_entropy(&entropy)
    }
}

impl Default for MnemonicGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}
