// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sources of random bytes for mnemonic generation.
//!
//! A predictable source lets anyone who can reproduce it recompute every
//! wallet, so production code must only ever use [`OsEntropy`].

use k256::elliptic_curve::rand_core::{OsRng, RngCore};

use super::{HdError, HdResult};

/// Supplier of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> HdResult<()>;
}

/// Operating-system CSPRNG (`getrandom`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> HdResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| HdError::Entropy(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill_bytes(&mut a).unwrap();
        OsEntropy.fill_bytes(&mut b).unwrap();

        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }
}
