// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for both service roles. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! Types that carry secret material (`seed`) deliberately do not derive
//! `Debug`, so they cannot end up in a log line by accident.
//!
//! ## Model Categories
//!
//! - **Generator**: stateless derivation endpoints (`/wallet`)
//! - **Registry**: per-user wallet endpoints (`/users/wallet`)

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::hd::AddressIndex;

// =============================================================================
// Generator Models
// =============================================================================

/// Freshly generated wallet.
///
/// `seed` is the 12-word mnemonic; the field keeps its historical name.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedWalletResponse {
    /// 12-word BIP-39 mnemonic. Shown once; the owner must back it up.
    pub seed: String,
    /// Address at index 0.
    pub address: String,
    /// Always 0.
    pub index: u32,
}

/// Address derived at a given index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    /// EIP-55 checksummed address.
    pub address: String,
    /// Index the address was derived at.
    pub index: u32,
}

/// Query for deriving an address from mnemonic text.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MnemonicAddressQuery {
    /// 12-word BIP-39 mnemonic.
    pub seed: Option<String>,
    /// Non-negative address index below 2^31.
    pub index: Option<String>,
}

/// Body for deriving an address from binary seed material.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeriveAddressRequest {
    /// 64-byte seed as 128 hex characters.
    pub seed: String,
    /// Non-negative address index below 2^31.
    #[schema(value_type = u32)]
    pub index: AddressIndex,
}

// =============================================================================
// Registry Models
// =============================================================================

/// Response after provisioning a user's wallet.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWalletResponse {
    /// Wallet record identifier.
    pub id: String,
    /// Owning user.
    #[serde(rename = "userID")]
    pub user_id: String,
    /// 12-word recovery mnemonic. This is the only time it is returned.
    pub seed: String,
    /// Always 0.
    pub index: u32,
    /// Address at index 0.
    pub address: String,
}

/// Query for looking up one of the caller's addresses.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndexQuery {
    /// Non-negative address index below 2^31.
    pub index: Option<String>,
}
