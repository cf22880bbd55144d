// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stateless key-material endpoints.
//!
//! Nothing here is stored. `POST /wallet` mints a wallet; the two lookup
//! endpoints re-derive an address from caller-supplied key material.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use zeroize::Zeroizing;

use crate::{
    error::ApiError,
    hd::{AddressIndex, Seed},
    models::{AddressResponse, DeriveAddressRequest, GeneratedWalletResponse, MnemonicAddressQuery},
    state::GeneratorState,
};

/// Generate a new wallet.
///
/// Returns the 12-word mnemonic and its index-0 address.
#[utoipa::path(
    post,
    path = "/wallet",
    tag = "Generator",
    responses(
        (status = 201, description = "Wallet generated", body = GeneratedWalletResponse),
        (status = 500, description = "Entropy or derivation failure")
    )
)]
pub async fn generate_wallet(
    State(state): State<GeneratorState>,
) -> Result<(StatusCode, Json<GeneratedWalletResponse>), ApiError> {
    let wallet = state.generator.generate()?;
    tracing::info!(address = %wallet.address, "Wallet generated");

    Ok((
        StatusCode::CREATED,
        Json(GeneratedWalletResponse {
            seed: wallet.mnemonic.phrase().to_string(),
            address: wallet.address.into(),
            index: AddressIndex::FIRST.value(),
        }),
    ))
}

/// Derive an address from mnemonic text.
///
/// Kept for older clients. The mnemonic travels in the query string, so
/// prefer `POST /wallet/address`.
#[utoipa::path(
    get,
    path = "/wallet",
    tag = "Generator",
    params(MnemonicAddressQuery),
    responses(
        (status = 200, description = "Address derived", body = AddressResponse),
        (status = 400, description = "Missing or malformed seed or index"),
        (status = 500, description = "Derivation failure")
    )
)]
pub async fn address_from_mnemonic(
    State(state): State<GeneratorState>,
    Query(query): Query<MnemonicAddressQuery>,
) -> Result<Json<AddressResponse>, ApiError> {
    let index: AddressIndex = query.index.as_deref().unwrap_or_default().parse()?;
    let phrase = Zeroizing::new(
        query
            .seed
            .ok_or_else(|| ApiError::bad_request("seed is required"))?,
    );

    let address = state.generator.address_for_phrase(&phrase, index)?;
    Ok(Json(AddressResponse {
        address: address.into(),
        index: index.value(),
    }))
}

/// Derive an address from a hex-encoded 64-byte seed.
#[utoipa::path(
    post,
    path = "/wallet/address",
    tag = "Generator",
    request_body = DeriveAddressRequest,
    responses(
        (status = 200, description = "Address derived", body = AddressResponse),
        (status = 400, description = "Malformed seed or index"),
        (status = 500, description = "Derivation failure")
    )
)]
pub async fn address_from_seed(
    State(state): State<GeneratorState>,
    body: Result<Json<DeriveAddressRequest>, JsonRejection>,
) -> Result<Json<AddressResponse>, ApiError> {
    // Rejection text can echo the body, which holds the seed.
    let Json(request) = body.map_err(|_| ApiError::bad_request("invalid request body"))?;
    let seed_hex = Zeroizing::new(request.seed);
    let seed = Seed::from_hex(&seed_hex)?;

    let address = state.generator.address_at(&seed, request.index)?;
    Ok(Json(AddressResponse {
        address: address.into(),
        index: request.index.value(),
    }))
}
