// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user wallet endpoints.
//!
//! Both endpoints act on the caller's own wallet, resolved from the
//! authentication token. There is no way to address another user's wallet.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    hd::AddressIndex,
    models::{CreateWalletResponse, IndexQuery},
    state::RegistryState,
};

/// Provision the caller's wallet.
///
/// Returns the recovery mnemonic exactly once. A second call fails with 409.
#[utoipa::path(
    post,
    path = "/users/wallet",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Wallet created", body = CreateWalletResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "The caller already has a wallet"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_wallet(
    Auth(user): Auth,
    State(state): State<RegistryState>,
) -> Result<(StatusCode, Json<CreateWalletResponse>), ApiError> {
    let created = state.provisioning.create_wallet(&user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateWalletResponse {
            id: created.id,
            user_id: created.user_id,
            seed: created.mnemonic.to_string(),
            index: AddressIndex::FIRST.value(),
            address: created.address.into(),
        }),
    ))
}

/// Derive one of the caller's addresses.
///
/// Responds with the bare address string.
#[utoipa::path(
    get,
    path = "/users/wallet",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(IndexQuery),
    responses(
        (status = 200, description = "Derived address", body = String),
        (status = 400, description = "Missing or malformed index"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "The caller has no wallet yet"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_address(
    Auth(user): Auth,
    State(state): State<RegistryState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<String>, ApiError> {
    let index = query.index.unwrap_or_default();
    let address = state
        .provisioning
        .get_address(&user.user_id, &index)
        .await?;
    Ok(Json(address.into()))
}
