// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::hd::HdError;
use crate::provisioning::ProvisioningError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Generic 500. Details belong in the server log, not the response.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(e: ProvisioningError) -> Self {
        match e {
            ProvisioningError::Validation(msg) => Self::bad_request(msg),
            ProvisioningError::Conflict(msg) => Self::conflict(msg),
            ProvisioningError::NotFound(msg) => Self::not_found(msg),
            // Already logged with context by the service.
            ProvisioningError::Internal(_) => Self::internal(),
        }
    }
}

/// Derivation errors on the stateless generator endpoints.
impl From<HdError> for ApiError {
    fn from(e: HdError) -> Self {
        match e {
            HdError::InvalidMnemonic(_) | HdError::InvalidSeed(_) | HdError::InvalidIndex(_) => {
                Self::bad_request(e.to_string())
            }
            HdError::Entropy(_) | HdError::Derivation(_) => {
                tracing::error!(error = %e, "Key derivation failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
