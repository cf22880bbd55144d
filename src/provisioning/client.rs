// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for a remote generator.
//!
//! Seeds travel only in JSON request bodies. Error values carry status
//! codes and transport causes, never request or response bodies.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::GeneratorSettings;
use crate::hd::{AddressIndex, Seed};
use crate::models::{AddressResponse, GeneratedWalletResponse};

const BACKOFF_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum GeneratorClientError {
    #[error("generator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generator returned {0}")]
    Status(StatusCode),

    #[error("invalid generator URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GeneratorClientError {
    /// Whether the failure left the outcome unknown (timeout or no
    /// connection), so an idempotent call may be repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status(_) | Self::Url(_) => false,
        }
    }
}

#[derive(Serialize)]
struct DeriveAddressBody<'a> {
    seed: &'a str,
    index: AddressIndex,
}

#[derive(Debug, Clone)]
pub struct GeneratorClient {
    http: Client,
    wallet_url: Url,
    address_url: Url,
    max_attempts: u32,
}

impl GeneratorClient {
    pub fn new(settings: &GeneratorSettings) -> Result<Self, GeneratorClientError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        let mut base = settings.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            wallet_url: base.join("wallet")?,
            address_url: base.join("wallet/address")?,
            max_attempts: settings.max_attempts.max(1),
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `POST /wallet`. Exactly one attempt: a repeat could mint a second
    /// wallet, so callers decide whether to try again.
    pub async fn generate(&self) -> Result<GeneratedWalletResponse, GeneratorClientError> {
        let response = self.http.post(self.wallet_url.clone()).send().await?;
        if response.status() != StatusCode::CREATED {
            return Err(GeneratorClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// `POST /wallet/address`. Pure on the server side, so timeouts and
    /// connection failures are retried with a linear backoff.
    pub async fn derive_address(
        &self,
        seed: &Seed,
        index: AddressIndex,
    ) -> Result<AddressResponse, GeneratorClientError> {
        let seed_hex = seed.to_hex();
        let body = DeriveAddressBody {
            seed: seed_hex.as_str(),
            index,
        };

        let mut attempt = 1;
        loop {
            match self.post_derive(&body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, index = %index, error = %e, "Generator derive failed, retrying");
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_derive(
        &self,
        body: &DeriveAddressBody<'_>,
    ) -> Result<AddressResponse, GeneratorClientError> {
        let response = self
            .http
            .post(self.address_url.clone())
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeneratorClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}
