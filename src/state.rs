// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::config::Config;
use crate::provisioning::{
    GeneratorClientError, KeyMaterialGenerator, KeySource, WalletProvisioningService,
};
use crate::storage::{RedbWalletRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("JWT_KEY is required for the registry role")]
    MissingJwtKey,

    #[error("failed to open wallet registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to create data directory: {0}")]
    DataDir(#[from] std::io::Error),

    #[error("failed to build generator client: {0}")]
    GeneratorClient(#[from] GeneratorClientError),
}

/// State of the stateless generator role.
#[derive(Clone)]
pub struct GeneratorState {
    pub generator: Arc<KeyMaterialGenerator>,
}

impl GeneratorState {
    pub fn new(generator: KeyMaterialGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(KeyMaterialGenerator::with_os_entropy(&config.passphrase))
    }
}

/// State of the per-user registry role.
#[derive(Clone)]
pub struct RegistryState {
    pub provisioning: Arc<WalletProvisioningService>,
    pub auth: Arc<AuthConfig>,
}

impl RegistryState {
    pub fn new(provisioning: WalletProvisioningService, auth: AuthConfig) -> Self {
        Self {
            provisioning: Arc::new(provisioning),
            auth: Arc::new(auth),
        }
    }

    /// Open the redb registry under `DATA_DIR` and pick the key source.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let secret = config.jwt_secret.as_ref().ok_or(StateError::MissingJwtKey)?;

        std::fs::create_dir_all(&config.data_dir)?;
        let registry = Arc::new(RedbWalletRegistry::open_in(&config.data_dir)?);

        let keys = match &config.generator {
            Some(settings) => {
                tracing::info!(generator_url = %settings.base_url, "Using remote generator");
                KeySource::remote(settings, &config.passphrase)?
            }
            None => {
                tracing::info!("Deriving keys in-process");
                KeySource::local(&config.passphrase)
            }
        };

        let provisioning =
            WalletProvisioningService::new(registry, keys, config.address_cache_capacity);
        Ok(Self::new(provisioning, AuthConfig::hs256(secret.as_bytes())))
    }

    /// In-memory registry, local keys, and the test signing secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use crate::auth::extractor::tests::TEST_SECRET;
        use crate::storage::InMemoryWalletRegistry;

        let provisioning = WalletProvisioningService::new(
            Arc::new(InMemoryWalletRegistry::new()),
            KeySource::local(""),
            100,
        );
        Self::new(provisioning, AuthConfig::hs256(TEST_SECRET))
    }
}
