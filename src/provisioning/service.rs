// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet creation and address lookup.
//!
//! ## Creation
//!
//! ```text
//! find(user) ──exists──▶ Conflict
//!     │ absent
//!     ▼
//! generate key material ──timeout/connect──▶ next attempt (re-runs find)
//!     │
//!     ▼
//! registry.create(user, seed) ──displaced──▶ Conflict (fresh seed dropped)
//!     │
//!     ▼
//! mnemonic + index-0 address returned once
//! ```
//!
//! ## Lookup
//!
//! Parse index → `find(user)` → derive. Results are cached per
//! `(user, index)`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::cache::AddressCache;
use super::client::{GeneratorClient, GeneratorClientError};
use super::generator::KeyMaterialGenerator;
use crate::config::GeneratorSettings;
use crate::hd::{
    Address, AddressDeriver, AddressIndex, DerivationPath, HdError, Mnemonic, Seed, SeedDeriver,
};
use crate::storage::{RegistryError, WalletRegistry};

const CREATE_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Closed set of outcomes callers must distinguish.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Entropy, derivation, storage or network failure. The message is for
    /// logs only.
    #[error("{0}")]
    Internal(String),
}

pub type ProvisioningResult<T> = Result<T, ProvisioningError>;

impl From<RegistryError> for ProvisioningError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Conflict(_) => Self::Conflict("wallet already exists".to_string()),
            RegistryError::NotFound(_) => Self::NotFound("wallet not found".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error(transparent)]
    Hd(#[from] HdError),

    #[error(transparent)]
    Generator(#[from] GeneratorClientError),

    #[error("generator address {remote} does not match locally derived {local}")]
    AddressMismatch { remote: Address, local: Address },

    #[error("generator answered for index {actual}, requested {requested}")]
    IndexMismatch { requested: AddressIndex, actual: u32 },
}

impl KeySourceError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Generator(e) if e.is_retryable())
    }
}

/// Freshly minted key material.
struct KeyMaterial {
    mnemonic: Zeroizing<String>,
    seed: Seed,
    address: Address,
}

/// Where mnemonics are generated and addresses derived.
pub enum KeySource {
    /// Everything in-process.
    Local(KeyMaterialGenerator),
    /// A remote generator. The seed is re-derived here from the returned
    /// mnemonic with the shared passphrase.
    Remote {
        client: GeneratorClient,
        seeds: SeedDeriver,
    },
}

impl KeySource {
    pub fn local(passphrase: &str) -> Self {
        Self::Local(KeyMaterialGenerator::with_os_entropy(passphrase))
    }

    pub fn remote(
        settings: &GeneratorSettings,
        passphrase: &str,
    ) -> Result<Self, GeneratorClientError> {
        Ok(Self::Remote {
            client: GeneratorClient::new(settings)?,
            seeds: SeedDeriver::new(passphrase),
        })
    }

    fn max_attempts(&self) -> u32 {
        match self {
            Self::Local(_) => 1,
            Self::Remote { client, .. } => client.max_attempts(),
        }
    }

    async fn generate(&self) -> Result<KeyMaterial, KeySourceError> {
        match self {
            Self::Local(generator) => {
                let wallet = generator.generate()?;
                Ok(KeyMaterial {
                    mnemonic: wallet.mnemonic.phrase(),
                    seed: wallet.seed,
                    address: wallet.address,
                })
            }
            Self::Remote { client, seeds } => {
                let response = client.generate().await?;
                let mnemonic = Zeroizing::new(response.seed);
                let seed = seeds.derive(&Mnemonic::parse(&mnemonic)?);

                let local = AddressDeriver
                    .derive_address(&seed, &DerivationPath::for_index(AddressIndex::FIRST))?;
                let remote = Address::parse(&response.address)?;
                if local != remote {
                    return Err(KeySourceError::AddressMismatch { remote, local });
                }

                Ok(KeyMaterial {
                    mnemonic,
                    seed,
                    address: local,
                })
            }
        }
    }

    async fn address_at(
        &self,
        seed: &Seed,
        index: AddressIndex,
    ) -> Result<Address, KeySourceError> {
        match self {
            Self::Local(generator) => Ok(generator.address_at(seed, index)?),
            Self::Remote { client, .. } => {
                let response = client.derive_address(seed, index).await?;
                if response.index != index.value() {
                    return Err(KeySourceError::IndexMismatch {
                        requested: index,
                        actual: response.index,
                    });
                }
                Ok(Address::parse(&response.address)?)
            }
        }
    }
}

/// Result of a successful creation. The only value that ever carries the
/// recovery phrase out of the service.
pub struct CreatedWallet {
    pub id: String,
    pub user_id: String,
    pub mnemonic: Zeroizing<String>,
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("mnemonic", &"<redacted>")
            .field("address", &self.address)
            .field("created_at", &self.created_at)
            .finish()
    }
}

pub struct WalletProvisioningService {
    registry: Arc<dyn WalletRegistry>,
    keys: KeySource,
    cache: AddressCache,
}

impl WalletProvisioningService {
    pub fn new(registry: Arc<dyn WalletRegistry>, keys: KeySource, cache_capacity: usize) -> Self {
        Self {
            registry,
            keys,
            cache: AddressCache::new(cache_capacity),
        }
    }

    /// Provision the single wallet of `user_id`.
    ///
    /// Fails with `Conflict` if the user already has one. Either the record
    /// is persisted and the phrase returned, or nothing is stored.
    pub async fn create_wallet(&self, user_id: &str) -> ProvisioningResult<CreatedWallet> {
        let user_id = require_user(user_id)?;
        let max_attempts = self.keys.max_attempts();

        let mut attempt = 1;
        let material = loop {
            match self.registry.find(user_id) {
                Ok(_) => {
                    return Err(ProvisioningError::Conflict(
                        "wallet already exists".to_string(),
                    ))
                }
                Err(RegistryError::NotFound(_)) => {}
                Err(e) => return Err(internal(user_id, "registry lookup failed", e)),
            }

            match self.keys.generate().await {
                Ok(material) => break material,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(user_id, attempt, error = %e, "Key generation failed, retrying");
                    tokio::time::sleep(CREATE_RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(internal(user_id, "key generation failed", e)),
            }
        };

        let record = match self.registry.create(user_id, material.seed) {
            Ok(record) => record,
            Err(RegistryError::Conflict(_)) => {
                tracing::info!(user_id, "Concurrent wallet creation lost the race");
                return Err(ProvisioningError::Conflict(
                    "wallet already exists".to_string(),
                ));
            }
            Err(e) => return Err(internal(user_id, "registry insert failed", e)),
        };

        self.cache.put(user_id, AddressIndex::FIRST, material.address.clone());
        tracing::info!(user_id, wallet_id = %record.id, address = %material.address, "Wallet created");

        Ok(CreatedWallet {
            id: record.id,
            user_id: record.user_id,
            mnemonic: material.mnemonic,
            address: material.address,
            created_at: record.created_at,
        })
    }

    /// Derive the caller's address at an index given as text.
    pub async fn get_address(&self, user_id: &str, index: &str) -> ProvisioningResult<Address> {
        let index: AddressIndex = index
            .parse()
            .map_err(|e: HdError| ProvisioningError::Validation(e.to_string()))?;
        self.address_at(user_id, index).await
    }

    /// Derive the caller's address at an already validated index.
    pub async fn address_at(
        &self,
        user_id: &str,
        index: AddressIndex,
    ) -> ProvisioningResult<Address> {
        let user_id = require_user(user_id)?;

        if let Some(address) = self.cache.get(user_id, index) {
            return Ok(address);
        }

        let record = match self.registry.find(user_id) {
            Ok(record) => record,
            Err(RegistryError::NotFound(_)) => {
                return Err(ProvisioningError::NotFound("wallet not found".to_string()))
            }
            Err(e) => return Err(internal(user_id, "registry lookup failed", e)),
        };

        let address = self
            .keys
            .address_at(record.seed(), index)
            .await
            .map_err(|e| internal(user_id, "address derivation failed", e))?;

        tracing::debug!(user_id, index = %index, "Address derived");
        self.cache.put(user_id, index, address.clone());
        Ok(address)
    }
}

fn internal(user_id: &str, context: &str, e: impl fmt::Display) -> ProvisioningError {
    tracing::error!(user_id, error = %e, "{context}");
    ProvisioningError::Internal(format!("{context}: {e}"))
}

fn require_user(user_id: &str) -> ProvisioningResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ProvisioningError::Validation("user id is required".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use url::Url;

    use super::*;
    use crate::api::generator_router;
    use crate::hd::mnemonic::tests::BrokenEntropy;
    use crate::hd::WORD_COUNT;
    use crate::state::GeneratorState;
    use crate::storage::{InMemoryWalletRegistry, RedbWalletRegistry};

    fn local_service() -> (Arc<InMemoryWalletRegistry>, WalletProvisioningService) {
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let service =
            WalletProvisioningService::new(registry.clone(), KeySource::local("pepper"), 100);
        (registry, service)
    }

    fn is_evm_address(text: &str) -> bool {
        text.len() == 42
            && text.starts_with("0x")
            && text[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    async fn spawn_generator(passphrase: &str) -> Url {
        let state = GeneratorState::new(KeyMaterialGenerator::with_os_entropy(passphrase));
        serve(generator_router(state)).await
    }

    fn remote_settings(base_url: Url) -> GeneratorSettings {
        GeneratorSettings {
            base_url,
            timeout: Duration::from_secs(5),
            max_attempts: 3,
        }
    }

    fn closed_port_url() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn create_then_lookup_scenario() {
        let (_, service) = local_service();

        let created = service.create_wallet("u1").await.unwrap();
        assert_eq!(created.user_id, "u1");
        assert_eq!(created.mnemonic.split_whitespace().count(), WORD_COUNT);
        assert!(is_evm_address(created.address.as_str()));

        let again = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(again, ProvisioningError::Conflict(_)));

        let first = service.get_address("u1", "0").await.unwrap();
        assert_eq!(first, created.address);

        let fifth = service.get_address("u1", "5").await.unwrap();
        assert_ne!(fifth, created.address);
        assert_eq!(service.get_address("u1", "5").await.unwrap(), fifth);

        let missing = service.get_address("u2", "0").await.unwrap_err();
        assert!(matches!(missing, ProvisioningError::NotFound(_)));
    }

    #[tokio::test]
    async fn creation_address_matches_mnemonic() {
        let (_, service) = local_service();
        let created = service.create_wallet("u1").await.unwrap();

        let rederived = KeyMaterialGenerator::with_os_entropy("pepper")
            .address_for_phrase(&created.mnemonic, AddressIndex::FIRST)
            .unwrap();
        assert_eq!(rederived, created.address);
    }

    #[tokio::test]
    async fn lookup_matches_uncached_derivation() {
        let (registry, service) = local_service();
        service.create_wallet("u1").await.unwrap();

        let via_service = service.get_address("u1", "9").await.unwrap();
        let record = registry.find("u1").unwrap();
        let direct = KeyMaterialGenerator::with_os_entropy("pepper")
            .address_at(record.seed(), AddressIndex::new(9).unwrap())
            .unwrap();
        assert_eq!(via_service, direct);
        assert_eq!(service.cache.len(), 2);
    }

    #[tokio::test]
    async fn invalid_index_is_validation_error() {
        let (_, service) = local_service();
        service.create_wallet("u1").await.unwrap();

        for bad in ["not-a-number", "", "-1", "1.5", "2147483648"] {
            let err = service.get_address("u1", bad).await.unwrap_err();
            assert!(matches!(err, ProvisioningError::Validation(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn validation_precedes_lookup() {
        let (_, service) = local_service();
        let err = service.get_address("nobody", "abc").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_user_id_is_rejected() {
        let (registry, service) = local_service();
        let err = service.create_wallet("  ").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn entropy_failure_stores_nothing() {
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let keys = KeySource::Local(KeyMaterialGenerator::new(Arc::new(BrokenEntropy), ""));
        let service = WalletProvisioningService::new(registry.clone(), keys, 10);

        let err = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Internal(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn independent_wallets_differ() {
        let (_, service) = local_service();
        let mut addresses = HashSet::new();
        for i in 0..10 {
            let created = service.create_wallet(&format!("user-{i}")).await.unwrap();
            addresses.insert(created.address);
        }
        assert_eq!(addresses.len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_creation_yields_exactly_one_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RedbWalletRegistry::open_in(dir.path()).unwrap());
        let service = Arc::new(WalletProvisioningService::new(
            registry.clone(),
            KeySource::local(""),
            10,
        ));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create_wallet("u1").await })
            })
            .collect();

        let mut created = Vec::new();
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(wallet) => created.push(wallet),
                Err(ProvisioningError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created.len(), 1);
        assert_eq!(conflicts, 49);

        let stored = registry.find("u1").unwrap();
        assert_eq!(stored.id, created[0].id);
        assert_eq!(
            service.get_address("u1", "0").await.unwrap(),
            created[0].address
        );
    }

    #[tokio::test]
    async fn remote_generator_end_to_end() {
        let base_url = spawn_generator("shared").await;
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let keys = KeySource::remote(&remote_settings(base_url), "shared").unwrap();
        let service = WalletProvisioningService::new(registry.clone(), keys, 0);

        let created = service.create_wallet("u1").await.unwrap();
        assert_eq!(created.mnemonic.split_whitespace().count(), WORD_COUNT);

        let local = KeyMaterialGenerator::with_os_entropy("shared");
        assert_eq!(
            local
                .address_for_phrase(&created.mnemonic, AddressIndex::FIRST)
                .unwrap(),
            created.address
        );

        assert_eq!(service.get_address("u1", "0").await.unwrap(), created.address);

        let seventh = service.get_address("u1", "7").await.unwrap();
        assert_eq!(
            local
                .address_for_phrase(&created.mnemonic, AddressIndex::new(7).unwrap())
                .unwrap(),
            seventh
        );

        let conflict = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(conflict, ProvisioningError::Conflict(_)));
    }

    #[tokio::test]
    async fn passphrase_mismatch_is_rejected() {
        let base_url = spawn_generator("generator-side").await;
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let keys = KeySource::remote(&remote_settings(base_url), "registry-side").unwrap();
        let service = WalletProvisioningService::new(registry.clone(), keys, 10);

        let err = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Internal(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn unreachable_generator_exhausts_attempts() {
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let keys = KeySource::remote(&remote_settings(closed_port_url()), "").unwrap();
        let service = WalletProvisioningService::new(registry.clone(), keys, 10);

        let err = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Internal(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn existing_wallet_is_conflict_before_contacting_generator() {
        let registry = Arc::new(InMemoryWalletRegistry::new());
        registry.create("u1", Seed::from_bytes([3u8; 64])).unwrap();
        let keys = KeySource::remote(&remote_settings(closed_port_url()), "").unwrap();
        let service = WalletProvisioningService::new(registry, keys, 10);

        let err = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Conflict(_)));
    }

    #[tokio::test]
    async fn timed_out_generation_rechecks_registry_before_retrying() {
        let registry = Arc::new(InMemoryWalletRegistry::new());
        let hits = Arc::new(AtomicUsize::new(0));

        // Another writer lands the wallet while the generator is still busy.
        let (counter, writer) = (hits.clone(), registry.clone());
        let app = Router::new().route(
            "/wallet",
            post(move || {
                let (counter, writer) = (counter.clone(), writer.clone());
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    writer.create("u1", Seed::from_bytes([5u8; 64])).unwrap();
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    StatusCode::CREATED
                }
            }),
        );
        let settings = GeneratorSettings {
            base_url: serve(app).await,
            timeout: Duration::from_millis(200),
            max_attempts: 3,
        };
        let keys = KeySource::remote(&settings, "").unwrap();
        let service = WalletProvisioningService::new(registry.clone(), keys, 10);

        let err = service.create_wallet("u1").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Conflict(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.find("u1").unwrap().seed(), &Seed::from_bytes([5u8; 64]));
    }

    #[tokio::test]
    async fn address_for_wrong_index_is_rejected_and_not_cached() {
        let app = Router::new().route(
            "/wallet/address",
            post(|| async {
                axum::Json(serde_json::json!({
                    "address": "0x1111111111111111111111111111111111111111",
                    "index": 99,
                }))
            }),
        );
        let registry = Arc::new(InMemoryWalletRegistry::new());
        registry.create("u1", Seed::from_bytes([3u8; 64])).unwrap();
        let keys = KeySource::remote(&remote_settings(serve(app).await), "").unwrap();
        let service = WalletProvisioningService::new(registry, keys, 10);

        let err = service.get_address("u1", "3").await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Internal(_)));
        assert!(service.cache.is_empty());
    }
}
