// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//! [`Config::from_lookup`] takes any key → value function so parsing can be
//! tested without touching the process environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SERVICE_ROLE` | `generator` or `registry` | `registry` |
//! | `HOST` | Server bind IP (v4 or v6) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `WALLET_PASSWORD` | BIP-39 passphrase shared by both roles | empty |
//! | `GENERATOR_URL` | Generator base URL; unset means derive in-process | unset |
//! | `GENERATOR_TIMEOUT_MS` | Per-request timeout for generator calls | `5000` |
//! | `GENERATOR_MAX_ATTEMPTS` | Attempts for retryable generator calls | `3` |
//! | `DATA_DIR` | Directory holding `wallets.redb` | `/data` |
//! | `JWT_KEY` | HS256 secret for caller tokens | Required for `registry` |
//! | `ADDRESS_CACHE_CAPACITY` | Cached (user, index) → address entries | `10000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

pub const SERVICE_ROLE_ENV: &str = "SERVICE_ROLE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const WALLET_PASSWORD_ENV: &str = "WALLET_PASSWORD";
pub const GENERATOR_URL_ENV: &str = "GENERATOR_URL";
pub const GENERATOR_TIMEOUT_MS_ENV: &str = "GENERATOR_TIMEOUT_MS";
pub const GENERATOR_MAX_ATTEMPTS_ENV: &str = "GENERATOR_MAX_ATTEMPTS";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const JWT_KEY_ENV: &str = "JWT_KEY";
pub const ADDRESS_CACHE_CAPACITY_ENV: &str = "ADDRESS_CACHE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_GENERATOR_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_GENERATOR_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_ADDRESS_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Which half of the protocol this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Stateless key-material generator.
    Generator,
    /// Stateful per-user wallet registry.
    Registry,
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generator" => Ok(Self::Generator),
            "registry" | "users" => Ok(Self::Registry),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Where and how the registry reaches a remote generator.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub base_url: Url,
    pub timeout: Duration,
    pub max_attempts: u32,
}

#[derive(Clone)]
pub struct Config {
    pub role: ServiceRole,
    pub bind_addr: SocketAddr,
    pub passphrase: Zeroizing<String>,
    /// `None` derives keys in-process.
    pub generator: Option<GeneratorSettings>,
    pub data_dir: PathBuf,
    pub jwt_secret: Option<Zeroizing<String>>,
    pub address_cache_capacity: usize,
    pub log_format: LogFormat,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("role", &self.role)
            .field("bind_addr", &self.bind_addr)
            .field("passphrase", &"<redacted>")
            .field("generator", &self.generator)
            .field("data_dir", &self.data_dir)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("address_cache_capacity", &self.address_cache_capacity)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let role = parse_or(&get, SERVICE_ROLE_ENV, ServiceRole::Registry)?;

        let host: IpAddr = parse_or(&get, HOST_ENV, DEFAULT_HOST)?;
        let port: u16 = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = SocketAddr::new(host, port);

        let passphrase = Zeroizing::new(lookup(WALLET_PASSWORD_ENV).unwrap_or_default());

        let generator = match get(GENERATOR_URL_ENV) {
            Some(raw) => Some(GeneratorSettings {
                base_url: parse_generator_url(&raw)?,
                timeout: Duration::from_millis(parse_or(
                    &get,
                    GENERATOR_TIMEOUT_MS_ENV,
                    DEFAULT_GENERATOR_TIMEOUT_MS,
                )?),
                max_attempts: parse_or(
                    &get,
                    GENERATOR_MAX_ATTEMPTS_ENV,
                    DEFAULT_GENERATOR_MAX_ATTEMPTS,
                )?
                .max(1),
            }),
            None => None,
        };

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let jwt_secret = get(JWT_KEY_ENV).map(Zeroizing::new);
        if role == ServiceRole::Registry && jwt_secret.is_none() {
            return Err(ConfigError::Missing(JWT_KEY_ENV));
        }

        Ok(Self {
            role,
            bind_addr,
            passphrase,
            generator,
            data_dir,
            jwt_secret,
            address_cache_capacity: parse_or(
                &get,
                ADDRESS_CACHE_CAPACITY_ENV,
                DEFAULT_ADDRESS_CACHE_CAPACITY,
            )?,
            log_format: parse_or(&get, LOG_FORMAT_ENV, LogFormat::default())?,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        },
        None => Ok(default),
    }
}

/// Parse the generator base URL, making sure relative joins append to it.
fn parse_generator_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: GENERATOR_URL_ENV,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
