// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ethere contract service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Ethere configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EthereConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily creation limits per subscription plan.
    #[serde(default)]
    pub usage: UsageConfig,

    /// Blockchain registry and pricing settings.
    #[serde(default)]
    pub notarization: NotarizationConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "ethere".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on every API route. When unset, all
    /// authenticated routes are rejected.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Covers three registry calls at the default notarization timeout.
fn default_request_timeout_secs() -> u64 {
    120
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ethere").join("ethere.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ethere.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Daily contract-creation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UsageConfig {
    /// Contracts per day on the free plan.
    #[serde(default = "default_free_per_day")]
    pub free_per_day: u32,

    /// Contracts per day on the standard plan.
    #[serde(default = "default_standard_per_day")]
    pub standard_per_day: u32,

    /// Contracts per day on the creator plan. `None` means unlimited.
    #[serde(default)]
    pub creator_per_day: Option<u32>,

    /// Default window for usage history queries.
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            free_per_day: default_free_per_day(),
            standard_per_day: default_standard_per_day(),
            creator_per_day: None,
            history_days: default_history_days(),
        }
    }
}

fn default_free_per_day() -> u32 {
    1
}

fn default_standard_per_day() -> u32 {
    10
}

fn default_history_days() -> u32 {
    30
}

/// Blockchain notarization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotarizationConfig {
    /// Enables the server-side notarize endpoint.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the registry relay.
    #[serde(default)]
    pub registry_url: Option<String>,

    /// API key sent to the registry relay.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Price per word, in ETH.
    #[serde(default = "default_unit_rate_eth")]
    pub unit_rate_eth: f64,

    /// Floor applied to every computed price, in ETH.
    #[serde(default)]
    pub minimum_price_eth: f64,

    /// Chain the registry is deployed on.
    #[serde(default = "default_chain_id")]
    pub chain_id: i64,

    /// Timeout for each registry call.
    #[serde(default = "default_notarization_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotarizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            registry_url: None,
            api_key: None,
            unit_rate_eth: default_unit_rate_eth(),
            minimum_price_eth: 0.0,
            chain_id: default_chain_id(),
            timeout_secs: default_notarization_timeout_secs(),
        }
    }
}

/// 0.001 ETH per 100 words.
fn default_unit_rate_eth() -> f64 {
    0.00001
}

/// Sepolia.
fn default_chain_id() -> i64 {
    11_155_111
}

fn default_notarization_timeout_secs() -> u64 {
    30
}
