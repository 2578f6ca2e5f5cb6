// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./ethere.toml` > `~/.config/ethere/ethere.toml` >
//! `/etc/ethere/ethere.toml`, with `ETHERE_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::EthereConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ethere/ethere.toml";

/// Config sections that `ETHERE_<SECTION>_<KEY>` variables may target.
const ENV_SECTIONS: &[&str] = &["service", "gateway", "storage", "usage", "notarization"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ethere/ethere.toml`
/// 3. `~/.config/ethere/ethere.toml`
/// 4. `./ethere.toml`
/// 5. `ETHERE_*` environment variables
pub fn load_config() -> Result<EthereConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<EthereConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EthereConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EthereConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EthereConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EthereConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ethere/ethere.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ethere.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `ETHERE_NOTARIZATION_UNIT_RATE_ETH`
/// must become `notarization.unit_rate_eth`, not `notarization.unit.rate.eth`.
fn env_provider() -> Env {
    Env::prefixed("ETHERE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
