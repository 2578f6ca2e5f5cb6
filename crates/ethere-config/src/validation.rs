// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid IP addresses, non-empty paths, and non-negative rates.

use crate::diagnostic::ConfigError;
use crate::model::EthereConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &EthereConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.port == 0 {
        fail("gateway.port must be non-zero".to_string());
    }

    if config.gateway.request_timeout_secs == 0 {
        fail("gateway.request_timeout_secs must be positive".to_string());
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.usage.history_days == 0 {
        fail("usage.history_days must be at least 1".to_string());
    }

    let notarization = &config.notarization;
    if !notarization.unit_rate_eth.is_finite() || notarization.unit_rate_eth < 0.0 {
        fail(format!(
            "notarization.unit_rate_eth must be non-negative, got {}",
            notarization.unit_rate_eth
        ));
    }

    if !notarization.minimum_price_eth.is_finite() || notarization.minimum_price_eth < 0.0 {
        fail(format!(
            "notarization.minimum_price_eth must be non-negative, got {}",
            notarization.minimum_price_eth
        ));
    }

    if notarization.timeout_secs == 0 {
        fail("notarization.timeout_secs must be positive".to_string());
    }

    if notarization.enabled {
        let budget = notarization.timeout_secs.saturating_mul(3);
        if config.gateway.request_timeout_secs <= budget {
            fail(format!(
                "gateway.request_timeout_secs ({}) must exceed three registry calls of \
                 notarization.timeout_secs ({budget}s in total)",
                config.gateway.request_timeout_secs
            ));
        }

        match notarization.registry_url.as_deref().map(str::trim) {
            None | Some("") => {
                fail("notarization.registry_url is required when notarization is enabled".to_string())
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => fail(
                format!("notarization.registry_url `{url}` must be an http(s) URL"),
            ),
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
