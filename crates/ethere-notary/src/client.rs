// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the blockchain registry relay.
//!
//! The relay owns the wallet and chain RPC. This client only posts the three
//! registry calls and maps the receipts. No retries: a failed call surfaces
//! to the caller, which may retry the whole notarization.

use std::time::Duration;

use async_trait::async_trait;
use ethere_config::model::NotarizationConfig;
use ethere_core::{
    AdapterType, ChainReceipt, EthereError, HealthStatus, PluginAdapter, RegistryAdapter,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    contract_id: &'a str,
    content_hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    counterparty_address: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest<'a> {
    contract_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest<'a> {
    contract_id: &'a str,
    amount_eth: f64,
}

/// Receipt as sent by the relay; accepts camelCase or snake_case keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayReceipt {
    #[serde(alias = "tx_hash")]
    tx_hash: String,
    #[serde(default, alias = "cost_eth")]
    cost_eth: f64,
}

/// HTTP implementation of [`RegistryAdapter`].
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
    chain_id: i64,
    timeout: Duration,
}

impl HttpRegistry {
    /// Builds a client from the notarization section.
    ///
    /// Fails with `Config` when no registry URL is configured.
    pub fn new(config: &NotarizationConfig) -> Result<Self, EthereError> {
        let base_url = config
            .registry_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| EthereError::Config("notarization.registry_url is not set".into()))?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "x-api-key",
                HeaderValue::from_str(key).map_err(|e| {
                    EthereError::Config(format!("invalid registry API key header value: {e}"))
                })?,
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| EthereError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            chain_id: config.chain_id,
            timeout,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ChainReceipt, EthereError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        debug!(endpoint, status = %status, "registry response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = %status, body = %body, "registry call rejected");
            return Err(EthereError::Upstream {
                message: format!("registry {endpoint} returned {status}: {body}"),
                source: None,
            });
        }

        let receipt: RelayReceipt =
            response.json().await.map_err(|e| EthereError::Upstream {
                message: format!("failed to parse registry {endpoint} response: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(ChainReceipt {
            tx_hash: receipt.tx_hash,
            cost_eth: receipt.cost_eth,
        })
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> EthereError {
        if e.is_timeout() {
            warn!(endpoint, timeout = ?self.timeout, "registry call timed out");
            return EthereError::Timeout {
                duration: self.timeout,
            };
        }
        warn!(endpoint, error = %e, "registry call failed");
        EthereError::Upstream {
            message: format!("registry {endpoint} request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpRegistry {
    fn name(&self) -> &str {
        "http-registry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Registry
    }

    async fn health_check(&self) -> Result<HealthStatus, EthereError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "registry health returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("registry unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), EthereError> {
        Ok(())
    }
}

#[async_trait]
impl RegistryAdapter for HttpRegistry {
    fn chain_id(&self) -> i64 {
        self.chain_id
    }

    async fn register_contract(
        &self,
        contract_id: &str,
        content_hash: &str,
        counterparty_address: Option<&str>,
    ) -> Result<ChainReceipt, EthereError> {
        self.post(
            "register",
            &RegisterRequest {
                contract_id,
                content_hash,
                counterparty_address,
            },
        )
        .await
    }

    async fn sign_contract(&self, contract_id: &str) -> Result<ChainReceipt, EthereError> {
        self.post("sign", &SignRequest { contract_id }).await
    }

    async fn make_payment(
        &self,
        contract_id: &str,
        amount_eth: f64,
    ) -> Result<ChainReceipt, EthereError> {
        self.post(
            "pay",
            &PaymentRequest {
                contract_id,
                amount_eth,
            },
        )
        .await
    }
}
