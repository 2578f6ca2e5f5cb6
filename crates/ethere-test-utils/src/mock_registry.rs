// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock blockchain registry for deterministic testing.
//!
//! `MockRegistry` implements `RegistryAdapter` without any network access.
//! Every call is recorded; a failure or a delay can be injected at any step.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ethere_core::{
    AdapterType, ChainReceipt, EthereError, HealthStatus, PluginAdapter, RegistryAdapter,
};

/// Sepolia, the default notarization chain.
pub const MOCK_CHAIN_ID: i64 = 11_155_111;

/// Gas cost reported for the register and sign calls.
pub const MOCK_STEP_COST_ETH: f64 = 0.0001;

/// One of the three registry calls made during notarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStep {
    Register,
    Sign,
    Pay,
}

/// A recorded registry call.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryCall {
    Register {
        contract_id: String,
        content_hash: String,
        counterparty_address: Option<String>,
    },
    Sign {
        contract_id: String,
    },
    Pay {
        contract_id: String,
        amount_eth: f64,
    },
}

/// A mock registry returning deterministic receipts.
///
/// Transaction hashes are `0xregister-<id>`, `0xsign-<id>` and `0xpay-<id>`.
pub struct MockRegistry {
    calls: Mutex<Vec<RegistryCall>>,
    fail_at: Mutex<Option<RegistryStep>>,
    delay: Option<(RegistryStep, Duration)>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Mutex::new(None),
            delay: None,
        }
    }

    /// A registry whose `step` call fails with an upstream error.
    pub fn failing_at(step: RegistryStep) -> Self {
        Self {
            fail_at: Mutex::new(Some(step)),
            ..Self::new()
        }
    }

    /// Sleeps for `delay` before answering the `step` call.
    pub fn with_delay(mut self, step: RegistryStep, delay: Duration) -> Self {
        self.delay = Some((step, delay));
        self
    }

    /// Changes (or clears) the injected failure.
    pub async fn set_failure(&self, step: Option<RegistryStep>) {
        *self.fail_at.lock().await = step;
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().await.clone()
    }

    /// Amounts of every payment made so far.
    pub async fn payments(&self) -> Vec<f64> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RegistryCall::Pay { amount_eth, .. } => Some(*amount_eth),
                _ => None,
            })
            .collect()
    }

    async fn step(
        &self,
        step: RegistryStep,
        call: RegistryCall,
        tx_hash: String,
        cost_eth: f64,
    ) -> Result<ChainReceipt, EthereError> {
        if let Some((_, delay)) = self.delay.filter(|(delayed, _)| *delayed == step) {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().await.push(call);

        if *self.fail_at.lock().await == Some(step) {
            return Err(EthereError::Upstream {
                message: format!("mock registry failure at {step:?}"),
                source: None,
            });
        }
        Ok(ChainReceipt { tx_hash, cost_eth })
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockRegistry {
    fn name(&self) -> &str {
        "mock-registry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Registry
    }

    async fn health_check(&self) -> Result<HealthStatus, EthereError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), EthereError> {
        Ok(())
    }
}

#[async_trait]
impl RegistryAdapter for MockRegistry {
    fn chain_id(&self) -> i64 {
        MOCK_CHAIN_ID
    }

    async fn register_contract(
        &self,
        contract_id: &str,
        content_hash: &str,
        counterparty_address: Option<&str>,
    ) -> Result<ChainReceipt, EthereError> {
        let call = RegistryCall::Register {
            contract_id: contract_id.to_string(),
            content_hash: content_hash.to_string(),
            counterparty_address: counterparty_address.map(str::to_string),
        };
        self.step(
            RegistryStep::Register,
            call,
            format!("0xregister-{contract_id}"),
            MOCK_STEP_COST_ETH,
        )
        .await
    }

    async fn sign_contract(&self, contract_id: &str) -> Result<ChainReceipt, EthereError> {
        let call = RegistryCall::Sign {
            contract_id: contract_id.to_string(),
        };
        self.step(
            RegistryStep::Sign,
            call,
            format!("0xsign-{contract_id}"),
            MOCK_STEP_COST_ETH,
        )
        .await
    }

    async fn make_payment(
        &self,
        contract_id: &str,
        amount_eth: f64,
    ) -> Result<ChainReceipt, EthereError> {
        let call = RegistryCall::Pay {
            contract_id: contract_id.to_string(),
            amount_eth,
        };
        self.step(RegistryStep::Pay, call, format!("0xpay-{contract_id}"), 0.0)
            .await
    }
}
