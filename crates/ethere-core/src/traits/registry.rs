// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait for the external blockchain contract registry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EthereError;
use crate::traits::adapter::PluginAdapter;

/// Receipt returned by a registry call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainReceipt {
    /// Transaction hash of the submitted call.
    pub tx_hash: String,
    /// Gas cost of the call, in ETH.
    #[serde(default)]
    pub cost_eth: f64,
}

/// External registry that timestamps agreements and collects payment.
///
/// The service never performs chain RPC or signing itself; it only drives
/// these three calls in order.
#[async_trait]
pub trait RegistryAdapter: PluginAdapter {
    /// Chain the registry is deployed on.
    fn chain_id(&self) -> i64;

    async fn register_contract(
        &self,
        contract_id: &str,
        content_hash: &str,
        counterparty_address: Option<&str>,
    ) -> Result<ChainReceipt, EthereError>;

    async fn sign_contract(&self, contract_id: &str) -> Result<ChainReceipt, EthereError>;

    async fn make_payment(
        &self,
        contract_id: &str,
        amount_eth: f64,
    ) -> Result<ChainReceipt, EthereError>;
}
