// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The agreement coordinator.
//!
//! `AgreementCoordinator` is the single entry point for contract lifecycle
//! operations. It takes already-validated commands carrying an explicit
//! caller, runs the quota gate before creation, and hands every state change
//! to the store as a [`ContractTransition`](ethere_core::ContractTransition)
//! so the guard check and the write happen atomically against the current
//! row.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ethere_config::model::NotarizationConfig;
use ethere_core::{
    Contract, ContractStore, DailyLimit, EthereError, Notarization, RegistryAdapter,
    TransitionOutcome, UserId,
};
use ethere_notary::{PriceSchedule, content_hash, word_count};
use ethere_usage::{UsageLimiter, usage_subject};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::command::{
    CreateContract, InviteCounterparty, Notarize, PartyAction, RecordNotarization, UpdateContent,
};
use crate::rules;

/// Default bound on a single registry call.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Usage figures returned alongside a newly created contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub used: u32,
    pub limit: DailyLimit,
}

#[derive(Debug, Clone)]
pub struct CreatedContract {
    pub contract: Contract,
    pub usage: UsageSnapshot,
}

/// Orchestrates the contract store, the usage limiter and the optional
/// blockchain registry.
pub struct AgreementCoordinator {
    store: Arc<dyn ContractStore>,
    limiter: Arc<UsageLimiter>,
    registry: Option<Arc<dyn RegistryAdapter>>,
    prices: PriceSchedule,
    registry_timeout: Duration,
    notarizing: Arc<Mutex<HashSet<String>>>,
}

/// Marks a contract as having a notarization in flight until dropped.
struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.ids.lock() {
            ids.remove(&self.id);
        }
    }
}

impl AgreementCoordinator {
    pub fn new(store: Arc<dyn ContractStore>, limiter: Arc<UsageLimiter>) -> Self {
        Self {
            store,
            limiter,
            registry: None,
            prices: PriceSchedule::default(),
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
            notarizing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Enables server-side notarization through `registry`.
    pub fn with_registry(mut self, registry: Arc<dyn RegistryAdapter>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_pricing(mut self, prices: PriceSchedule) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_registry_timeout(mut self, timeout: Duration) -> Self {
        self.registry_timeout = timeout;
        self
    }

    /// Applies pricing and the registry timeout from configuration.
    pub fn with_notarization_config(self, config: &NotarizationConfig) -> Self {
        self.with_pricing(PriceSchedule::from_config(config))
            .with_registry_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn limiter(&self) -> &UsageLimiter {
        &self.limiter
    }

    pub fn prices(&self) -> &PriceSchedule {
        &self.prices
    }

    pub fn notarization_enabled(&self) -> bool {
        self.registry.is_some()
    }

    /// Creates a draft contract, charging one unit of the creator's quota.
    ///
    /// The limiter rejects exhausted quotas up front; the store re-checks
    /// and increments in the insert transaction, so concurrent creates
    /// cannot both slip past a stale count.
    pub async fn create(&self, cmd: CreateContract) -> Result<CreatedContract, EthereError> {
        let subject = usage_subject(cmd.user_email.as_deref(), cmd.contract.initiator_id);
        let charge = self.limiter.charge_for(&subject).await?;
        let limit = charge.limit;

        let contract = Contract::draft(cmd.contract);
        let used = match self.store.create_contract(&contract, Some(charge)).await {
            Ok(used) => used.unwrap_or_default(),
            Err(e) => {
                if let EthereError::QuotaExceeded { used, limit } = &e {
                    warn!(subject = %subject, used, %limit, "daily contract limit reached at insert");
                }
                return Err(e);
            }
        };

        info!(
            contract_id = %contract.id,
            initiator = %contract.initiator_id,
            used,
            %limit,
            "contract created"
        );
        Ok(CreatedContract {
            contract,
            usage: UsageSnapshot { used, limit },
        })
    }

    pub async fn get(&self, id: &str) -> Result<Contract, EthereError> {
        self.store
            .get_contract(id)
            .await?
            .ok_or_else(|| EthereError::contract_not_found(id))
    }

    /// Contracts where `user` is either party, newest first.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Contract>, EthereError> {
        self.store.list_contracts_for_user(user).await
    }

    pub async fn invite(
        &self,
        id: &str,
        cmd: InviteCounterparty,
    ) -> Result<Contract, EthereError> {
        let contract = self
            .apply(id, move |c| rules::invite(c, cmd.caller, cmd.counterparty))
            .await?;
        info!(
            contract_id = id,
            caller = %cmd.caller,
            counterparty = %cmd.counterparty,
            status = %contract.status,
            "counterparty invited"
        );
        Ok(contract)
    }

    pub async fn accept(&self, id: &str, cmd: PartyAction) -> Result<Contract, EthereError> {
        let contract = self
            .apply(id, move |c| rules::accept(c, cmd.caller))
            .await?;
        info!(
            contract_id = id,
            caller = %cmd.caller,
            status = %contract.status,
            "agreement recorded"
        );
        Ok(contract)
    }

    pub async fn revoke(&self, id: &str, cmd: PartyAction) -> Result<Contract, EthereError> {
        let contract = self
            .apply(id, move |c| rules::revoke(c, cmd.caller))
            .await?;
        info!(
            contract_id = id,
            caller = %cmd.caller,
            status = %contract.status,
            "agreement revoked"
        );
        Ok(contract)
    }

    pub async fn update(&self, id: &str, cmd: UpdateContent) -> Result<Contract, EthereError> {
        let caller = cmd.caller;
        let contract = self
            .apply(id, move |c| rules::update_content(c, cmd))
            .await?;
        info!(contract_id = id, caller = %caller, "contract content updated");
        Ok(contract)
    }

    pub async fn archive(&self, id: &str, cmd: PartyAction) -> Result<Contract, EthereError> {
        let contract = self
            .apply(id, move |c| rules::archive(c, cmd.caller))
            .await?;
        info!(contract_id = id, caller = %cmd.caller, "contract archived");
        Ok(contract)
    }

    /// Owner deletion, outside the state machine.
    pub async fn delete(&self, id: &str, cmd: PartyAction) -> Result<(), EthereError> {
        let caller = cmd.caller;
        self.store
            .delete_contract(id, Box::new(move |c: &Contract| rules::check_delete(c, caller)))
            .await?;
        info!(contract_id = id, caller = %caller, "contract deleted");
        Ok(())
    }

    /// Writes notarization metadata produced by an external signer.
    pub async fn record_notarization(
        &self,
        id: &str,
        cmd: RecordNotarization,
    ) -> Result<Contract, EthereError> {
        let caller = cmd.caller;
        let tx_hash = cmd.notarization.tx_hash.clone();
        let contract = self
            .apply(id, move |c| {
                rules::record_notarization(c, cmd.caller, cmd.notarization)
            })
            .await?;
        info!(contract_id = id, caller = %caller, tx_hash = %tx_hash, "notarization recorded");
        Ok(contract)
    }

    /// Notarizes a fully signed contract through the configured registry.
    ///
    /// Register, sign and pay run in order, each bounded by the registry
    /// timeout. The metadata is written only after all three succeed. The
    /// sequence runs on its own task and keeps the contract claimed until it
    /// finishes, so a caller that stops waiting cannot leave it half done.
    pub async fn notarize(&self, id: &str, cmd: Notarize) -> Result<Contract, EthereError> {
        let registry = self
            .registry
            .clone()
            .ok_or_else(|| EthereError::Upstream {
                message: "notarization registry is not configured".into(),
                source: None,
            })?;
        let in_flight = self.claim(id)?;

        let contract = self.get(id).await?;
        rules::ensure_notarizable(&contract, cmd.caller)?;

        let text = contract.flattened_text();
        let words = word_count(&text);
        let run = NotarizationRun {
            store: self.store.clone(),
            registry,
            timeout: self.registry_timeout,
            id: id.to_string(),
            cmd,
            hash: content_hash(&text),
            price: self.prices.price_for_words(words),
        };
        info!(contract_id = id, words, price = run.price, "notarizing contract");

        let task = tokio::spawn(async move {
            let _in_flight = in_flight;
            run.execute().await
        });
        task.await
            .map_err(|e| EthereError::Internal(format!("notarization task failed: {e}")))?
    }

    async fn apply<F>(&self, id: &str, transition: F) -> Result<Contract, EthereError>
    where
        F: FnOnce(&mut Contract) -> Result<TransitionOutcome, EthereError> + Send + 'static,
    {
        self.store.transition(id, Box::new(transition)).await
    }

    fn claim(&self, id: &str) -> Result<InFlight, EthereError> {
        let mut ids = self
            .notarizing
            .lock()
            .map_err(|_| EthereError::Internal("notarization tracker poisoned".into()))?;
        if !ids.insert(id.to_string()) {
            return Err(EthereError::Locked(
                "notarization already in progress".into(),
            ));
        }
        Ok(InFlight {
            ids: self.notarizing.clone(),
            id: id.to_string(),
        })
    }
}

/// Registry calls and the metadata write for one notarization.
struct NotarizationRun {
    store: Arc<dyn ContractStore>,
    registry: Arc<dyn RegistryAdapter>,
    timeout: Duration,
    id: String,
    cmd: Notarize,
    hash: String,
    price: f64,
}

impl NotarizationRun {
    async fn execute(self) -> Result<Contract, EthereError> {
        let id = self.id.as_str();
        let registry = self.registry.as_ref();
        let registered = self
            .bounded(
                "register",
                registry.register_contract(id, &self.hash, self.cmd.counterparty_address.as_deref()),
            )
            .await?;
        let signed = self.bounded("sign", registry.sign_contract(id)).await?;
        let paid = self
            .bounded("pay", registry.make_payment(id, self.price))
            .await?;

        let notarization = Notarization {
            tx_hash: registered.tx_hash,
            payment_tx_hash: paid.tx_hash,
            calculated_price: self.price,
            chain_id: registry.chain_id(),
            registration_cost_eth: registered.cost_eth + signed.cost_eth,
        };
        let caller = self.cmd.caller;
        let recorded = notarization.clone();
        let result = self
            .store
            .transition(
                id,
                Box::new(move |c: &mut Contract| rules::record_notarization(c, caller, recorded)),
            )
            .await;

        match result {
            Ok(contract) => {
                info!(
                    contract_id = id,
                    caller = %caller,
                    tx_hash = %notarization.tx_hash,
                    "notarization recorded"
                );
                Ok(contract)
            }
            Err(e) => {
                error!(
                    contract_id = id,
                    tx_hash = %notarization.tx_hash,
                    payment_tx_hash = %notarization.payment_tx_hash,
                    error = %e,
                    "payment settled but notarization metadata was not recorded"
                );
                Err(e)
            }
        }
    }

    async fn bounded<T>(
        &self,
        step: &'static str,
        call: impl Future<Output = Result<T, EthereError>>,
    ) -> Result<T, EthereError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(step, error = %e, "registry call failed");
                Err(e)
            }
            Err(_) => {
                warn!(step, timeout = ?self.timeout, "registry call timed out");
                Err(EthereError::Timeout {
                    duration: self.timeout,
                })
            }
        }
    }
}
