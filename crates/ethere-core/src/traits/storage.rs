// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the contract record.

use async_trait::async_trait;

use crate::error::EthereError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Contract, UsageCharge, UserId};

/// Whether a transition modified the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing changed; the store skips the write.
    Unchanged,
    /// The contract was modified and must be persisted.
    Changed,
}

/// A guarded mutation applied to the freshly read row inside the store's
/// write transaction. Returning `Err` aborts the transaction.
pub type ContractTransition =
    Box<dyn FnOnce(&mut Contract) -> Result<TransitionOutcome, EthereError> + Send + 'static>;

/// A read-only guard evaluated inside the store's write transaction.
pub type ContractCheck = Box<dyn FnOnce(&Contract) -> Result<(), EthereError> + Send + 'static>;

/// Lifecycle of a storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), EthereError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), EthereError>;
}

/// Persistence for contracts.
///
/// Every mutation goes through [`ContractStore::transition`], which reads,
/// mutates and writes the row in one atomic unit so concurrent callers never
/// work from a stale copy.
#[async_trait]
pub trait ContractStore: StorageAdapter {
    /// Inserts a new contract. When `charge` is given, today's usage is
    /// re-counted, checked against the limit, and incremented in the same
    /// transaction. Returns the usage count after the increment.
    async fn create_contract(
        &self,
        contract: &Contract,
        charge: Option<UsageCharge>,
    ) -> Result<Option<u32>, EthereError>;

    async fn get_contract(&self, id: &str) -> Result<Option<Contract>, EthereError>;

    /// Contracts where `user` is initiator or counterparty, newest first.
    async fn list_contracts_for_user(&self, user: UserId) -> Result<Vec<Contract>, EthereError>;

    /// Atomically applies `transition` to the current row and persists it.
    async fn transition(
        &self,
        id: &str,
        transition: ContractTransition,
    ) -> Result<Contract, EthereError>;

    /// Deletes the row if `check` passes against its current state.
    async fn delete_contract(&self, id: &str, check: ContractCheck) -> Result<(), EthereError>;
}
