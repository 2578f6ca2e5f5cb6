// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use ethere_config::model::StorageConfig;
use ethere_core::traits::{ContractCheck, ContractTransition};
use ethere_core::{
    AdapterType, Contract, ContractStore, EthereError, HealthStatus, PlanId, PluginAdapter,
    StorageAdapter, Subscription, UsageCharge, UsageRecord, UsageStore, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already opened database.
    pub fn with_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::from(db),
        }
    }

    fn db(&self) -> Result<&Database, EthereError> {
        self.db.get().ok_or_else(|| EthereError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, EthereError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), EthereError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), EthereError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| EthereError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), EthereError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ContractStore for SqliteStorage {
    async fn create_contract(
        &self,
        contract: &Contract,
        charge: Option<UsageCharge>,
    ) -> Result<Option<u32>, EthereError> {
        queries::contracts::create_contract(self.db()?, contract, charge).await
    }

    async fn get_contract(&self, id: &str) -> Result<Option<Contract>, EthereError> {
        queries::contracts::get_contract(self.db()?, id).await
    }

    async fn list_contracts_for_user(&self, user: UserId) -> Result<Vec<Contract>, EthereError> {
        queries::contracts::list_for_user(self.db()?, user).await
    }

    async fn transition(
        &self,
        id: &str,
        transition: ContractTransition,
    ) -> Result<Contract, EthereError> {
        queries::contracts::transition(self.db()?, id, transition).await
    }

    async fn delete_contract(&self, id: &str, check: ContractCheck) -> Result<(), EthereError> {
        queries::contracts::delete_contract(self.db()?, id, check).await
    }
}

#[async_trait]
impl UsageStore for SqliteStorage {
    async fn ensure_subscription(
        &self,
        email: &str,
        default_plan: PlanId,
    ) -> Result<Subscription, EthereError> {
        queries::subscriptions::ensure(self.db()?, email, default_plan).await
    }

    async fn set_plan(&self, email: &str, plan: PlanId) -> Result<Subscription, EthereError> {
        queries::subscriptions::set_plan(self.db()?, email, plan).await
    }

    async fn usage_on(&self, subject: &str, date: &str) -> Result<u32, EthereError> {
        queries::usage::usage_on(self.db()?, subject, date).await
    }

    async fn increment_usage(&self, subject: &str, date: &str) -> Result<u32, EthereError> {
        queries::usage::increment(self.db()?, subject, date).await
    }

    async fn usage_history(
        &self,
        subject: &str,
        since: &str,
    ) -> Result<Vec<UsageRecord>, EthereError> {
        queries::usage::history(self.db()?, subject, since).await
    }
}
