// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack on a temp SQLite database:
//! storage, usage limiter, agreement coordinator and the axum router. The
//! `request()` helper drives the router in-process with a valid bearer token.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ethere_agreement::AgreementCoordinator;
use ethere_config::model::{StorageConfig, UsageConfig};
use ethere_core::{EthereError, StorageAdapter};
use ethere_gateway::{build_router, AuthConfig, GatewayState, HealthState};
use ethere_notary::PriceSchedule;
use ethere_storage::SqliteStorage;
use ethere_usage::UsageLimiter;
use serde_json::Value;
use tower::ServiceExt;

use crate::mock_registry::MockRegistry;

/// Bearer token accepted by harness routers.
pub const TEST_TOKEN: &str = "test-token";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    usage: UsageConfig,
    prices: PriceSchedule,
    registry: Option<MockRegistry>,
    registry_timeout: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            usage: UsageConfig::default(),
            prices: PriceSchedule {
                unit_rate_eth: 0.00001,
                minimum_price_eth: 0.0,
            },
            registry: None,
            registry_timeout: None,
        }
    }

    /// Override plan limits.
    pub fn with_usage(mut self, usage: UsageConfig) -> Self {
        self.usage = usage;
        self
    }

    /// Set the per-word notarization rate (no minimum price).
    pub fn with_unit_rate(mut self, unit_rate_eth: f64) -> Self {
        self.prices = PriceSchedule {
            unit_rate_eth,
            minimum_price_eth: 0.0,
        };
        self
    }

    /// Enable server-side notarization through `registry`.
    pub fn with_registry(mut self, registry: MockRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_registry_timeout(mut self, timeout: Duration) -> Self {
        self.registry_timeout = Some(timeout);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, EthereError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| EthereError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let limiter = Arc::new(UsageLimiter::new(storage.clone(), &self.usage));
        let mut coordinator =
            AgreementCoordinator::new(storage.clone(), limiter.clone()).with_pricing(self.prices);
        if let Some(timeout) = self.registry_timeout {
            coordinator = coordinator.with_registry_timeout(timeout);
        }
        let registry = self.registry.map(Arc::new);
        if let Some(registry) = &registry {
            coordinator = coordinator.with_registry(registry.clone());
        }

        Ok(TestHarness {
            storage,
            limiter,
            coordinator: Arc::new(coordinator),
            registry,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock registry and temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub limiter: Arc<UsageLimiter>,
    pub coordinator: Arc<AgreementCoordinator>,
    /// The mock registry, when notarization is enabled.
    pub registry: Option<Arc<MockRegistry>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The gateway router wired to this harness, authenticated by [`TEST_TOKEN`].
    pub fn router(&self) -> Router {
        self.router_with_timeout(Duration::from_secs(30))
    }

    /// Like [`router`](Self::router) with a custom per-request timeout.
    pub fn router_with_timeout(&self, request_timeout: Duration) -> Router {
        let state = GatewayState {
            coordinator: self.coordinator.clone(),
            auth: AuthConfig {
                bearer_token: Some(TEST_TOKEN.to_string()),
            },
            health: HealthState {
                start_time: Instant::now(),
                storage: Some(self.storage.clone()),
            },
        };
        build_router(state, request_timeout)
    }

    /// Sends one authenticated request and returns the status and JSON body.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {TEST_TOKEN}"));
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid test request");

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_serves_health_and_plans() {
        let harness = TestHarness::builder().build().await.unwrap();

        let (status, body) = harness.request("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "healthy");
        assert_eq!(body["notarization"], false);

        let (status, body) = harness.request("GET", "/plans", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn harness_wires_registry() {
        let harness = TestHarness::builder()
            .with_registry(MockRegistry::new())
            .build()
            .await
            .unwrap();
        assert!(harness.coordinator.notarization_enabled());
        assert!(harness.registry.is_some());
    }
}
