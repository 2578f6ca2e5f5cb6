// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ethere serve` command implementation.
//!
//! Opens SQLite storage, builds the usage limiter and the agreement
//! coordinator (with the HTTP registry when notarization is enabled), and
//! serves the REST gateway until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ethere_agreement::AgreementCoordinator;
use ethere_config::model::EthereConfig;
use ethere_core::{EthereError, PluginAdapter, StorageAdapter};
use ethere_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig, start_server};
use ethere_notary::HttpRegistry;
use ethere_storage::SqliteStorage;
use ethere_usage::UsageLimiter;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `ethere serve` command.
pub async fn run_serve(config: EthereConfig) -> Result<(), EthereError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting ethere serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let limiter = Arc::new(UsageLimiter::new(storage.clone(), &config.usage));

    let mut coordinator = AgreementCoordinator::new(storage.clone(), limiter)
        .with_notarization_config(&config.notarization);
    if config.notarization.enabled {
        let registry = HttpRegistry::new(&config.notarization)?;
        info!(
            chain_id = config.notarization.chain_id,
            "server-side notarization enabled"
        );
        coordinator = coordinator.with_registry(Arc::new(registry));
    }

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; every API request will be rejected");
    }

    let state = GatewayState {
        coordinator: Arc::new(coordinator),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: Instant::now(),
            storage: Some(storage.clone()),
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        request_timeout: Duration::from_secs(config.gateway.request_timeout_secs),
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&server_config, state, cancel.clone().cancelled_owned()).await;

    if let Err(e) = storage.shutdown().await {
        error!(error = %e, "storage shutdown failed");
    }
    info!("ethere stopped");
    served
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ethere={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
