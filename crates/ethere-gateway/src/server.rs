// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::Response,
    routing::{get, post, put},
    Router,
};
use ethere_agreement::AgreementCoordinator;
use ethere_core::{EthereError, PluginAdapter};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;
use crate::response::error_response;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Storage backend checked on every health request.
    pub storage: Option<Arc<dyn PluginAdapter>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub coordinator: Arc<AgreementCoordinator>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `GatewayConfig` from ethere-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Upper bound on a single request.
    pub request_timeout: Duration,
}

/// Builds the full application router.
///
/// - GET /health (public)
/// - /contracts, /plans, /subscriptions, /usage (bearer auth)
pub fn build_router(state: GatewayState, request_timeout: Duration) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/contracts", post(handlers::create_contract))
        .route(
            "/contracts/{id}",
            get(handlers::get_contract).delete(handlers::delete_contract),
        )
        .route("/contracts/user/{user_id}", get(handlers::list_user_contracts))
        .route("/contracts/{id}/invite", post(handlers::invite))
        .route("/contracts/{id}/accept", post(handlers::accept))
        .route("/contracts/{id}/revoke", post(handlers::revoke))
        .route("/contracts/{id}/update", put(handlers::update))
        .route(
            "/contracts/{id}/blockchain-hash",
            post(handlers::record_notarization),
        )
        .route("/contracts/{id}/notarize", post(handlers::notarize))
        .route("/contracts/{id}/archive", post(handlers::archive))
        .route("/plans", get(handlers::list_plans))
        .route(
            "/subscriptions/{email}",
            get(handlers::get_subscription).put(handlers::set_subscription),
        )
        .route("/usage/{email}", get(handlers::get_usage))
        .route("/usage/{email}/history", get(handlers::get_usage_history))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum_middleware::map_response(envelope_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn unknown_route() -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", "no such route")
}

async fn method_not_allowed() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "method not allowed for this route",
    )
}

/// The timeout layer answers with a bare 408; give it the failure envelope.
async fn envelope_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return error_response(StatusCode::REQUEST_TIMEOUT, "timeout", "request timed out");
    }
    response
}

/// Binds `host:port` and serves the gateway until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), EthereError> {
    let app = build_router(state, config.request_timeout);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EthereError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| EthereError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
