// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Ethere contract service.
//!
//! Exposes the agreement coordinator, the plan table and the usage limiter
//! as a JSON REST API. Every route except `/health` requires a bearer
//! token; errors are mapped from [`ethere_core::ErrorKind`] to HTTP status
//! codes in [`response`].

pub mod auth;
pub mod handlers;
pub mod response;
pub mod server;

pub use auth::AuthConfig;
pub use response::{ApiError, ApiResponse, ErrorResponse};
pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
