// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ethere integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockRegistry`] - Mock blockchain registry that records calls and can
//!   be told to fail or stall at a given step
//! - [`TestHarness`] - Temp SQLite, usage limiter, coordinator and router

pub mod harness;
pub mod mock_registry;

pub use harness::{TEST_TOKEN, TestHarness, TestHarnessBuilder};
pub use mock_registry::{MockRegistry, RegistryCall, RegistryStep};
