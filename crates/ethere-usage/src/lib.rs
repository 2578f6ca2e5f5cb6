// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage limiting for contract creation.
//!
//! This crate provides:
//! - **Plans**: the daily allowance and feature list of each subscription plan
//! - **Limiter**: quota checks, the atomic usage charge handed to the contract
//!   store, and usage history

pub mod limiter;
pub mod plans;

pub use limiter::{UsageLimiter, usage_subject};
pub use plans::{PlanLimits, PlanTable};
