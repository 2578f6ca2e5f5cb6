// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for subscriptions and daily usage counters.

use async_trait::async_trait;

use crate::error::EthereError;
use crate::traits::storage::StorageAdapter;
use crate::types::{PlanId, Subscription, UsageRecord};

/// Persistence consulted by the usage limiter.
#[async_trait]
pub trait UsageStore: StorageAdapter {
    /// Returns the subscription for `email`, creating one on `default_plan`
    /// if none exists.
    async fn ensure_subscription(
        &self,
        email: &str,
        default_plan: PlanId,
    ) -> Result<Subscription, EthereError>;

    /// Moves `email` to `plan`, creating the subscription if needed. Resets
    /// the billing period.
    async fn set_plan(&self, email: &str, plan: PlanId) -> Result<Subscription, EthereError>;

    /// Contracts created by `subject` on `date`.
    async fn usage_on(&self, subject: &str, date: &str) -> Result<u32, EthereError>;

    /// Increments the counter for `subject` on `date`; returns the new count.
    async fn increment_usage(&self, subject: &str, date: &str) -> Result<u32, EthereError>;

    /// Usage rows for `subject` on or after `since`, newest first.
    async fn usage_history(
        &self,
        subject: &str,
        since: &str,
    ) -> Result<Vec<UsageRecord>, EthereError>;
}
