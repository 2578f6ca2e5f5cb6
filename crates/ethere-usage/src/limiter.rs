// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily contract-creation limiter.
//!
//! The limiter answers "may this subject create a contract today?" and hands
//! the contract store a [`UsageCharge`] so the final re-check, the insert and
//! the increment happen in one transaction. A subject without a subscription
//! is enrolled on the free plan on first lookup.

use std::sync::Arc;

use chrono::{Duration, Utc};
use ethere_config::model::UsageConfig;
use ethere_core::types::today;
use ethere_core::{
    EthereError, PlanId, QuotaStatus, Subscription, UsageCharge, UsageRecord, UsageStore, UserId,
};
use tracing::{debug, warn};

use crate::plans::PlanTable;

/// Usage subject for a creator: the email when known, else `user:<id>`.
pub fn usage_subject(email: Option<&str>, user: UserId) -> String {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => format!("user:{user}"),
    }
}

/// Quota gate over a [`UsageStore`].
pub struct UsageLimiter {
    store: Arc<dyn UsageStore>,
    plans: PlanTable,
    history_days: u32,
}

impl UsageLimiter {
    pub fn new(store: Arc<dyn UsageStore>, config: &UsageConfig) -> Self {
        Self {
            store,
            plans: PlanTable::from_config(config),
            history_days: config.history_days,
        }
    }

    pub fn plans(&self) -> &PlanTable {
        &self.plans
    }

    /// The subject's subscription, created on the free plan if missing.
    pub async fn subscription(&self, subject: &str) -> Result<Subscription, EthereError> {
        let subject = require_subject(subject)?;
        self.store.ensure_subscription(subject, PlanId::Free).await
    }

    /// Moves the subject to `plan`.
    pub async fn set_plan(&self, subject: &str, plan: PlanId) -> Result<Subscription, EthereError> {
        let subject = require_subject(subject)?;
        let subscription = self.store.set_plan(subject, plan).await?;
        debug!(subject, plan = %plan, "subscription plan changed");
        Ok(subscription)
    }

    /// Today's usage against the subject's plan.
    pub async fn check_quota(&self, subject: &str) -> Result<QuotaStatus, EthereError> {
        let subject = require_subject(subject)?;
        let subscription = self.store.ensure_subscription(subject, PlanId::Free).await?;
        let limit = self.plans.limit_for(subscription.plan_id);
        let used = self.store.usage_on(subject, &today()).await?;
        let can_create = limit.allows(used);

        if !can_create {
            warn!(subject, used, %limit, "daily contract limit reached");
        }

        Ok(QuotaStatus {
            can_create,
            used,
            limit,
            plan_id: subscription.plan_id,
        })
    }

    /// Checks the quota and returns the charge to apply atomically with the
    /// insert. Fails with `QuotaExceeded` when nothing is left today.
    pub async fn charge_for(&self, subject: &str) -> Result<UsageCharge, EthereError> {
        let subject = require_subject(subject)?;
        let status = self.check_quota(subject).await?;
        if !status.can_create {
            return Err(EthereError::QuotaExceeded {
                used: status.used,
                limit: status.limit,
            });
        }
        Ok(UsageCharge {
            subject: subject.to_string(),
            date: today(),
            limit: status.limit,
        })
    }

    /// Records one created contract for today without a limit check.
    pub async fn increment_usage(&self, subject: &str) -> Result<u32, EthereError> {
        let subject = require_subject(subject)?;
        self.store.increment_usage(subject, &today()).await
    }

    /// Daily rows for the last `days` days (configured default when `None`).
    pub async fn history(
        &self,
        subject: &str,
        days: Option<u32>,
    ) -> Result<Vec<UsageRecord>, EthereError> {
        let subject = require_subject(subject)?;
        let days = days.unwrap_or(self.history_days);
        let since = (Utc::now().date_naive() - Duration::days(i64::from(days)))
            .format("%Y-%m-%d")
            .to_string();
        self.store.usage_history(subject, &since).await
    }
}

fn require_subject(subject: &str) -> Result<&str, EthereError> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        return Err(EthereError::Validation("user email must not be empty".into()));
    }
    Ok(trimmed)
}
