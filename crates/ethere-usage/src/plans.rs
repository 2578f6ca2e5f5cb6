// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription plan table.

use ethere_config::model::UsageConfig;
use ethere_core::{DailyLimit, PlanId};
use serde::Serialize;

const FREE_FEATURES: &[&str] = &[
    "Access to 1 free contract template",
    "Basic contract customization",
    "Community support",
    "Read-only marketplace access",
];

const STANDARD_FEATURES: &[&str] = &[
    "Up to 10 contracts per day",
    "Access to all marketplace templates",
    "Advanced customization tools",
    "Multi-party signature support",
    "Priority email support",
    "Blockchain verification",
    "Version history tracking",
];

const CREATOR_FEATURES: &[&str] = &[
    "Unlimited contract usage",
    "Create & submit custom templates",
    "Sell templates on marketplace",
    "70% revenue share on sales",
    "Featured creator badge",
    "Analytics dashboard",
    "24/7 priority support",
    "Early access to new features",
    "Custom branding options",
];

/// Public description of one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub plan_id: PlanId,
    pub contracts_per_day: DailyLimit,
    pub features: Vec<&'static str>,
}

/// Daily limits per plan, resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTable {
    free: DailyLimit,
    standard: DailyLimit,
    creator: DailyLimit,
}

impl PlanTable {
    pub fn from_config(config: &UsageConfig) -> Self {
        Self {
            free: DailyLimit::Limited(config.free_per_day),
            standard: DailyLimit::Limited(config.standard_per_day),
            creator: config
                .creator_per_day
                .map_or(DailyLimit::Unlimited, DailyLimit::Limited),
        }
    }

    /// Daily allowance for `plan`.
    pub fn limit_for(&self, plan: PlanId) -> DailyLimit {
        match plan {
            PlanId::Free => self.free,
            PlanId::Standard => self.standard,
            PlanId::Creator => self.creator,
        }
    }

    pub fn describe(&self, plan: PlanId) -> PlanLimits {
        let features = match plan {
            PlanId::Free => FREE_FEATURES,
            PlanId::Standard => STANDARD_FEATURES,
            PlanId::Creator => CREATOR_FEATURES,
        };
        PlanLimits {
            plan_id: plan,
            contracts_per_day: self.limit_for(plan),
            features: features.to_vec(),
        }
    }

    /// Every plan, cheapest first.
    pub fn all(&self) -> Vec<PlanLimits> {
        [PlanId::Free, PlanId::Standard, PlanId::Creator]
            .into_iter()
            .map(|plan| self.describe(plan))
            .collect()
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self::from_config(&UsageConfig::default())
    }
}
