// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the Ethere service.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

/// Timestamp format used for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time rendered with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC calendar day (`YYYY-MM-DD`), the key for daily usage counters.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Integer reference to a user owned by the external auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Registry,
}

// --- Contract lifecycle ---

/// Lifecycle status of a contract.
///
/// Always derived from the assignment state and the two agreement flags via
/// [`ContractStatus::derive`]; never taken from client input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// No counterparty bound yet.
    Draft,
    /// Counterparty bound, counterparty has not agreed.
    PendingCounterparty,
    /// Counterparty agreed, initiator has not.
    PendingAcceptance,
    /// Both parties agreed. Content is immutable.
    FullySigned,
    /// Withdrawn by the initiator.
    Archived,
}

impl ContractStatus {
    /// Computes the status implied by the assignment state and agreement flags.
    pub fn derive(
        counterparty: Option<UserId>,
        initiator_agreed: bool,
        counterparty_agreed: bool,
        archived: bool,
    ) -> Self {
        if archived {
            return ContractStatus::Archived;
        }
        match counterparty {
            None => ContractStatus::Draft,
            Some(_) if initiator_agreed && counterparty_agreed => ContractStatus::FullySigned,
            Some(_) if counterparty_agreed => ContractStatus::PendingAcceptance,
            Some(_) => ContractStatus::PendingCounterparty,
        }
    }
}

/// Which side of a contract a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PartyRole {
    Initiator,
    Counterparty,
}

/// A single titled clause of contract content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub title: String,
    pub body: String,
}

/// Fields required to open a new draft contract.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub initiator_id: UserId,
    pub title: String,
    pub summary: String,
    pub clauses: Vec<Clause>,
    pub suggestions: Vec<String>,
    pub raw_text: Option<String>,
}

/// Notarization metadata written once the agreement is recorded on chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notarization {
    pub tx_hash: String,
    pub payment_tx_hash: String,
    pub calculated_price: f64,
    pub chain_id: i64,
    pub registration_cost_eth: f64,
}

/// The central contract record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub initiator_id: UserId,
    pub counterparty_id: Option<UserId>,
    pub title: String,
    pub summary: String,
    pub clauses: Vec<Clause>,
    pub suggestions: Vec<String>,
    pub raw_text: Option<String>,
    pub initiator_agreed: bool,
    pub counterparty_agreed: bool,
    pub status: ContractStatus,
    pub blockchain_hash: Option<String>,
    pub payment_tx_hash: Option<String>,
    pub calculated_price: Option<f64>,
    pub chain_id: Option<i64>,
    pub registration_cost_eth: Option<f64>,
    pub archived_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Contract {
    /// Builds a fresh draft: new id, no counterparty, both flags false.
    pub fn draft(new: NewContract) -> Self {
        let now = now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            initiator_id: new.initiator_id,
            counterparty_id: None,
            title: new.title,
            summary: new.summary,
            clauses: new.clauses,
            suggestions: new.suggestions,
            raw_text: new.raw_text,
            initiator_agreed: false,
            counterparty_agreed: false,
            status: ContractStatus::Draft,
            blockchain_hash: None,
            payment_tx_hash: None,
            calculated_price: None,
            chain_id: None,
            registration_cost_eth: None,
            archived_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Re-derives `status` from the flags and assignment state.
    pub fn recompute_status(&mut self) {
        self.status = ContractStatus::derive(
            self.counterparty_id,
            self.initiator_agreed,
            self.counterparty_agreed,
            self.archived_at.is_some(),
        );
    }

    /// Role of `user` on this contract, if any.
    pub fn role_of(&self, user: UserId) -> Option<PartyRole> {
        if self.initiator_id == user {
            Some(PartyRole::Initiator)
        } else if self.counterparty_id == Some(user) {
            Some(PartyRole::Counterparty)
        } else {
            None
        }
    }

    /// Whether content edits are currently allowed.
    pub fn can_edit(&self) -> bool {
        !matches!(
            self.status,
            ContractStatus::FullySigned | ContractStatus::Archived
        )
    }

    pub fn is_notarized(&self) -> bool {
        self.blockchain_hash.is_some()
    }

    /// Current notarization metadata, if all fields are present.
    pub fn notarization(&self) -> Option<Notarization> {
        Some(Notarization {
            tx_hash: self.blockchain_hash.clone()?,
            payment_tx_hash: self.payment_tx_hash.clone()?,
            calculated_price: self.calculated_price?,
            chain_id: self.chain_id?,
            registration_cost_eth: self.registration_cost_eth?,
        })
    }

    /// Plain-text rendering used for pricing and content hashing.
    ///
    /// `raw_text` wins when it has content; otherwise clauses are rendered as
    /// `title\nbody` blocks separated by blank lines.
    pub fn flattened_text(&self) -> String {
        match self.raw_text.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.to_string(),
            _ => self
                .clauses
                .iter()
                .map(|c| format!("{}\n{}", c.title, c.body))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

// --- Subscription and usage ---

/// Subscription plan identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Free,
    Standard,
    Creator,
}

/// Daily contract-creation allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyLimit {
    Limited(u32),
    Unlimited,
}

impl DailyLimit {
    /// Whether `used` contracts today still leave room for one more.
    pub fn allows(&self, used: u32) -> bool {
        match self {
            DailyLimit::Limited(max) => used < *max,
            DailyLimit::Unlimited => true,
        }
    }
}

impl fmt::Display for DailyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DailyLimit::Limited(n) => write!(f, "{n}"),
            DailyLimit::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl Serialize for DailyLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DailyLimit::Limited(n) => serializer.serialize_u32(*n),
            DailyLimit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// Result of a quota lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub can_create: bool,
    pub used: u32,
    pub limit: DailyLimit,
    pub plan_id: PlanId,
}

/// Quota gate handed to the store so the re-check, insert and increment
/// happen in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageCharge {
    /// Usage subject (email or `user:<id>`).
    pub subject: String,
    /// Calendar day the usage is counted against.
    pub date: String,
    pub limit: DailyLimit,
}

/// A user's subscription row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_email: String,
    pub plan_id: PlanId,
    pub status: String,
    pub current_period_start: String,
    pub current_period_end: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-subject, per-day creation counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_email: String,
    pub date: String,
    pub contracts_created: u32,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn sample() -> Contract {
        Contract::draft(NewContract {
            initiator_id: UserId(1),
            title: "NDA".into(),
            summary: "Mutual non-disclosure".into(),
            clauses: vec![
                Clause {
                    title: "C1".into(),
                    body: "Keep it secret".into(),
                },
                Clause {
                    title: "C2".into(),
                    body: "Keep it safe".into(),
                },
            ],
            suggestions: vec![],
            raw_text: None,
        })
    }

    #[test]
    fn derive_covers_every_flag_combination() {
        let cp = Some(UserId(2));
        assert_eq!(ContractStatus::derive(None, false, false, false), ContractStatus::Draft);
        assert_eq!(ContractStatus::derive(None, true, false, false), ContractStatus::Draft);
        assert_eq!(
            ContractStatus::derive(cp, false, false, false),
            ContractStatus::PendingCounterparty
        );
        assert_eq!(
            ContractStatus::derive(cp, true, false, false),
            ContractStatus::PendingCounterparty
        );
        assert_eq!(
            ContractStatus::derive(cp, false, true, false),
            ContractStatus::PendingAcceptance
        );
        assert_eq!(
            ContractStatus::derive(cp, true, true, false),
            ContractStatus::FullySigned
        );
        assert_eq!(ContractStatus::derive(cp, true, true, true), ContractStatus::Archived);
    }

    #[test]
    fn status_strings_are_snake_case() {
        assert_eq!(ContractStatus::FullySigned.to_string(), "fully_signed");
        assert_eq!(
            ContractStatus::from_str("pending_counterparty").unwrap(),
            ContractStatus::PendingCounterparty
        );
        let json = serde_json::to_string(&ContractStatus::PendingAcceptance).unwrap();
        assert_eq!(json, "\"pending_acceptance\"");
    }

    #[test]
    fn draft_starts_unassigned_and_unsigned() {
        let c = sample();
        assert_eq!(c.status, ContractStatus::Draft);
        assert!(c.counterparty_id.is_none());
        assert!(!c.initiator_agreed && !c.counterparty_agreed);
        assert!(c.can_edit());
        assert!(uuid::Uuid::parse_str(&c.id).is_ok());
    }

    #[test]
    fn role_of_identifies_parties() {
        let mut c = sample();
        c.counterparty_id = Some(UserId(2));
        assert_eq!(c.role_of(UserId(1)), Some(PartyRole::Initiator));
        assert_eq!(c.role_of(UserId(2)), Some(PartyRole::Counterparty));
        assert_eq!(c.role_of(UserId(3)), None);
    }

    #[test]
    fn flattened_text_prefers_raw_text() {
        let mut c = sample();
        assert_eq!(c.flattened_text(), "C1\nKeep it secret\n\nC2\nKeep it safe");
        c.raw_text = Some("   ".into());
        assert_eq!(c.flattened_text(), "C1\nKeep it secret\n\nC2\nKeep it safe");
        c.raw_text = Some("the full text".into());
        assert_eq!(c.flattened_text(), "the full text");
    }

    #[test]
    fn notarization_requires_every_field() {
        let mut c = sample();
        assert!(c.notarization().is_none());
        c.blockchain_hash = Some("0xabc".into());
        assert!(c.notarization().is_none());
        c.payment_tx_hash = Some("0xdef".into());
        c.calculated_price = Some(0.01);
        c.chain_id = Some(11155111);
        c.registration_cost_eth = Some(0.0002);
        let n = c.notarization().unwrap();
        assert_eq!(n.tx_hash, "0xabc");
        assert!(c.is_notarized());
    }

    #[test]
    fn daily_limit_serializes_as_number_or_word() {
        assert_eq!(serde_json::to_string(&DailyLimit::Limited(10)).unwrap(), "10");
        assert_eq!(
            serde_json::to_string(&DailyLimit::Unlimited).unwrap(),
            "\"unlimited\""
        );
        assert!(DailyLimit::Limited(1).allows(0));
        assert!(!DailyLimit::Limited(1).allows(1));
        assert!(DailyLimit::Unlimited.allows(u32::MAX));
    }

    #[test]
    fn quota_status_uses_camel_case_keys() {
        let q = QuotaStatus {
            can_create: true,
            used: 0,
            limit: DailyLimit::Limited(1),
            plan_id: PlanId::Free,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["canCreate"], true);
        assert_eq!(json["planId"], "free");
    }

    proptest! {
        #[test]
        fn derived_status_matches_flags(
            bound in any::<bool>(),
            init in any::<bool>(),
            cp in any::<bool>(),
            archived in any::<bool>(),
        ) {
            let counterparty = bound.then_some(UserId(2));
            let status = ContractStatus::derive(counterparty, init, cp, archived);

            prop_assert_eq!(status == ContractStatus::Archived, archived);
            prop_assert_eq!(
                status == ContractStatus::FullySigned,
                !archived && bound && init && cp
            );
            prop_assert_eq!(status == ContractStatus::Draft, !archived && !bound);
            prop_assert_eq!(
                matches!(
                    status,
                    ContractStatus::PendingCounterparty | ContractStatus::PendingAcceptance
                ),
                !archived && bound && !(init && cp)
            );
        }
    }
}
