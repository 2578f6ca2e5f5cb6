// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request bodies and the validated commands built from them.
//!
//! Every request field is optional at the serde level so that a missing or
//! malformed field surfaces as a [`EthereError::Validation`] with a readable
//! message instead of a deserializer error. Bodies are camelCase on the wire;
//! the snake_case spelling is accepted as an alias. Fields the coordinator
//! owns (`status`, the agreement flags) are never read from a request.

use ethere_core::{Clause, EthereError, NewContract, Notarization, UserId};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseInput {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Body of `POST /contracts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    #[serde(alias = "initiator_id")]
    pub initiator_id: Option<i64>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub clauses: Option<Vec<ClauseInput>>,
    pub suggestions: Option<Vec<String>>,
    #[serde(alias = "raw_text")]
    pub raw_text: Option<String>,
    #[serde(alias = "user_email")]
    pub user_email: Option<String>,
}

/// Body of `POST /contracts/{id}/invite`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    #[serde(alias = "counterparty_id")]
    pub counterparty_id: Option<i64>,
}

/// Body carrying only the acting user: accept, revoke, archive, delete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
}

/// Body of `PUT /contracts/{id}/update`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub clauses: Option<Vec<ClauseInput>>,
    #[serde(alias = "raw_text")]
    pub raw_text: Option<String>,
}

/// Body of `POST /contracts/{id}/blockchain-hash`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordNotarizationRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    #[serde(alias = "tx_hash")]
    pub tx_hash: Option<String>,
    #[serde(alias = "payment_tx_hash")]
    pub payment_tx_hash: Option<String>,
    #[serde(alias = "calculated_price")]
    pub calculated_price: Option<f64>,
    #[serde(alias = "chain_id")]
    pub chain_id: Option<i64>,
    #[serde(alias = "registration_cost_eth")]
    pub registration_cost_eth: Option<f64>,
}

/// Body of `POST /contracts/{id}/notarize`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotarizeRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    #[serde(alias = "counterparty_address")]
    pub counterparty_address: Option<String>,
}

// --- Validated commands ---

#[derive(Debug, Clone)]
pub struct CreateContract {
    pub contract: NewContract,
    /// Quota subject override; `user:<initiator>` is used when absent.
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteCounterparty {
    pub caller: UserId,
    pub counterparty: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyAction {
    pub caller: UserId,
}

/// Content edit. `None` leaves a field untouched; `raw_text: Some(None)`
/// clears the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateContent {
    pub caller: UserId,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub clauses: Option<Vec<Clause>>,
    pub raw_text: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordNotarization {
    pub caller: UserId,
    pub notarization: Notarization,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notarize {
    pub caller: UserId,
    pub counterparty_address: Option<String>,
}

impl TryFrom<CreateContractRequest> for CreateContract {
    type Error = EthereError;

    fn try_from(req: CreateContractRequest) -> Result<Self, Self::Error> {
        let initiator_id = positive_id("initiatorId", req.initiator_id)?;
        let title = required_text("title", req.title)?;
        let summary = required_text("summary", req.summary)?;
        let clauses = clauses(req.clauses.unwrap_or_default())?;
        let suggestions = req
            .suggestions
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();

        Ok(CreateContract {
            contract: NewContract {
                initiator_id,
                title,
                summary,
                clauses,
                suggestions,
                raw_text: non_blank(req.raw_text),
            },
            user_email: non_blank(req.user_email),
        })
    }
}

impl TryFrom<InviteRequest> for InviteCounterparty {
    type Error = EthereError;

    fn try_from(req: InviteRequest) -> Result<Self, Self::Error> {
        let caller = positive_id("userId", req.user_id)?;
        let counterparty = positive_id("counterpartyId", req.counterparty_id)?;
        if caller == counterparty {
            return Err(EthereError::Validation(
                "cannot invite yourself to your own contract".into(),
            ));
        }
        Ok(InviteCounterparty {
            caller,
            counterparty,
        })
    }
}

impl TryFrom<PartyRequest> for PartyAction {
    type Error = EthereError;

    fn try_from(req: PartyRequest) -> Result<Self, Self::Error> {
        Ok(PartyAction {
            caller: positive_id("userId", req.user_id)?,
        })
    }
}

impl TryFrom<UpdateContentRequest> for UpdateContent {
    type Error = EthereError;

    fn try_from(req: UpdateContentRequest) -> Result<Self, Self::Error> {
        let caller = positive_id("userId", req.user_id)?;
        if req.title.is_none()
            && req.summary.is_none()
            && req.clauses.is_none()
            && req.raw_text.is_none()
        {
            return Err(EthereError::Validation(
                "at least one of title, summary, clauses or rawText is required".into(),
            ));
        }

        let title = req
            .title
            .map(|t| required_text("title", Some(t)))
            .transpose()?;
        let summary = req
            .summary
            .map(|s| required_text("summary", Some(s)))
            .transpose()?;
        let clauses = req.clauses.map(clauses).transpose()?;

        Ok(UpdateContent {
            caller,
            title,
            summary,
            clauses,
            raw_text: req.raw_text.map(|raw| non_blank(Some(raw))),
        })
    }
}

impl TryFrom<RecordNotarizationRequest> for RecordNotarization {
    type Error = EthereError;

    fn try_from(req: RecordNotarizationRequest) -> Result<Self, Self::Error> {
        let caller = positive_id("userId", req.user_id)?;
        let tx_hash = required_text("txHash", req.tx_hash)?;
        let payment_tx_hash = required_text("paymentTxHash", req.payment_tx_hash)?;
        let calculated_price = non_negative("calculatedPrice", req.calculated_price)?;
        let registration_cost_eth =
            non_negative("registrationCostEth", req.registration_cost_eth)?;
        let chain_id = match req.chain_id {
            Some(id) if id > 0 => id,
            Some(_) => {
                return Err(EthereError::Validation(
                    "chainId must be a positive integer".into(),
                ));
            }
            None => return Err(EthereError::Validation("chainId is required".into())),
        };

        Ok(RecordNotarization {
            caller,
            notarization: Notarization {
                tx_hash: tx_hash.trim().to_string(),
                payment_tx_hash: payment_tx_hash.trim().to_string(),
                calculated_price,
                chain_id,
                registration_cost_eth,
            },
        })
    }
}

impl TryFrom<NotarizeRequest> for Notarize {
    type Error = EthereError;

    fn try_from(req: NotarizeRequest) -> Result<Self, Self::Error> {
        Ok(Notarize {
            caller: positive_id("userId", req.user_id)?,
            counterparty_address: non_blank(req.counterparty_address)
                .map(|a| a.trim().to_string()),
        })
    }
}

/// Parses a user id path or body value.
pub fn positive_id(field: &str, value: Option<i64>) -> Result<UserId, EthereError> {
    match value {
        Some(id) if id > 0 => Ok(UserId(id)),
        Some(_) => Err(EthereError::Validation(format!(
            "{field} must be a positive integer"
        ))),
        None => Err(EthereError::Validation(format!("{field} is required"))),
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, EthereError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(EthereError::Validation(format!("{field} must not be empty"))),
        None => Err(EthereError::Validation(format!("{field} is required"))),
    }
}

fn non_negative(field: &str, value: Option<f64>) -> Result<f64, EthereError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(_) => Err(EthereError::Validation(format!(
            "{field} must be a non-negative number"
        ))),
        None => Err(EthereError::Validation(format!("{field} is required"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn clauses(input: Vec<ClauseInput>) -> Result<Vec<Clause>, EthereError> {
    input
        .into_iter()
        .enumerate()
        .map(|(i, clause)| {
            Ok::<_, EthereError>(Clause {
                title: required_text(&format!("clauses[{i}].title"), clause.title)?,
                body: required_text(&format!("clauses[{i}].body"), clause.body)?,
            })
        })
        .collect()
}
