// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ethere contract service.

use strum::{Display, EnumString};
use thiserror::Error;

use crate::types::DailyLimit;

/// The primary error type used across all Ethere adapter traits and operations.
#[derive(Debug, Error)]
pub enum EthereError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An external collaborator (blockchain registry, relay) failed.
    #[error("upstream failure: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Referenced entity does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    /// Caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The contract already has a counterparty.
    #[error("contract already has a counterparty assigned")]
    AlreadyAssigned,

    /// The contract already carries notarization metadata.
    #[error("contract is already notarized")]
    AlreadyNotarized,

    /// Notarization requires both parties to have agreed.
    #[error("contract must be fully signed before notarization")]
    NotFullySigned,

    /// Content or state mutation on a locked contract.
    #[error("contract is locked: {0}")]
    Locked(String),

    /// Daily creation quota exhausted.
    #[error("daily limit reached: {used} of {limit} contracts used today")]
    QuotaExceeded { used: u32, limit: DailyLimit },

    /// Malformed or semantically invalid input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`EthereError`], used for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    AlreadyAssigned,
    AlreadyNotarized,
    NotFullySigned,
    Locked,
    QuotaExceeded,
    Validation,
    Upstream,
    Timeout,
    Internal,
}

impl EthereError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EthereError::NotFound { .. } => ErrorKind::NotFound,
            EthereError::Forbidden(_) => ErrorKind::Forbidden,
            EthereError::AlreadyAssigned => ErrorKind::AlreadyAssigned,
            EthereError::AlreadyNotarized => ErrorKind::AlreadyNotarized,
            EthereError::NotFullySigned => ErrorKind::NotFullySigned,
            EthereError::Locked(_) => ErrorKind::Locked,
            EthereError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            EthereError::Validation(_) => ErrorKind::Validation,
            EthereError::Upstream { .. } => ErrorKind::Upstream,
            EthereError::Timeout { .. } => ErrorKind::Timeout,
            EthereError::Config(_) | EthereError::Storage { .. } | EthereError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for a missing contract.
    pub fn contract_not_found(id: impl Into<String>) -> Self {
        EthereError::NotFound {
            entity: "contract",
            id: id.into(),
        }
    }
}
