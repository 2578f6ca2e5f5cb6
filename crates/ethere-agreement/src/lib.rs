// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract agreement state machine for Ethere.
//!
//! - [`command`] turns request bodies into validated, typed commands.
//! - [`rules`] holds the pure transition functions and their guards.
//! - [`coordinator`] runs those transitions against storage, the usage
//!   limiter and the notarization registry.

pub mod command;
pub mod coordinator;
pub mod rules;

pub use command::{
    CreateContract, CreateContractRequest, InviteCounterparty, InviteRequest, Notarize,
    NotarizeRequest, PartyAction, PartyRequest, RecordNotarization, RecordNotarizationRequest,
    UpdateContent, UpdateContentRequest, positive_id,
};
pub use coordinator::{AgreementCoordinator, CreatedContract, UsageSnapshot};
