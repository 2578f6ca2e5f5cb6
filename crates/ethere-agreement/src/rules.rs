// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure transition rules of the agreement state machine.
//!
//! Each rule checks its guards against the current row before touching it,
//! so a rejected transition leaves the contract exactly as it was. Rules run
//! inside the store's write transaction, which makes the read of the current
//! flags and the write of the new ones a single atomic step. `status` is
//! always re-derived here and never assigned directly.

use ethere_core::types::now_timestamp;
use ethere_core::{
    Contract, ContractStatus, EthereError, Notarization, PartyRole, TransitionOutcome, UserId,
};

use crate::command::UpdateContent;

use TransitionOutcome::{Changed, Unchanged};

fn ensure_open(contract: &Contract) -> Result<(), EthereError> {
    if contract.archived_at.is_some() || contract.status == ContractStatus::Archived {
        return Err(EthereError::Locked("contract is archived".into()));
    }
    Ok(())
}

fn require_party(contract: &Contract, caller: UserId) -> Result<PartyRole, EthereError> {
    contract.role_of(caller).ok_or_else(|| {
        EthereError::Forbidden(format!(
            "user {caller} is not a party to contract {}",
            contract.id
        ))
    })
}

fn require_initiator(contract: &Contract, caller: UserId, action: &str) -> Result<(), EthereError> {
    if contract.initiator_id != caller {
        return Err(EthereError::Forbidden(format!(
            "only the initiator may {action}"
        )));
    }
    Ok(())
}

fn own_flag(contract: &mut Contract, caller: UserId) -> Result<&mut bool, EthereError> {
    match require_party(contract, caller)? {
        PartyRole::Initiator => Ok(&mut contract.initiator_agreed),
        PartyRole::Counterparty => Ok(&mut contract.counterparty_agreed),
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Binds `target` as the counterparty of a draft contract.
pub fn invite(
    contract: &mut Contract,
    caller: UserId,
    target: UserId,
) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    require_initiator(contract, caller, "invite a counterparty")?;
    if target == contract.initiator_id {
        return Err(EthereError::Validation(
            "cannot invite yourself to your own contract".into(),
        ));
    }
    if contract.counterparty_id.is_some() {
        return Err(EthereError::AlreadyAssigned);
    }

    contract.counterparty_id = Some(target);
    contract.recompute_status();
    Ok(Changed)
}

/// Sets the caller's own agreement flag. Accepting twice is a no-op.
pub fn accept(contract: &mut Contract, caller: UserId) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    let flag = own_flag(contract, caller)?;
    if *flag {
        return Ok(Unchanged);
    }
    *flag = true;
    contract.recompute_status();
    Ok(Changed)
}

/// Clears the caller's own agreement flag, in any non-archived status.
///
/// A fully signed contract drops back to a pending status and becomes
/// editable again. Revoking without a prior agreement is a no-op.
pub fn revoke(contract: &mut Contract, caller: UserId) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    let flag = own_flag(contract, caller)?;
    if !*flag {
        return Ok(Unchanged);
    }
    *flag = false;
    contract.recompute_status();
    Ok(Changed)
}

/// Applies a content edit from either party while the contract is editable.
pub fn update_content(
    contract: &mut Contract,
    update: UpdateContent,
) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    require_party(contract, update.caller)?;
    if !contract.can_edit() {
        return Err(EthereError::Locked(
            "fully signed contracts cannot be edited; revoke agreement first".into(),
        ));
    }

    let mut changed = false;
    if let Some(title) = update.title {
        changed |= replace(&mut contract.title, title);
    }
    if let Some(summary) = update.summary {
        changed |= replace(&mut contract.summary, summary);
    }
    if let Some(clauses) = update.clauses {
        changed |= replace(&mut contract.clauses, clauses);
    }
    if let Some(raw_text) = update.raw_text {
        changed |= replace(&mut contract.raw_text, raw_text);
    }

    Ok(if changed { Changed } else { Unchanged })
}

/// Pre-flight checks for a server-side notarization.
pub fn ensure_notarizable(contract: &Contract, caller: UserId) -> Result<(), EthereError> {
    ensure_open(contract)?;
    require_initiator(contract, caller, "notarize the contract")?;
    if contract.is_notarized() {
        return Err(EthereError::AlreadyNotarized);
    }
    if contract.status != ContractStatus::FullySigned {
        return Err(EthereError::NotFullySigned);
    }
    Ok(())
}

/// Writes all notarization fields at once.
///
/// Re-recording the same transaction hash succeeds without a write, so the
/// metadata step can be retried on its own after a failed write.
pub fn record_notarization(
    contract: &mut Contract,
    caller: UserId,
    notarization: Notarization,
) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    require_initiator(contract, caller, "record notarization")?;
    if let Some(existing) = &contract.blockchain_hash {
        if *existing == notarization.tx_hash {
            return Ok(Unchanged);
        }
        return Err(EthereError::AlreadyNotarized);
    }
    if contract.status != ContractStatus::FullySigned {
        return Err(EthereError::NotFullySigned);
    }

    contract.blockchain_hash = Some(notarization.tx_hash);
    contract.payment_tx_hash = Some(notarization.payment_tx_hash);
    contract.calculated_price = Some(notarization.calculated_price);
    contract.chain_id = Some(notarization.chain_id);
    contract.registration_cost_eth = Some(notarization.registration_cost_eth);
    Ok(Changed)
}

/// Withdraws a contract that has not been fully signed.
pub fn archive(contract: &mut Contract, caller: UserId) -> Result<TransitionOutcome, EthereError> {
    ensure_open(contract)?;
    require_initiator(contract, caller, "archive the contract")?;
    if contract.status == ContractStatus::FullySigned {
        return Err(EthereError::Locked(
            "fully signed contracts cannot be archived".into(),
        ));
    }

    contract.archived_at = Some(now_timestamp());
    contract.recompute_status();
    Ok(Changed)
}

/// Guard for owner deletion.
pub fn check_delete(contract: &Contract, caller: UserId) -> Result<(), EthereError> {
    require_initiator(contract, caller, "delete the contract")?;
    if contract.status == ContractStatus::FullySigned {
        return Err(EthereError::Locked(
            "fully signed contracts cannot be deleted".into(),
        ));
    }
    Ok(())
}
