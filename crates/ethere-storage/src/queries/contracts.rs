// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract reads and guarded writes.
//!
//! Every write runs inside an IMMEDIATE transaction on the single writer
//! thread. Business rejections come back as the inner `Err` of
//! `Result<Result<T, EthereError>, rusqlite::Error>`, which drops the
//! transaction and rolls back.

use std::str::FromStr;

use ethere_core::traits::{ContractCheck, ContractTransition, TransitionOutcome};
use ethere_core::types::now_timestamp;
use ethere_core::{Contract, ContractStatus, EthereError, UsageCharge, UserId};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::database::{Database, conversion_err, map_tr_err};
use crate::queries::usage;

const CONTRACT_COLUMNS: &str = "id, initiator_id, counterparty_id, title, summary, clauses, \
     suggestions, raw_text, initiator_agreed, counterparty_agreed, status, blockchain_hash, \
     payment_tx_hash, calculated_price, chain_id, registration_cost_eth, archived_at, \
     created_at, updated_at";

fn row_to_contract(row: &Row<'_>) -> rusqlite::Result<Contract> {
    let clauses: String = row.get(5)?;
    let suggestions: String = row.get(6)?;
    let status: String = row.get(10)?;
    Ok(Contract {
        id: row.get(0)?,
        initiator_id: UserId(row.get(1)?),
        counterparty_id: row.get::<_, Option<i64>>(2)?.map(UserId),
        title: row.get(3)?,
        summary: row.get(4)?,
        clauses: serde_json::from_str(&clauses).map_err(|e| conversion_err(5, e))?,
        suggestions: serde_json::from_str(&suggestions).map_err(|e| conversion_err(6, e))?,
        raw_text: row.get(7)?,
        initiator_agreed: row.get(8)?,
        counterparty_agreed: row.get(9)?,
        status: ContractStatus::from_str(&status).map_err(|e| conversion_err(10, e))?,
        blockchain_hash: row.get(11)?,
        payment_tx_hash: row.get(12)?,
        calculated_price: row.get(13)?,
        chain_id: row.get(14)?,
        registration_cost_eth: row.get(15)?,
        archived_at: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn select_contract(conn: &Connection, id: &str) -> rusqlite::Result<Option<Contract>> {
    conn.query_row(
        &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = ?1"),
        params![id],
        row_to_contract,
    )
    .optional()
}

fn insert_contract(conn: &Connection, c: &Contract) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO contracts ({CONTRACT_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ),
        params![
            c.id,
            c.initiator_id.0,
            c.counterparty_id.map(|u| u.0),
            c.title,
            c.summary,
            to_json(&c.clauses)?,
            to_json(&c.suggestions)?,
            c.raw_text,
            c.initiator_agreed,
            c.counterparty_agreed,
            c.status.to_string(),
            c.blockchain_hash,
            c.payment_tx_hash,
            c.calculated_price,
            c.chain_id,
            c.registration_cost_eth,
            c.archived_at,
            c.created_at,
            c.updated_at,
        ],
    )?;
    Ok(())
}

fn update_contract(conn: &Connection, c: &Contract) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE contracts SET counterparty_id = ?2, title = ?3, summary = ?4, clauses = ?5, \
         suggestions = ?6, raw_text = ?7, initiator_agreed = ?8, counterparty_agreed = ?9, \
         status = ?10, blockchain_hash = ?11, payment_tx_hash = ?12, calculated_price = ?13, \
         chain_id = ?14, registration_cost_eth = ?15, archived_at = ?16, updated_at = ?17 \
         WHERE id = ?1",
        params![
            c.id,
            c.counterparty_id.map(|u| u.0),
            c.title,
            c.summary,
            to_json(&c.clauses)?,
            to_json(&c.suggestions)?,
            c.raw_text,
            c.initiator_agreed,
            c.counterparty_agreed,
            c.status.to_string(),
            c.blockchain_hash,
            c.payment_tx_hash,
            c.calculated_price,
            c.chain_id,
            c.registration_cost_eth,
            c.archived_at,
            c.updated_at,
        ],
    )?;
    Ok(())
}

/// Insert a contract, optionally charging one unit of daily usage in the
/// same transaction. Returns the usage count after the charge.
pub async fn create_contract(
    db: &Database,
    contract: &Contract,
    charge: Option<UsageCharge>,
) -> Result<Option<u32>, EthereError> {
    let contract = contract.clone();
    db.connection()
        .call(move |conn| -> Result<Result<Option<u32>, EthereError>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if let Some(charge) = &charge {
                let used = usage::count_on(&tx, &charge.subject, &charge.date)?;
                if !charge.limit.allows(used) {
                    return Ok(Err(EthereError::QuotaExceeded {
                        used,
                        limit: charge.limit,
                    }));
                }
            }

            insert_contract(&tx, &contract)?;
            let count = match &charge {
                Some(charge) => Some(usage::bump(&tx, &charge.subject, &charge.date)?),
                None => None,
            };

            tx.commit()?;
            Ok(Ok(count))
        })
        .await
        .map_err(map_tr_err)?
}

/// Get a contract by ID.
pub async fn get_contract(db: &Database, id: &str) -> Result<Option<Contract>, EthereError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_contract(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Contracts where `user` is either party, newest first.
pub async fn list_for_user(db: &Database, user: UserId) -> Result<Vec<Contract>, EthereError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts \
                 WHERE initiator_id = ?1 OR counterparty_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![user.0], row_to_contract)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Read, mutate and write one contract atomically.
///
/// The status is re-derived before the write, so a transition can never
/// persist a status that disagrees with the flags.
pub async fn transition(
    db: &Database,
    id: &str,
    transition: ContractTransition,
) -> Result<Contract, EthereError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<Contract, EthereError>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(mut contract) = select_contract(&tx, &id)? else {
                return Ok(Err(EthereError::contract_not_found(id)));
            };

            match transition(&mut contract) {
                Err(e) => return Ok(Err(e)),
                Ok(TransitionOutcome::Unchanged) => return Ok(Ok(contract)),
                Ok(TransitionOutcome::Changed) => {}
            }

            contract.recompute_status();
            contract.updated_at = now_timestamp();
            update_contract(&tx, &contract)?;
            tx.commit()?;
            Ok(Ok(contract))
        })
        .await
        .map_err(map_tr_err)?
}

/// Delete a contract if `check` accepts its current state.
pub async fn delete_contract(
    db: &Database,
    id: &str,
    check: ContractCheck,
) -> Result<(), EthereError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<(), EthereError>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(contract) = select_contract(&tx, &id)? else {
                return Ok(Err(EthereError::contract_not_found(id)));
            };
            if let Err(e) = check(&contract) {
                return Ok(Err(e));
            }
            tx.execute("DELETE FROM contracts WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}
