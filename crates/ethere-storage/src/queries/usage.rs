// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily usage counters.

use ethere_core::types::now_timestamp;
use ethere_core::{EthereError, UsageRecord};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Contracts created by `subject` on `date`, zero when no row exists.
pub(crate) fn count_on(conn: &Connection, subject: &str, date: &str) -> rusqlite::Result<u32> {
    let used: Option<u32> = conn
        .query_row(
            "SELECT contracts_created FROM usage_tracking WHERE user_email = ?1 AND date = ?2",
            params![subject, date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(used.unwrap_or(0))
}

/// Upsert-increment the counter and return the new value.
pub(crate) fn bump(conn: &Connection, subject: &str, date: &str) -> rusqlite::Result<u32> {
    let now = now_timestamp();
    conn.query_row(
        "INSERT INTO usage_tracking (user_email, date, contracts_created, created_at, updated_at) \
         VALUES (?1, ?2, 1, ?3, ?3) \
         ON CONFLICT (user_email, date) DO UPDATE SET \
             contracts_created = contracts_created + 1, \
             updated_at = excluded.updated_at \
         RETURNING contracts_created",
        params![subject, date, now],
        |row| row.get(0),
    )
}

pub async fn usage_on(db: &Database, subject: &str, date: &str) -> Result<u32, EthereError> {
    let subject = subject.to_string();
    let date = date.to_string();
    db.connection()
        .call(move |conn| count_on(conn, &subject, &date))
        .await
        .map_err(map_tr_err)
}

pub async fn increment(db: &Database, subject: &str, date: &str) -> Result<u32, EthereError> {
    let subject = subject.to_string();
    let date = date.to_string();
    db.connection()
        .call(move |conn| bump(conn, &subject, &date))
        .await
        .map_err(map_tr_err)
}

/// Usage rows on or after `since` (`YYYY-MM-DD`), newest first.
pub async fn history(
    db: &Database,
    subject: &str,
    since: &str,
) -> Result<Vec<UsageRecord>, EthereError> {
    let subject = subject.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_email, date, contracts_created, updated_at FROM usage_tracking \
                 WHERE user_email = ?1 AND date >= ?2 ORDER BY date DESC",
            )?;
            let rows = stmt.query_map(params![subject, since], |row| {
                Ok(UsageRecord {
                    user_email: row.get(0)?,
                    date: row.get(1)?,
                    contracts_created: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
