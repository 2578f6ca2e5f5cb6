// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription rows keyed by user email.

use std::str::FromStr;

use chrono::{Duration, Months, Utc};
use ethere_core::types::TIMESTAMP_FORMAT;
use ethere_core::{EthereError, PlanId, Subscription};
use rusqlite::{Connection, Row, params};

use crate::database::{Database, conversion_err, map_tr_err};

/// Start and end of a one-month billing period beginning now.
fn billing_period() -> (String, String) {
    let now = Utc::now();
    let end = now
        .checked_add_months(Months::new(1))
        .unwrap_or(now + Duration::days(30));
    (
        now.format(TIMESTAMP_FORMAT).to_string(),
        end.format(TIMESTAMP_FORMAT).to_string(),
    )
}

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let plan: String = row.get(2)?;
    Ok(Subscription {
        id: row.get(0)?,
        user_email: row.get(1)?,
        plan_id: PlanId::from_str(&plan).map_err(|e| conversion_err(2, e))?,
        status: row.get(3)?,
        current_period_start: row.get(4)?,
        current_period_end: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn select_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Subscription> {
    conn.query_row(
        "SELECT id, user_email, plan_id, status, current_period_start, current_period_end, \
         created_at, updated_at FROM subscriptions WHERE user_email = ?1",
        params![email],
        row_to_subscription,
    )
}

/// Returns the subscription for `email`, inserting one on `plan` if absent.
pub async fn ensure(db: &Database, email: &str, plan: PlanId) -> Result<Subscription, EthereError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let (start, end) = billing_period();
            conn.execute(
                "INSERT INTO subscriptions (id, user_email, plan_id, status, \
                 current_period_start, current_period_end, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?4, ?4) \
                 ON CONFLICT (user_email) DO NOTHING",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    email,
                    plan.to_string(),
                    start,
                    end
                ],
            )?;
            select_by_email(conn, &email)
        })
        .await
        .map_err(map_tr_err)
}

/// Moves `email` to `plan` and restarts the billing period.
pub async fn set_plan(
    db: &Database,
    email: &str,
    plan: PlanId,
) -> Result<Subscription, EthereError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let (start, end) = billing_period();
            conn.execute(
                "INSERT INTO subscriptions (id, user_email, plan_id, status, \
                 current_period_start, current_period_end, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?4, ?4) \
                 ON CONFLICT (user_email) DO UPDATE SET \
                     plan_id = excluded.plan_id, \
                     status = 'active', \
                     current_period_start = excluded.current_period_start, \
                     current_period_end = excluded.current_period_end, \
                     updated_at = excluded.updated_at",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    email,
                    plan.to_string(),
                    start,
                    end
                ],
            )?;
            select_by_email(conn, &email)
        })
        .await
        .map_err(map_tr_err)
}
