// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for each table.

pub mod contracts;
pub mod subscriptions;
pub mod usage;
