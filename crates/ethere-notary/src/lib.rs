// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notarization support for the Ethere contract service.
//!
//! - **Pricing**: word-count based price and SHA-256 content hash of the
//!   flattened contract text
//! - **Client**: HTTP client for the registry relay that performs the
//!   register, sign and payment calls on chain

pub mod client;
pub mod pricing;

pub use client::HttpRegistry;
pub use pricing::{PriceSchedule, content_hash, word_count};
