// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word-count pricing and content hashing.
//!
//! Price = max(words * unit_rate_eth, minimum_price_eth). The default rate of
//! 0.00001 ETH per word is 0.001 ETH per 100 words.

use ethere_config::model::NotarizationConfig;
use sha2::{Digest, Sha256};

/// Whitespace-separated token count. Blank text has zero words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercase hex SHA-256 of `text`, registered on chain as the content hash.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Linear per-word price with a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSchedule {
    pub unit_rate_eth: f64,
    pub minimum_price_eth: f64,
}

impl PriceSchedule {
    pub fn from_config(config: &NotarizationConfig) -> Self {
        Self {
            unit_rate_eth: config.unit_rate_eth,
            minimum_price_eth: config.minimum_price_eth,
        }
    }

    pub fn price_for_words(&self, words: usize) -> f64 {
        (words as f64 * self.unit_rate_eth).max(self.minimum_price_eth)
    }
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self::from_config(&NotarizationConfig::default())
    }
}
