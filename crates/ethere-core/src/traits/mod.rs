// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod registry;
pub mod storage;
pub mod usage;

pub use adapter::PluginAdapter;
pub use registry::{ChainReceipt, RegistryAdapter};
pub use storage::{ContractCheck, ContractStore, ContractTransition, StorageAdapter, TransitionOutcome};
pub use usage::UsageStore;
