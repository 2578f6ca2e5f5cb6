// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ethere contract service.
//!
//! This crate provides the error type, the contract and subscription domain
//! types, and the adapter traits implemented by storage and registry
//! backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, EthereError};
pub use types::{
    AdapterType, Clause, Contract, ContractStatus, DailyLimit, HealthStatus, NewContract,
    Notarization, PartyRole, PlanId, QuotaStatus, Subscription, UsageCharge, UsageRecord, UserId,
};

pub use traits::{
    ChainReceipt, ContractCheck, ContractStore, ContractTransition, PluginAdapter,
    RegistryAdapter, StorageAdapter, TransitionOutcome, UsageStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_contract_store<T: ContractStore>() {}
        fn _assert_usage_store<T: UsageStore>() {}
        fn _assert_registry_adapter<T: RegistryAdapter>() {}
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;
        for variant in [AdapterType::Storage, AdapterType::Registry] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn transition_boxes_are_send() {
        fn _assert_send<T: Send>() {}
        _assert_send::<ContractTransition>();
        _assert_send::<ContractCheck>();
    }
}
