// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the agreement coordinator over real SQLite storage.

use std::sync::Arc;
use std::time::Duration;

use ethere_agreement::{
    CreateContract, InviteCounterparty, Notarize, PartyAction, RecordNotarization, UpdateContent,
};
use ethere_config::model::UsageConfig;
use ethere_core::{
    Clause, ContractStatus, DailyLimit, ErrorKind, EthereError, NewContract, Notarization, PlanId,
    UserId,
};
use ethere_test_utils::mock_registry::MOCK_CHAIN_ID;
use ethere_test_utils::{MockRegistry, RegistryCall, RegistryStep, TestHarness};

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);
const MALLORY: UserId = UserId(3);

fn new_contract(raw_text: Option<&str>) -> CreateContract {
    CreateContract {
        contract: NewContract {
            initiator_id: ALICE,
            title: "Design work".to_string(),
            summary: "Logo and brand kit".to_string(),
            clauses: vec![Clause {
                title: "Scope".to_string(),
                body: "Deliver a logo".to_string(),
            }],
            suggestions: vec![],
            raw_text: raw_text.map(str::to_string),
        },
        user_email: Some("alice@example.com".to_string()),
    }
}

fn party(caller: UserId) -> PartyAction {
    PartyAction { caller }
}

async fn unlimited_harness() -> TestHarness {
    TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 100,
            ..UsageConfig::default()
        })
        .build()
        .await
        .unwrap()
}

/// Creates, invites and has both sides accept.
async fn fully_signed(harness: &TestHarness, raw_text: Option<&str>) -> String {
    let coordinator = &harness.coordinator;
    let id = coordinator
        .create(new_contract(raw_text))
        .await
        .unwrap()
        .contract
        .id;
    coordinator
        .invite(
            &id,
            InviteCounterparty {
                caller: ALICE,
                counterparty: BOB,
            },
        )
        .await
        .unwrap();
    coordinator.accept(&id, party(BOB)).await.unwrap();
    let contract = coordinator.accept(&id, party(ALICE)).await.unwrap();
    assert_eq!(contract.status, ContractStatus::FullySigned);
    id
}

// ---- Creation and quota ----

#[tokio::test]
async fn create_charges_quota_and_rejects_when_exhausted() {
    let harness = TestHarness::builder().build().await.unwrap();

    let created = harness.coordinator.create(new_contract(None)).await.unwrap();
    assert_eq!(created.contract.status, ContractStatus::Draft);
    assert_eq!(created.usage.used, 1);
    assert_eq!(created.usage.limit, DailyLimit::Limited(1));

    let err = harness
        .coordinator
        .create(new_contract(None))
        .await
        .unwrap_err();
    assert!(matches!(err, EthereError::QuotaExceeded { used: 1, .. }));

    let contracts = harness.coordinator.list_for_user(ALICE).await.unwrap();
    assert_eq!(contracts.len(), 1);
}

#[tokio::test]
async fn plan_upgrade_lifts_quota() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.coordinator.create(new_contract(None)).await.unwrap();

    harness
        .limiter
        .set_plan("alice@example.com", PlanId::Standard)
        .await
        .unwrap();
    let created = harness.coordinator.create(new_contract(None)).await.unwrap();
    assert_eq!(created.usage.used, 2);
    assert_eq!(created.usage.limit, DailyLimit::Limited(10));
}

#[tokio::test]
async fn concurrent_creates_never_exceed_the_limit() {
    let harness = TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 3,
            ..UsageConfig::default()
        })
        .build()
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = Arc::clone(&harness.coordinator);
        handles.push(tokio::spawn(async move {
            coordinator.create(new_contract(None)).await
        }));
    }
    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::QuotaExceeded),
        }
    }
    assert_eq!(created, 3);

    let quota = harness
        .limiter
        .check_quota("alice@example.com")
        .await
        .unwrap();
    assert_eq!(quota.used, 3);
    assert!(!quota.can_create);
}

// ---- Invitation and agreement ----

#[tokio::test]
async fn invite_accept_revoke_flow() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = coordinator.create(new_contract(None)).await.unwrap().contract.id;

    let contract = coordinator
        .invite(
            &id,
            InviteCounterparty {
                caller: ALICE,
                counterparty: BOB,
            },
        )
        .await
        .unwrap();
    assert_eq!(contract.counterparty_id, Some(BOB));
    assert_eq!(contract.status, ContractStatus::PendingCounterparty);

    let contract = coordinator.accept(&id, party(BOB)).await.unwrap();
    assert_eq!(contract.status, ContractStatus::PendingAcceptance);

    let contract = coordinator.accept(&id, party(ALICE)).await.unwrap();
    assert_eq!(contract.status, ContractStatus::FullySigned);

    let contract = coordinator.revoke(&id, party(BOB)).await.unwrap();
    assert!(contract.initiator_agreed);
    assert!(!contract.counterparty_agreed);
    assert_eq!(contract.status, ContractStatus::PendingCounterparty);

    let stored = coordinator.get(&id).await.unwrap();
    assert_eq!(stored, contract);
}

#[tokio::test]
async fn second_invite_is_rejected() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = coordinator.create(new_contract(None)).await.unwrap().contract.id;
    let invite = |counterparty| InviteCounterparty {
        caller: ALICE,
        counterparty,
    };

    coordinator.invite(&id, invite(BOB)).await.unwrap();
    let err = coordinator.invite(&id, invite(MALLORY)).await.unwrap_err();
    assert!(matches!(err, EthereError::AlreadyAssigned));
    assert_eq!(
        coordinator.get(&id).await.unwrap().counterparty_id,
        Some(BOB)
    );
}

#[tokio::test]
async fn strangers_cannot_act() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = fully_signed(&harness, None).await;

    let err = coordinator.revoke(&id, party(MALLORY)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = coordinator.delete(&id, party(BOB)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn concurrent_accepts_both_land() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = coordinator.create(new_contract(None)).await.unwrap().contract.id;
    coordinator
        .invite(
            &id,
            InviteCounterparty {
                caller: ALICE,
                counterparty: BOB,
            },
        )
        .await
        .unwrap();

    let a = {
        let coordinator = Arc::clone(coordinator);
        let id = id.clone();
        tokio::spawn(async move { coordinator.accept(&id, party(ALICE)).await })
    };
    let b = {
        let coordinator = Arc::clone(coordinator);
        let id = id.clone();
        tokio::spawn(async move { coordinator.accept(&id, party(BOB)).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let contract = coordinator.get(&id).await.unwrap();
    assert!(contract.initiator_agreed && contract.counterparty_agreed);
    assert_eq!(contract.status, ContractStatus::FullySigned);
}

// ---- Content edits ----

#[tokio::test]
async fn fully_signed_content_is_locked_until_revoked() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = fully_signed(&harness, None).await;
    let edit = |caller| UpdateContent {
        caller,
        title: Some("Design work v2".to_string()),
        summary: None,
        clauses: None,
        raw_text: None,
    };

    let err = coordinator.update(&id, edit(BOB)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);
    assert_eq!(coordinator.get(&id).await.unwrap().title, "Design work");

    coordinator.revoke(&id, party(ALICE)).await.unwrap();
    let contract = coordinator.update(&id, edit(BOB)).await.unwrap();
    assert_eq!(contract.title, "Design work v2");
    assert!(contract.counterparty_agreed);
}

// ---- Archive and delete ----

#[tokio::test]
async fn archived_contract_rejects_mutations_but_can_be_deleted() {
    let harness = unlimited_harness().await;
    let coordinator = &harness.coordinator;
    let id = coordinator.create(new_contract(None)).await.unwrap().contract.id;

    let contract = coordinator.archive(&id, party(ALICE)).await.unwrap();
    assert_eq!(contract.status, ContractStatus::Archived);
    assert!(contract.archived_at.is_some());

    let err = coordinator
        .invite(
            &id,
            InviteCounterparty {
                caller: ALICE,
                counterparty: BOB,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);

    coordinator.delete(&id, party(ALICE)).await.unwrap();
    let err = coordinator.get(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn fully_signed_contract_cannot_be_deleted() {
    let harness = unlimited_harness().await;
    let id = fully_signed(&harness, None).await;

    let err = harness
        .coordinator
        .delete(&id, party(ALICE))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);
    assert!(harness.coordinator.get(&id).await.is_ok());
}

#[tokio::test]
async fn unknown_contract_is_not_found() {
    let harness = unlimited_harness().await;
    let err = harness
        .coordinator
        .accept("missing", party(ALICE))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---- Notarization ----

#[tokio::test]
async fn notarize_prices_by_word_count_and_records_metadata() {
    let harness = TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 10,
            ..UsageConfig::default()
        })
        .with_unit_rate(0.00001)
        .with_registry(MockRegistry::new())
        .build()
        .await
        .unwrap();
    let text = vec!["word"; 1000].join(" ");
    let id = fully_signed(&harness, Some(&text)).await;

    let contract = harness
        .coordinator
        .notarize(
            &id,
            Notarize {
                caller: ALICE,
                counterparty_address: Some("0xabc".to_string()),
            },
        )
        .await
        .unwrap();

    let price = contract.calculated_price.unwrap();
    assert!((price - 0.01).abs() < 1e-12);
    assert_eq!(contract.blockchain_hash.as_deref(), Some(&*format!("0xregister-{id}")));
    assert_eq!(contract.payment_tx_hash.as_deref(), Some(&*format!("0xpay-{id}")));
    assert_eq!(contract.chain_id, Some(MOCK_CHAIN_ID));
    assert!((contract.registration_cost_eth.unwrap() - 0.0002).abs() < 1e-12);

    let registry = harness.registry.as_ref().unwrap();
    let calls = registry.calls().await;
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        RegistryCall::Register {
            counterparty_address,
            content_hash,
            ..
        } => {
            assert_eq!(counterparty_address.as_deref(), Some("0xabc"));
            assert_eq!(*content_hash, ethere_notary::content_hash(&text));
        }
        other => panic!("expected register call, got {other:?}"),
    }
    assert_eq!(registry.payments().await.len(), 1);
}

#[tokio::test]
async fn second_notarize_is_rejected_without_paying_again() {
    let harness = TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 10,
            ..UsageConfig::default()
        })
        .with_registry(MockRegistry::new())
        .build()
        .await
        .unwrap();
    let id = fully_signed(&harness, None).await;
    let cmd = || Notarize {
        caller: ALICE,
        counterparty_address: None,
    };

    harness.coordinator.notarize(&id, cmd()).await.unwrap();
    let err = harness.coordinator.notarize(&id, cmd()).await.unwrap_err();
    assert!(matches!(err, EthereError::AlreadyNotarized));

    let registry = harness.registry.as_ref().unwrap();
    assert_eq!(registry.payments().await.len(), 1);
}

#[tokio::test]
async fn notarize_requires_full_signature() {
    let harness = TestHarness::builder()
        .with_registry(MockRegistry::new())
        .build()
        .await
        .unwrap();
    let id = harness
        .coordinator
        .create(new_contract(None))
        .await
        .unwrap()
        .contract
        .id;

    let err = harness
        .coordinator
        .notarize(
            &id,
            Notarize {
                caller: ALICE,
                counterparty_address: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EthereError::NotFullySigned));
    assert!(harness.registry.as_ref().unwrap().calls().await.is_empty());
}

#[tokio::test]
async fn failed_step_leaves_contract_unnotarized() {
    for step in [RegistryStep::Register, RegistryStep::Sign, RegistryStep::Pay] {
        let harness = TestHarness::builder()
            .with_usage(UsageConfig {
                free_per_day: 10,
                ..UsageConfig::default()
            })
            .with_registry(MockRegistry::failing_at(step))
            .build()
            .await
            .unwrap();
        let id = fully_signed(&harness, None).await;

        let err = harness
            .coordinator
            .notarize(
                &id,
                Notarize {
                    caller: ALICE,
                    counterparty_address: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream, "step {step:?}");

        let contract = harness.coordinator.get(&id).await.unwrap();
        assert!(contract.blockchain_hash.is_none());
        assert!(contract.payment_tx_hash.is_none());
        assert!(contract.calculated_price.is_none());
        assert!(contract.chain_id.is_none());
        assert!(contract.registration_cost_eth.is_none());
        assert_eq!(contract.status, ContractStatus::FullySigned);
    }
}

#[tokio::test]
async fn retry_after_failure_succeeds() {
    let harness = TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 10,
            ..UsageConfig::default()
        })
        .with_registry(MockRegistry::failing_at(RegistryStep::Sign))
        .build()
        .await
        .unwrap();
    let id = fully_signed(&harness, None).await;
    let cmd = || Notarize {
        caller: ALICE,
        counterparty_address: None,
    };

    assert!(harness.coordinator.notarize(&id, cmd()).await.is_err());
    let registry = harness.registry.as_ref().unwrap();
    registry.set_failure(None).await;

    let contract = harness.coordinator.notarize(&id, cmd()).await.unwrap();
    assert!(contract.is_notarized());
}

#[tokio::test]
async fn slow_registry_times_out() {
    let harness = TestHarness::builder()
        .with_usage(UsageConfig {
            free_per_day: 10,
            ..UsageConfig::default()
        })
        .with_registry(
            MockRegistry::new().with_delay(RegistryStep::Register, Duration::from_secs(5)),
        )
        .with_registry_timeout(Duration::from_millis(50))
        .build()
        .await
        .unwrap();
    let id = fully_signed(&harness, None).await;

    let err = harness
        .coordinator
        .notarize(
            &id,
            Notarize {
                caller: ALICE,
                counterparty_address: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EthereError::Timeout { .. }));
    assert!(!harness.coordinator.get(&id).await.unwrap().is_notarized());
}

#[tokio::test]
async fn notarize_without_registry_is_upstream_error() {
    let harness = unlimited_harness().await;
    let id = fully_signed(&harness, None).await;

    let err = harness
        .coordinator
        .notarize(
            &id,
            Notarize {
                caller: ALICE,
                counterparty_address: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn recorded_notarization_is_idempotent_per_hash() {
    let harness = unlimited_harness().await;
    let id = fully_signed(&harness, None).await;
    let record = |tx_hash: &str| RecordNotarization {
        caller: ALICE,
        notarization: Notarization {
            tx_hash: tx_hash.to_string(),
            payment_tx_hash: "0xpay".to_string(),
            calculated_price: 0.001,
            chain_id: 1,
            registration_cost_eth: 0.0,
        },
    };

    let first = harness
        .coordinator
        .record_notarization(&id, record("0xaaa"))
        .await
        .unwrap();
    let again = harness
        .coordinator
        .record_notarization(&id, record("0xaaa"))
        .await
        .unwrap();
    assert_eq!(first, again);

    let err = harness
        .coordinator
        .record_notarization(&id, record("0xbbb"))
        .await
        .unwrap_err();
    assert!(matches!(err, EthereError::AlreadyNotarized));
}
