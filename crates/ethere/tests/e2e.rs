// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the contract lifecycle over HTTP.
//!
//! Each test creates an isolated TestHarness with temp SQLite, a mock
//! registry and the full router. Tests are independent and order-insensitive.

use ethere_test_utils::{MockRegistry, TestHarness};
use serde_json::{Value, json};

const UNIT_RATE: f64 = 0.00001;

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_unit_rate(UNIT_RATE)
        .with_registry(MockRegistry::new())
        .build()
        .await
        .unwrap()
}

async fn call(harness: &TestHarness, method: &str, uri: &str, body: Value) -> (u16, Value) {
    let (status, json) = harness.request(method, uri, Some(body)).await;
    (status.as_u16(), json)
}

/// Creates a draft as user 1, then hits the free plan's daily limit.
async fn create_draft(harness: &TestHarness) -> String {
    let (status, body) = call(
        harness,
        "POST",
        "/contracts",
        json!({
            "initiatorId": 1,
            "title": "NDA",
            "summary": "Mutual non-disclosure",
            "clauses": [{"title": "C1", "body": "Keep it secret."}],
        }),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["usage"]["used"], 1);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        harness,
        "POST",
        "/contracts",
        json!({"initiatorId": 1, "title": "NDA 2", "summary": "Again"}),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "quota_exceeded");

    id
}

/// User 1 invites user 2.
async fn invite_counterparty(harness: &TestHarness, id: &str) {
    let (status, body) = call(
        harness,
        "POST",
        &format!("/contracts/{id}/invite"),
        json!({"userId": 1, "counterpartyId": 2}),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["status"], "pending_counterparty");
    assert_eq!(body["data"]["counterparty_id"], 2);
}

/// Both parties accept.
async fn sign_both(harness: &TestHarness, id: &str) {
    for user in [1, 2] {
        let (status, body) = call(
            harness,
            "POST",
            &format!("/contracts/{id}/accept"),
            json!({"userId": user}),
        )
        .await;
        assert_eq!(status, 200, "{body}");
    }
    let (_, body) = harness
        .request("GET", &format!("/contracts/{id}"), None)
        .await;
    assert_eq!(body["data"]["status"], "fully_signed");
    assert_eq!(body["data"]["initiator_agreed"], true);
    assert_eq!(body["data"]["counterparty_agreed"], true);
}

#[tokio::test]
async fn create_draft_and_exhaust_quota() {
    let harness = harness().await;
    let id = create_draft(&harness).await;

    let (_, body) = harness.request("GET", "/usage/user:1", None).await;
    assert_eq!(body["data"]["used"], 1);
    assert_eq!(body["data"]["canCreate"], false);

    let (_, body) = harness.request("GET", &format!("/contracts/{id}"), None).await;
    assert_eq!(body["data"]["clauses"][0]["title"], "C1");
}

#[tokio::test]
async fn invite_binds_counterparty() {
    let harness = harness().await;
    let id = create_draft(&harness).await;
    invite_counterparty(&harness, &id).await;
}

#[tokio::test]
async fn both_accepts_sign_the_contract() {
    let harness = harness().await;
    let id = create_draft(&harness).await;
    invite_counterparty(&harness, &id).await;
    sign_both(&harness, &id).await;
}

#[tokio::test]
async fn signed_contract_is_locked() {
    let harness = harness().await;
    let id = create_draft(&harness).await;
    invite_counterparty(&harness, &id).await;
    sign_both(&harness, &id).await;

    let (status, body) = call(
        &harness,
        "PUT",
        &format!("/contracts/{id}/update"),
        json!({"userId": 1, "title": "NDA (amended)"}),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "locked");
}

#[tokio::test]
async fn revoke_reopens_editing() {
    let harness = harness().await;
    let id = create_draft(&harness).await;
    invite_counterparty(&harness, &id).await;
    sign_both(&harness, &id).await;

    let (status, body) = call(
        &harness,
        "POST",
        &format!("/contracts/{id}/revoke"),
        json!({"userId": 1}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending_acceptance");
    assert_eq!(body["data"]["initiator_agreed"], false);
    assert_eq!(body["data"]["counterparty_agreed"], true);

    let (status, body) = call(
        &harness,
        "PUT",
        &format!("/contracts/{id}/update"),
        json!({"userId": 1, "title": "NDA (amended)"}),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["title"], "NDA (amended)");
}

#[tokio::test]
async fn notarize_charges_by_words_once() {
    let harness = harness().await;
    let id = create_draft(&harness).await;
    invite_counterparty(&harness, &id).await;

    // 1000-word body, set while the contract is still editable.
    let text = vec!["lorem"; 1000].join(" ");
    let (status, body) = call(
        &harness,
        "PUT",
        &format!("/contracts/{id}/update"),
        json!({"userId": 1, "rawText": text}),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    sign_both(&harness, &id).await;

    let (status, body) = call(
        &harness,
        "POST",
        &format!("/contracts/{id}/notarize"),
        json!({"userId": 1, "counterpartyAddress": "0x00000000000000000000000000000000000000b0"}),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    let price = body["data"]["calculated_price"].as_f64().unwrap();
    assert!((price - 1000.0 * UNIT_RATE).abs() < 1e-12);
    assert!(body["data"]["blockchain_hash"].is_string());
    assert!(body["data"]["payment_tx_hash"].is_string());

    let (status, body) = call(
        &harness,
        "POST",
        &format!("/contracts/{id}/notarize"),
        json!({"userId": 1}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "already_notarized");

    let registry = harness.registry.as_ref().unwrap();
    assert_eq!(registry.payments().await.len(), 1);
}

#[tokio::test]
async fn owner_can_delete_unsigned_contract() {
    let harness = harness().await;
    let id = create_draft(&harness).await;

    let (status, _) = call(
        &harness,
        "DELETE",
        &format!("/contracts/{id}"),
        json!({"userId": 2}),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = call(
        &harness,
        "DELETE",
        &format!("/contracts/{id}"),
        json!({"userId": 1}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = harness.request("GET", &format!("/contracts/{id}"), None).await;
    assert_eq!(status.as_u16(), 404);
}

#[tokio::test]
async fn archived_contract_is_frozen() {
    let harness = harness().await;
    let id = create_draft(&harness).await;

    let (status, body) = call(
        &harness,
        "POST",
        &format!("/contracts/{id}/archive"),
        json!({"userId": 1}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "archived");

    let (status, body) = call(
        &harness,
        "POST",
        &format!("/contracts/{id}/accept"),
        json!({"userId": 1}),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "locked");
}
