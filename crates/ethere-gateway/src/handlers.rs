// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the contract REST API.
//!
//! Handlers only parse and validate input into typed commands, call the
//! coordinator, and wrap the result in the response envelope. The acting
//! user comes from the request body and is resolved here, once.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ethere_agreement::{
    CreateContract, CreateContractRequest, InviteCounterparty, InviteRequest, Notarize,
    NotarizeRequest, PartyAction, PartyRequest, RecordNotarization, RecordNotarizationRequest,
    UpdateContent, UpdateContentRequest, UsageSnapshot, positive_id,
};
use ethere_core::{Contract, ContractStatus, EthereError, HealthStatus, PlanId, UserId};
use serde::{Deserialize, Serialize};

use crate::response::{ApiError, ApiResponse};
use crate::server::GatewayState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;
type ApiResult<T> = Result<T, ApiError>;

/// Upper bound for `?days=` on the usage history endpoint.
const MAX_HISTORY_DAYS: u32 = 365;

/// Response body for POST /contracts.
#[derive(Debug, Serialize)]
pub struct CreateContractResponse {
    pub success: bool,
    pub data: Contract,
    pub usage: UsageSnapshot,
}

/// Response body for POST /contracts/{id}/accept.
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub success: bool,
    pub data: Contract,
    #[serde(rename = "isSigned")]
    pub is_signed: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedContract {
    pub id: String,
    pub deleted: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
    pub notarization: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(alias = "plan_id")]
    pub plan_id: Option<PlanId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

fn parse_user_id(raw: &str) -> Result<UserId, EthereError> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| EthereError::Validation("userId must be a positive integer".into()))?;
    positive_id("userId", Some(value))
}

// --- Contracts ---

/// POST /contracts
pub async fn create_contract(
    State(state): State<GatewayState>,
    body: JsonBody<CreateContractRequest>,
) -> ApiResult<Response> {
    let Json(req) = body?;
    let cmd = CreateContract::try_from(req)?;
    let created = state.coordinator.create(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateContractResponse {
            success: true,
            data: created.contract,
            usage: created.usage,
        }),
    )
        .into_response())
}

/// GET /contracts/{id}
pub async fn get_contract(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    Ok(ApiResponse::ok(state.coordinator.get(&id).await?))
}

/// GET /contracts/user/{user_id}
pub async fn list_user_contracts(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Contract>>>> {
    let user = parse_user_id(&user_id)?;
    Ok(ApiResponse::ok(state.coordinator.list_for_user(user).await?))
}

/// POST /contracts/{id}/invite
pub async fn invite(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<InviteRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = InviteCounterparty::try_from(req)?;
    Ok(ApiResponse::ok(state.coordinator.invite(&id, cmd).await?))
}

/// POST /contracts/{id}/accept
pub async fn accept(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<PartyRequest>,
) -> ApiResult<Json<AcceptResponse>> {
    let Json(req) = body?;
    let cmd = PartyAction::try_from(req)?;
    let contract = state.coordinator.accept(&id, cmd).await?;
    Ok(Json(AcceptResponse {
        success: true,
        is_signed: contract.status == ContractStatus::FullySigned,
        data: contract,
    }))
}

/// POST /contracts/{id}/revoke
pub async fn revoke(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<PartyRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = PartyAction::try_from(req)?;
    Ok(ApiResponse::ok(state.coordinator.revoke(&id, cmd).await?))
}

/// PUT /contracts/{id}/update
pub async fn update(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<UpdateContentRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = UpdateContent::try_from(req)?;
    Ok(ApiResponse::ok(state.coordinator.update(&id, cmd).await?))
}

/// POST /contracts/{id}/blockchain-hash
pub async fn record_notarization(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<RecordNotarizationRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = RecordNotarization::try_from(req)?;
    Ok(ApiResponse::ok(
        state.coordinator.record_notarization(&id, cmd).await?,
    ))
}

/// POST /contracts/{id}/notarize
pub async fn notarize(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<NotarizeRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = Notarize::try_from(req)?;
    Ok(ApiResponse::ok(state.coordinator.notarize(&id, cmd).await?))
}

/// POST /contracts/{id}/archive
pub async fn archive(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<PartyRequest>,
) -> ApiResult<Json<ApiResponse<Contract>>> {
    let Json(req) = body?;
    let cmd = PartyAction::try_from(req)?;
    Ok(ApiResponse::ok(state.coordinator.archive(&id, cmd).await?))
}

/// DELETE /contracts/{id}
pub async fn delete_contract(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: JsonBody<PartyRequest>,
) -> ApiResult<Json<ApiResponse<DeletedContract>>> {
    let Json(req) = body?;
    let cmd = PartyAction::try_from(req)?;
    state.coordinator.delete(&id, cmd).await?;
    Ok(ApiResponse::ok(DeletedContract { id, deleted: true }))
}

// --- Plans, subscriptions, usage ---

/// GET /plans
pub async fn list_plans(State(state): State<GatewayState>) -> Response {
    ApiResponse::ok(state.coordinator.limiter().plans().all()).into_response()
}

/// GET /subscriptions/{email}
pub async fn get_subscription(
    State(state): State<GatewayState>,
    Path(email): Path<String>,
) -> ApiResult<Response> {
    let subscription = state.coordinator.limiter().subscription(&email).await?;
    Ok(ApiResponse::ok(subscription).into_response())
}

/// PUT /subscriptions/{email}
pub async fn set_subscription(
    State(state): State<GatewayState>,
    Path(email): Path<String>,
    body: JsonBody<PlanRequest>,
) -> ApiResult<Response> {
    let Json(req) = body?;
    let plan = req
        .plan_id
        .ok_or_else(|| EthereError::Validation("planId is required".into()))?;
    let subscription = state.coordinator.limiter().set_plan(&email, plan).await?;
    Ok(ApiResponse::ok(subscription).into_response())
}

/// GET /usage/{email}
pub async fn get_usage(
    State(state): State<GatewayState>,
    Path(email): Path<String>,
) -> ApiResult<Response> {
    let status = state.coordinator.limiter().check_quota(&email).await?;
    Ok(ApiResponse::ok(status).into_response())
}

/// GET /usage/{email}/history?days=N
pub async fn get_usage_history(
    State(state): State<GatewayState>,
    Path(email): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    if query
        .days
        .is_some_and(|days| !(1..=MAX_HISTORY_DAYS).contains(&days))
    {
        return Err(EthereError::Validation(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        ))
        .into());
    }
    let history = state
        .coordinator
        .limiter()
        .history(&email, query.days)
        .await?;
    Ok(ApiResponse::ok(history).into_response())
}

// --- Health ---

/// GET /health
///
/// Unauthenticated. Reports storage health, version and uptime.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let storage = match &state.health.storage {
        Some(storage) => match storage.health_check().await {
            Ok(HealthStatus::Healthy) => "healthy".to_string(),
            Ok(HealthStatus::Degraded(reason)) => format!("degraded: {reason}"),
            Ok(HealthStatus::Unhealthy(reason)) => format!("unhealthy: {reason}"),
            Err(e) => format!("unhealthy: {e}"),
        },
        None => "unknown".to_string(),
    };
    let healthy = storage == "healthy" || storage == "unknown";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
            storage,
            notarization: state.coordinator.notarization_enabled(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_path_must_be_positive_integer() {
        assert_eq!(parse_user_id("42").unwrap(), UserId(42));
        assert!(parse_user_id("abc").is_err());
        assert!(parse_user_id("0").is_err());
        assert!(parse_user_id("-5").is_err());
    }

    #[test]
    fn plan_request_accepts_both_spellings() {
        let req: PlanRequest = serde_json::from_str(r#"{"planId": "creator"}"#).unwrap();
        assert_eq!(req.plan_id, Some(PlanId::Creator));
        let req: PlanRequest = serde_json::from_str(r#"{"plan_id": "standard"}"#).unwrap();
        assert_eq!(req.plan_id, Some(PlanId::Standard));
        assert!(serde_json::from_str::<PlanRequest>(r#"{"planId": "gold"}"#).is_err());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
            storage: "healthy".to_string(),
            notarization: false,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
