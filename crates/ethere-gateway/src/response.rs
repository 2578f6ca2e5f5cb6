// SPDX-FileCopyrightText: 2026 Ethere Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response envelopes and error-to-status mapping.
//!
//! Successful calls answer `{"success": true, "data": ...}`; failures answer
//! `{"success": false, "error": <message>, "code": <kind>}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ethere_core::{ErrorKind, EthereError};
use serde::Serialize;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden | ErrorKind::QuotaExceeded | ErrorKind::Locked => {
            StatusCode::FORBIDDEN
        }
        ErrorKind::Validation | ErrorKind::AlreadyAssigned => StatusCode::BAD_REQUEST,
        ErrorKind::AlreadyNotarized | ErrorKind::NotFullySigned => StatusCode::CONFLICT,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds a failure envelope with an explicit status.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

/// Handler error: an [`EthereError`] rendered as a failure envelope.
#[derive(Debug)]
pub struct ApiError(pub EthereError);

impl From<EthereError> for ApiError {
    fn from(err: EthereError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(EthereError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(EthereError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        let message = if status.is_server_error() && kind == ErrorKind::Internal {
            tracing::error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            if status.is_server_error() {
                tracing::warn!(error = %self.0, "upstream call failed");
            } else {
                tracing::debug!(error = %self.0, code = %kind, "request rejected");
            }
            self.0.to_string()
        };
        error_response(status, &kind.to_string(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethere_core::DailyLimit;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_mapping_matches_error_taxonomy() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::QuotaExceeded), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Locked), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::AlreadyAssigned), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::AlreadyNotarized), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Upstream), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Timeout), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn quota_error_renders_failure_envelope() {
        let response = ApiError(EthereError::QuotaExceeded {
            used: 1,
            limit: DailyLimit::Limited(1),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "quota_exceeded");
        assert_eq!(
            body["error"],
            "daily limit reached: 1 of 1 contracts used today"
        );
    }

    #[tokio::test]
    async fn internal_errors_are_not_leaked() {
        let response = ApiError(EthereError::Storage {
            source: Box::new(std::io::Error::other("disk I/O error at /var/lib")),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal server error");
        assert_eq!(body["code"], "internal");
    }

    #[test]
    fn success_envelope_serializes() {
        let Json(envelope) = ApiResponse::ok(vec![1, 2]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
