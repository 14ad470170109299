//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::http::request::{json_body, request_id, session_id};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::SessionEvent;
use crate::summary::BlockSummary;
use crate::view::BlockDetailsView;

#[derive(Debug, Serialize, Deserialize)]
pub struct OtpResponse {
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateOtpRequest {
    /// String or number; anything else never matches.
    #[serde(default)]
    pub otp: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalBlocksResponse {
    pub total_blocks: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub login_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Value,
    pub currency: String,
}

/// `GET /otp`
pub async fn generate_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OtpResponse>, ApiError> {
    let request_id = request_id(&headers);
    let session = state.sessions.check(&headers, SessionEvent::OtpIssued)?;

    let otp = state
        .otp
        .issue_otp()
        .await
        .map_err(|e| ApiError::fault("Failed to generate OTP", &request_id, &e))?;

    state.sessions.commit(session, SessionEvent::OtpIssued);
    tracing::info!(request_id = %request_id, "OTP issued");
    Ok(Json(OtpResponse { otp }))
}

/// `POST /validate-otp`
pub async fn validate_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ValidateOtpRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id = request_id(&headers);
    let body = json_body(payload, &request_id)?;
    let session = state.sessions.check(&headers, SessionEvent::OtpValidated)?;

    let Some(candidate) = scalar_to_string(&body.otp) else {
        state.sessions.commit(session, SessionEvent::OtpRejected);
        return Err(ApiError::InvalidOtp);
    };

    let is_valid = state
        .otp
        .check_otp(&candidate)
        .await
        .map_err(|e| ApiError::fault("Internal server error", &request_id, &e))?;

    tracing::info!(request_id = %request_id, is_valid, "OTP checked");
    if is_valid {
        state.sessions.commit(session, SessionEvent::OtpValidated);
        Ok(Json(MessageResponse {
            message: "OTP validated successfully".to_string(),
        }))
    } else {
        state.sessions.commit(session, SessionEvent::OtpRejected);
        Err(ApiError::InvalidOtp)
    }
}

/// `GET /latest-block`
pub async fn latest_block(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BlockSummary>, ApiError> {
    let summary = state.summary.latest().await.map_err(|e| {
        ApiError::fault("Failed to get latest block", &request_id(&headers), &e)
    })?;
    Ok(Json(summary))
}

/// `GET /total-blocks`
pub async fn total_blocks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TotalBlocksResponse>, ApiError> {
    let total_blocks = state.summary.total_blocks().await.map_err(|e| {
        ApiError::fault(
            "Failed to get total number of blocks",
            &request_id(&headers),
            &e,
        )
    })?;
    Ok(Json(TotalBlocksResponse { total_blocks }))
}

/// `GET /block-details`
pub async fn block_details(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BlockDetailsView>, ApiError> {
    let summary = state.summary.latest().await.map_err(|e| {
        ApiError::fault(
            "Failed to get latest block details",
            &request_id(&headers),
            &e,
        )
    })?;
    Ok(Json(BlockDetailsView::from_summary(&summary)))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_body(payload, &request_id(&headers))?;
    if !state.auth.verify(&body.login_id, &body.password) {
        tracing::warn!(request_id = %request_id(&headers), "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let session_id = state.sessions.store().open();
    tracing::info!(request_id = %request_id(&headers), session_id = %session_id, "Login accepted");
    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        session_id: session_id.to_string(),
    }))
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(id) = session_id(&headers) {
        state.sessions.store().close(&id);
    }
    StatusCode::NO_CONTENT
}

/// `POST /transfer`
///
/// Records the intent only; the transfer itself is not sent to the ledger.
pub async fn transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let body = json_body(payload, &request_id(&headers))?;
    let session = state.sessions.check(&headers, SessionEvent::Transfer)?;

    let amount = scalar_to_string(&body.amount).unwrap_or_default();
    let fields = [body.from.as_str(), body.to.as_str(), amount.as_str(), body.currency.as_str()];
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::IncompleteTransfer);
    }

    state.sessions.commit(session, SessionEvent::Transfer);
    tracing::info!(
        request_id = %request_id(&headers),
        amount = %amount,
        currency = %body.currency,
        "Transfer initiated"
    );
    Ok(Json(MessageResponse {
        message: format!(
            "Transfer of {} {} initiated. Please generate and validate OTP.",
            amount.trim(),
            body.currency.trim()
        ),
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.ledger.block_number().await {
        Ok(block_number) => {
            metrics::record_ledger_health(true);
            Json(json!({
                "status": "ok",
                "ledger": "reachable",
                "blockNumber": block_number,
            }))
            .into_response()
        }
        Err(e) => {
            metrics::record_ledger_health(false);
            tracing::warn!(error = %e, "Ledger health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "ledger": "unreachable" })),
            )
                .into_response()
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("123456")), Some("123456".to_string()));
        assert_eq!(scalar_to_string(&json!(123456)), Some("123456".to_string()));
        assert_eq!(scalar_to_string(&json!(null)), None);
        assert_eq!(scalar_to_string(&json!([1])), None);
    }
}
