//! Error responses.
//!
//! Expected negative results (wrong OTP, bad login, incomplete form, session
//! out of order) map to 4xx. Ledger and contract faults map to 500 with a
//! route-specific message; the cause is logged by the handler and never
//! sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The OTP did not match.
    InvalidOtp,
    InvalidCredentials,
    /// A transfer form field is missing or blank.
    IncompleteTransfer,
    /// Session missing, unknown, or in the wrong state.
    Session { status: StatusCode, message: String },
    /// Infrastructure fault.
    Fault { message: &'static str },
    /// Refused before reaching a handler (timeout, body limit, no route).
    Rejected(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidOtp | ApiError::IncompleteTransfer => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Session { status, .. } => *status,
            ApiError::Fault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected(status) => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidOtp => "Invalid OTP",
            ApiError::InvalidCredentials => "Invalid login ID or password",
            ApiError::IncompleteTransfer => "Please fill in all fields.",
            ApiError::Session { message, .. } => message,
            ApiError::Fault { message } => message,
            ApiError::Rejected(status) => status.canonical_reason().unwrap_or("Request failed"),
        }
    }

    /// Log `cause` and turn it into a 500 carrying `message`.
    pub fn fault(message: &'static str, request_id: &str, cause: &dyn std::fmt::Display) -> Self {
        tracing::error!(request_id = %request_id, error = %cause, "{}", message);
        ApiError::Fault { message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidOtp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::IncompleteTransfer.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Fault {
                message: "Failed to generate OTP"
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Session {
                status: StatusCode::CONFLICT,
                message: "out of order".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_rejection_uses_reason_phrase() {
        let err = ApiError::Rejected(StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.message(), "Request Timeout");
    }

    #[test]
    fn test_fault_keeps_route_message() {
        let err = ApiError::fault("Internal server error", "req-1", &"connection refused");
        assert_eq!(err.message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_body_is_error_object() {
        let response = ApiError::InvalidOtp.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Invalid OTP" }));
    }
}
