//! Request-scoped context: request IDs, tracing spans, session gating.
//!
//! # Design Decisions
//! - Request ID is set as early as possible (`SetRequestIdLayer`) so every
//!   log line of the request carries it
//! - Session checks happen before any ledger call; the state only advances
//!   once the call has succeeded

use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    http::{HeaderMap, Request, StatusCode},
    Json,
};
use tracing::Span;
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::session::{SessionEvent, SessionStore};

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_SESSION_ID: &str = "x-session-id";

/// The request ID assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Span for `TraceLayer`, tagged with the request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}

/// Body of a JSON request.
///
/// A body that is missing, not JSON or of the wrong shape reads as
/// `T::default()`, so the handler answers with its own 4xx. An oversized body
/// stays a 413.
pub fn json_body<T: Default>(
    payload: Result<Json<T>, JsonRejection>,
    request_id: &str,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::Rejected(rejection.status()))
        }
        Err(rejection) => {
            tracing::debug!(
                request_id = %request_id,
                reason = %rejection.body_text(),
                "Request body ignored"
            );
            Ok(T::default())
        }
    }
}

/// Session ID from the `x-session-id` header, if present and well formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(X_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// Applies the UI workflow ordering to requests.
///
/// With `enforce` off, a request is never rejected: a known session in the
/// right state is advanced, anything else is ignored.
#[derive(Clone)]
pub struct SessionGate {
    store: SessionStore,
    enforce: bool,
}

impl SessionGate {
    pub fn new(store: SessionStore, enforce: bool) -> Self {
        Self { store, enforce }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Check that `event` may happen for the caller's session.
    ///
    /// Returns the session to advance once the request succeeds.
    pub fn check(&self, headers: &HeaderMap, event: SessionEvent) -> Result<Option<Uuid>, ApiError> {
        let current = session_id(headers).and_then(|id| self.store.get(&id).map(|state| (id, state)));

        let Some((id, state)) = current else {
            if self.enforce {
                return Err(ApiError::Session {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Login required".to_string(),
                });
            }
            return Ok(None);
        };

        match state.apply(event) {
            Ok(_) => Ok(Some(id)),
            Err(e) if self.enforce => Err(ApiError::Session {
                status: StatusCode::CONFLICT,
                message: e.to_string(),
            }),
            Err(e) => {
                tracing::debug!(session_id = %id, error = %e, "Session not advanced");
                Ok(None)
            }
        }
    }

    /// Advance session `id` after a successful request.
    pub fn commit(&self, id: Option<Uuid>, event: SessionEvent) {
        let Some(id) = id else { return };
        if let Err(e) = self.store.advance(&id, event) {
            // Another request moved the session in between
            tracing::debug!(session_id = %id, error = %e, "Session not advanced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use axum::http::HeaderValue;

    fn headers_for(id: Uuid) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_SESSION_ID, HeaderValue::from_str(&id.to_string()).unwrap());
        headers
    }

    #[test]
    fn test_request_id_fallback() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_malformed_session_header_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_SESSION_ID, HeaderValue::from_static("not-a-uuid"));
        assert!(session_id(&headers).is_none());
    }

    #[test]
    fn test_lenient_gate_never_rejects() {
        let gate = SessionGate::new(SessionStore::new(), false);
        assert_eq!(gate.check(&HeaderMap::new(), SessionEvent::OtpIssued).unwrap(), None);

        let id = gate.store().open();
        // Logged in but no transfer yet: ignored, not rejected
        assert_eq!(gate.check(&headers_for(id), SessionEvent::OtpIssued).unwrap(), None);
        assert_eq!(
            gate.check(&headers_for(id), SessionEvent::Transfer).unwrap(),
            Some(id)
        );
    }

    #[test]
    fn test_enforcing_gate() {
        let gate = SessionGate::new(SessionStore::new(), true);
        let err = gate.check(&HeaderMap::new(), SessionEvent::Transfer).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let id = gate.store().open();
        let err = gate.check(&headers_for(id), SessionEvent::OtpIssued).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_commit_advances() {
        let gate = SessionGate::new(SessionStore::new(), true);
        let id = gate.store().open();
        let checked = gate.check(&headers_for(id), SessionEvent::Transfer).unwrap();
        gate.commit(checked, SessionEvent::Transfer);
        assert_eq!(gate.store().get(&id), Some(SessionState::TransferInitiated));
    }
}
