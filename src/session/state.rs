//! Session state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
    TransferInitiated,
    OtpPending,
    OtpValidated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Login,
    Transfer,
    OtpIssued,
    OtpValidated,
    OtpRejected,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{event:?} is not allowed while {state:?}")]
pub struct TransitionError {
    pub state: SessionState,
    pub event: SessionEvent,
}

impl SessionState {
    /// The state after `event`, or an error if `event` is out of order.
    pub fn apply(self, event: SessionEvent) -> Result<SessionState, TransitionError> {
        use SessionEvent as E;
        use SessionState as S;

        let next = match (self, event) {
            (_, E::Logout) => S::LoggedOut,
            (S::LoggedOut, E::Login) => S::LoggedIn,
            (S::LoggedIn | S::OtpValidated, E::Transfer) => S::TransferInitiated,
            // Re-issuing replaces the pending OTP
            (S::TransferInitiated | S::OtpPending, E::OtpIssued) => S::OtpPending,
            (S::OtpPending, E::OtpValidated) => S::OtpValidated,
            (S::OtpPending, E::OtpRejected) => S::OtpPending,
            (state, event) => return Err(TransitionError { state, event }),
        };
        Ok(next)
    }
}
