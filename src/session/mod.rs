//! Server-side session tracking for the UI workflow.
//!
//! # Data Flow
//! ```text
//! POST /login      → store.open()                      loggedOut → loggedIn
//! POST /transfer   → store.advance(id, Transfer)       → transferInitiated
//! GET  /otp        → store.advance(id, OtpIssued)      → otpPending
//! POST /validate   → store.advance(id, OtpValidated)   → otpValidated
//!                    or store.advance(id, OtpRejected) stays otpPending
//! POST /logout     → store.close(id)
//! ```
//!
//! Whether a bad transition rejects the request or is ignored is decided by
//! the HTTP layer (`session.enforce_order`).

pub mod state;
pub mod store;

pub use state::{SessionEvent, SessionState, TransitionError};
pub use store::{SessionError, SessionStore};
