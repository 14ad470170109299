//! Resilience subsystem.
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every ledger call has a deadline
//! - No retries: a failed contract call surfaces once to the caller, since a
//!   resubmitted `generateOTP` would mint a second code

pub mod timeouts;

pub use timeouts::with_deadline;
