//! OTP workflow.
//!
//! # Data Flow
//! ```text
//! GET /otp
//!     → coordinator.issue_otp()
//!     → contract.generate_call() → transactor.execute() (mined receipt)
//!     → OTPGenerated.otp → display string
//!
//! POST /validate-otp {otp}
//!     → coordinator.check_otp(candidate)
//!     → contract.validate_call(candidate) → transactor.execute()
//!     → OTPValidated.isValid → bool
//! ```
//!
//! The contract owns the single outstanding OTP. Nothing here keeps a copy,
//! so the value a caller sees is always the one read back from the event of
//! its own transaction.

pub mod coordinator;

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::contract::ContractError;
use crate::ledger::LedgerError;

pub use coordinator::OtpCoordinator;

/// Failures of an OTP operation. Every variant is a fault; an OTP that does
/// not match is `Ok(false)`, not an error.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("Transaction {tx_hash} emitted no {event} event")]
    MissingEvent { event: String, tx_hash: TxHash },

    #[error("{event}.{field} carried an unusable value: {value}")]
    MalformedEvent {
        event: String,
        field: String,
        value: String,
    },
}

pub type OtpResult<T> = Result<T, OtpError>;
