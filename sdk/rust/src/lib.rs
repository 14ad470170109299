//! Typed client for the OTP relay's HTTP API.

mod client;

pub use client::{
    AccountBalance, BlockSummary, ClientError, LoginResponse, RelayClient, TransactionSummary,
    TransferRequest,
};
