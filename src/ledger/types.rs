//! Ledger-facing types and error definitions.

use alloy::primitives::{Address, Bytes, Log, TxHash, B256, U256};
use thiserror::Error;

// Re-export LedgerConfig from config module to avoid duplication
pub use crate::config::schema::LedgerConfig;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// The node exposes no accounts to send from.
    #[error("Ledger node exposes no accounts")]
    NoAccounts,

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Invalid private key format.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Ledger not reachable at all.
    #[error("Ledger not available: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A contract method invocation ready to be estimated and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract address.
    pub to: Address,
    /// ABI-encoded input (selector + arguments).
    pub input: Bytes,
    /// Method name, for logs.
    pub method: String,
}

/// Gas settings attached to a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPlan {
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
}

/// The parts of a mined transaction receipt the relay reads.
#[derive(Debug, Clone)]
pub struct LedgerReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Execution status (false = reverted).
    pub success: bool,
    /// Emitted event logs, in emission order.
    pub logs: Vec<Log>,
}

/// One transaction as listed inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub hash: TxHash,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    /// Value in wei.
    pub value: U256,
}

/// A block with its full transaction objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBlock {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub nonce: u64,
    pub gas_used: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<LedgerTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = LedgerError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert!(err.to_string().contains("600"));

        let err = LedgerError::ChainMismatch {
            expected: 1337,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Chain ID mismatch: expected 1337, got 1");
    }

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.rpc_timeout_secs, 30);
        assert_eq!(config.receipt_timeout_secs, 60);
        assert!(config.max_gas_price_gwei.is_none());
    }
}
