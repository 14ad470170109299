//! Block summary.
//!
//! A read-only snapshot of the latest block plus every node account's
//! balance, built fresh per request and never stored.
//!
//! Balances and the block are read at their own query time. Under
//! concurrent chain growth they may reflect slightly different heights;
//! only `totalBlocks == number` holds within one snapshot.

pub mod builder;
pub mod units;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::LedgerError;

pub use builder::BlockSummaryBuilder;
pub use units::wei_to_ether;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Ledger node returned no block {0}")]
    MissingBlock(u64),
}

pub type SummaryResult<T> = Result<T, SummaryError>;

/// One block as shown to users. Wide integers are decimal strings; values
/// and balances are in ether.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub gas_used: String,
    pub timestamp: String,
    pub transactions: Vec<TransactionSummary>,
    pub accounts: Vec<AccountBalance>,
    /// Latest block number when the snapshot was taken.
    pub total_blocks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: String,
    pub balance: String,
}
