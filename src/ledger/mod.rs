//! Ledger client adapter.
//!
//! # Data Flow
//! ```text
//! Environment (optional private key) + LedgerConfig
//!     → wallet.rs (local signer, if any)
//!     → rpc.rs (alloy JSON-RPC provider, per-call deadlines)
//!       or memory.rs (in-process fake chain)
//!     → transactor.rs (caller → estimate → gas plan → submit → receipt)
//! ```
//!
//! # Constraints
//! - The adapter is injected as `Arc<dyn Ledger>`; nothing holds a global
//!   connection
//! - Private keys ONLY from environment variables, never logged
//! - Every RPC call has a deadline
//! - A failure at any step is one `LedgerError`; nothing is retried

pub mod memory;
pub mod rpc;
pub mod transactor;
pub mod types;
pub mod wallet;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub use memory::MemoryLedger;
pub use rpc::RpcLedger;
pub use transactor::{GasPolicy, Transactor};
pub use types::{
    ContractCall, GasPlan, LedgerBlock, LedgerError, LedgerReceipt, LedgerResult,
    LedgerTransaction,
};
pub use wallet::Wallet;

/// Operations the relay needs from a ledger node.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Accounts managed by the node.
    async fn accounts(&self) -> LedgerResult<Vec<Address>>;

    /// Account that sends contract calls.
    ///
    /// Defaults to the first account of the node's list.
    async fn default_account(&self) -> LedgerResult<Address> {
        self.accounts()
            .await?
            .first()
            .copied()
            .ok_or(LedgerError::NoAccounts)
    }

    /// Gas the call would consume if sent by `from`.
    async fn estimate_gas(&self, from: Address, call: &ContractCall) -> LedgerResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> LedgerResult<u128>;

    /// Send the call and wait until it is mined.
    async fn submit(
        &self,
        from: Address,
        call: &ContractCall,
        plan: GasPlan,
    ) -> LedgerResult<LedgerReceipt>;

    /// Latest block number.
    async fn block_number(&self) -> LedgerResult<u64>;

    /// Block `number` with full transaction objects, `None` if unknown.
    async fn block_with_transactions(&self, number: u64) -> LedgerResult<Option<LedgerBlock>>;

    /// Balance of `address` in wei.
    async fn balance(&self, address: Address) -> LedgerResult<U256>;

    async fn chain_id(&self) -> LedgerResult<u64>;
}
