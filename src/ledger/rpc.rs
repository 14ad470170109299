//! JSON-RPC ledger backed by an alloy HTTP provider.
//!
//! # Responsibilities
//! - Connect to the node's JSON-RPC endpoint
//! - Query chain state (accounts, block number, blocks, balances)
//! - Estimate, price and send contract calls, then wait for the receipt
//! - Put a deadline on every call

use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::network::{TransactionBuilder, TransactionResponse};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Block, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;

use crate::config::LedgerConfig;
use crate::ledger::types::{
    ContractCall, GasPlan, LedgerBlock, LedgerError, LedgerReceipt, LedgerResult,
    LedgerTransaction,
};
use crate::ledger::wallet::Wallet;
use crate::ledger::Ledger;
use crate::resilience::with_deadline;

/// Ledger node reached over HTTP JSON-RPC.
#[derive(Clone)]
pub struct RpcLedger {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Sender when transactions are signed locally.
    signer: Option<Address>,
    rpc_url: String,
    rpc_timeout: Duration,
    receipt_timeout: Duration,
}

impl RpcLedger {
    /// Build a ledger client. No request is made until the first call.
    ///
    /// # Arguments
    /// * `config` - Ledger configuration
    /// * `wallet` - Local signer; `None` lets the node sign
    pub fn connect(config: &LedgerConfig, wallet: Option<Wallet>) -> LedgerResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let signer = wallet.as_ref().map(Wallet::address);
        let provider: Arc<dyn Provider + Send + Sync> = match wallet {
            Some(wallet) => Arc::new(
                ProviderBuilder::new()
                    .wallet(wallet.ethereum_wallet())
                    .connect_http(url),
            ) as Arc<dyn Provider + Send + Sync>,
            None => Arc::new(ProviderBuilder::new().connect_http(url))
                as Arc<dyn Provider + Send + Sync>,
        };

        tracing::info!(
            rpc_url = %config.rpc_url,
            local_signer = ?signer,
            rpc_timeout_secs = config.rpc_timeout_secs,
            "Ledger client initialized"
        );

        Ok(Self {
            provider,
            signer,
            rpc_url: config.rpc_url.clone(),
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        })
    }

    /// Verify the connected chain ID matches `expected`.
    pub async fn verify_chain_id(&self, expected: u64) -> LedgerResult<()> {
        let actual = self.chain_id().await?;
        if actual != expected {
            return Err(LedgerError::ChainMismatch { expected, actual });
        }
        Ok(())
    }

    fn request(from: Address, call: &ContractCall) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_to(call.to)
            .with_input(call.input.clone())
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn accounts(&self) -> LedgerResult<Vec<Address>> {
        with_deadline(self.rpc_timeout, "accounts", self.provider.get_accounts()).await
    }

    async fn default_account(&self) -> LedgerResult<Address> {
        if let Some(signer) = self.signer {
            return Ok(signer);
        }
        self.accounts()
            .await?
            .first()
            .copied()
            .ok_or(LedgerError::NoAccounts)
    }

    async fn estimate_gas(&self, from: Address, call: &ContractCall) -> LedgerResult<u64> {
        let tx = Self::request(from, call);
        with_deadline(self.rpc_timeout, "estimate_gas", self.provider.estimate_gas(tx)).await
    }

    async fn gas_price(&self) -> LedgerResult<u128> {
        with_deadline(self.rpc_timeout, "gas_price", self.provider.get_gas_price()).await
    }

    async fn submit(
        &self,
        from: Address,
        call: &ContractCall,
        plan: GasPlan,
    ) -> LedgerResult<LedgerReceipt> {
        let tx = Self::request(from, call)
            .with_gas_limit(plan.gas_limit)
            .with_gas_price(plan.gas_price);

        let pending = with_deadline(
            self.rpc_timeout,
            "send_transaction",
            self.provider.send_transaction(tx),
        )
        .await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, method = %call.method, "Transaction sent");

        let receipt =
            with_deadline(self.receipt_timeout, "get_receipt", pending.get_receipt()).await?;
        Ok(receipt_from_rpc(&receipt))
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        with_deadline(self.rpc_timeout, "block_number", self.provider.get_block_number()).await
    }

    async fn block_with_transactions(&self, number: u64) -> LedgerResult<Option<LedgerBlock>> {
        let block = with_deadline(
            self.rpc_timeout,
            "get_block",
            self.provider
                .get_block_by_number(BlockNumberOrTag::Number(number))
                .full(),
        )
        .await?;
        Ok(block.map(block_from_rpc))
    }

    async fn balance(&self, address: Address) -> LedgerResult<U256> {
        with_deadline(self.rpc_timeout, "balance", self.provider.get_balance(address)).await
    }

    async fn chain_id(&self) -> LedgerResult<u64> {
        with_deadline(self.rpc_timeout, "chain_id", self.provider.get_chain_id()).await
    }
}

fn receipt_from_rpc(receipt: &TransactionReceipt) -> LedgerReceipt {
    LedgerReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        success: receipt.status(),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    }
}

fn block_from_rpc(block: Block) -> LedgerBlock {
    let transactions = block
        .transactions
        .txns()
        .map(|tx| LedgerTransaction {
            hash: TransactionResponse::tx_hash(tx),
            from: TransactionResponse::from(tx),
            to: alloy::consensus::Transaction::to(tx),
            value: alloy::consensus::Transaction::value(tx),
        })
        .collect();

    let header = &block.header;
    LedgerBlock {
        number: header.number,
        hash: header.hash,
        parent_hash: header.parent_hash,
        nonce: u64::from_be_bytes(header.nonce.0),
        gas_used: header.gas_used,
        timestamp: header.timestamp,
        transactions,
    }
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("rpc_url", &self.rpc_url)
            .field("signer", &self.signer)
            .field("rpc_timeout", &self.rpc_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> LedgerConfig {
        LedgerConfig {
            // Reserved port on loopback, nothing listens there
            rpc_url: "http://127.0.0.1:9".to_string(),
            rpc_timeout_secs: 2,
            ..LedgerConfig::default()
        }
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = LedgerConfig {
            rpc_url: "not a url".to_string(),
            ..LedgerConfig::default()
        };
        let err = RpcLedger::connect(&config, None).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_client_creation_does_not_touch_network() {
        assert!(RpcLedger::connect(&unreachable_config(), None).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_node_fails_uniformly() {
        let ledger = RpcLedger::connect(&unreachable_config(), None).unwrap();
        assert!(ledger.block_number().await.is_err());
        assert!(ledger.accounts().await.is_err());
        assert!(ledger.default_account().await.is_err());
    }

    #[tokio::test]
    async fn test_local_signer_is_default_account() {
        let wallet = Wallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let expected = wallet.address();
        let ledger = RpcLedger::connect(&unreachable_config(), Some(wallet)).unwrap();
        // Resolved without a round-trip
        assert_eq!(ledger.default_account().await.unwrap(), expected);
    }
}
