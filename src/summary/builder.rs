//! Builds [`BlockSummary`] snapshots from ledger reads.

use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::ledger::{Ledger, LedgerBlock};
use crate::summary::{
    wei_to_ether, AccountBalance, BlockSummary, SummaryError, SummaryResult, TransactionSummary,
};

#[derive(Clone)]
pub struct BlockSummaryBuilder {
    ledger: Arc<dyn Ledger>,
}

impl BlockSummaryBuilder {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Snapshot of the latest block.
    pub async fn latest(&self) -> SummaryResult<BlockSummary> {
        let number = self.ledger.block_number().await?;
        self.build(number, number).await
    }

    /// Snapshot of block `number`; `totalBlocks` is still the latest height.
    pub async fn block(&self, number: u64) -> SummaryResult<BlockSummary> {
        let latest = self.ledger.block_number().await?;
        self.build(number, latest).await
    }

    /// Latest block number.
    pub async fn total_blocks(&self) -> SummaryResult<u64> {
        Ok(self.ledger.block_number().await?)
    }

    async fn build(&self, number: u64, total_blocks: u64) -> SummaryResult<BlockSummary> {
        let block = self
            .ledger
            .block_with_transactions(number)
            .await?
            .ok_or(SummaryError::MissingBlock(number))?;

        let accounts = self.ledger.accounts().await?;
        // One round-trip per account, all in flight at once
        let balances =
            try_join_all(accounts.iter().map(|account| self.ledger.balance(*account))).await?;

        tracing::debug!(
            number,
            transactions = block.transactions.len(),
            accounts = accounts.len(),
            "Block summary built"
        );

        let accounts = accounts
            .into_iter()
            .zip(balances)
            .map(|(address, balance)| AccountBalance {
                address: address.to_string(),
                balance: wei_to_ether(balance),
            })
            .collect();

        Ok(summarize(block, accounts, total_blocks))
    }
}

fn summarize(block: LedgerBlock, accounts: Vec<AccountBalance>, total_blocks: u64) -> BlockSummary {
    let transactions = block
        .transactions
        .into_iter()
        .map(|tx| TransactionSummary {
            hash: tx.hash.to_string(),
            from: tx.from.to_string(),
            to: tx.to.map(|to| to.to_string()),
            value: wei_to_ether(tx.value),
        })
        .collect();

    BlockSummary {
        number: block.number.to_string(),
        hash: block.hash.to_string(),
        parent_hash: block.parent_hash.to_string(),
        nonce: block.nonce.to_string(),
        gas_used: block.gas_used.to_string(),
        timestamp: block.timestamp.to_string(),
        transactions,
        accounts,
        total_blocks: total_blocks.to_string(),
    }
}
