//! Contract-call submission.
//!
//! # Responsibilities
//! - Resolve the caller account
//! - Estimate gas and derive the gas limit with the configured multiplier
//! - Price the transaction (multiplier + optional ceiling)
//! - Submit and hand back the mined receipt

use std::sync::Arc;
use std::time::Instant;

use crate::config::LedgerConfig;
use crate::ledger::types::{ContractCall, GasPlan, LedgerError, LedgerReceipt, LedgerResult};
use crate::ledger::Ledger;
use crate::observability::metrics;

/// How gas limit and gas price are derived from the node's answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasPolicy {
    /// Gas limit = ceil(estimate * multiplier).
    pub limit_multiplier: f64,
    /// Gas price = node price * multiplier.
    pub price_multiplier: f64,
    /// Refuse to send above this price, after the multiplier.
    pub max_price_gwei: Option<u64>,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            limit_multiplier: 2.0,
            price_multiplier: 1.0,
            max_price_gwei: None,
        }
    }
}

impl GasPolicy {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            limit_multiplier: config.gas_limit_multiplier,
            price_multiplier: config.gas_price_multiplier,
            max_price_gwei: config.max_gas_price_gwei,
        }
    }

    /// Gas limit for a call estimated at `estimate`.
    pub fn gas_limit(&self, estimate: u64) -> u64 {
        (estimate as f64 * self.limit_multiplier).ceil() as u64
    }

    /// Gas price to send with, given the node's current price.
    pub fn gas_price(&self, node_price: u128) -> LedgerResult<u128> {
        let price = (node_price as f64 * self.price_multiplier) as u128;
        if let Some(max_gwei) = self.max_price_gwei {
            if price > max_gwei as u128 * 1_000_000_000 {
                return Err(LedgerError::GasPriceTooHigh {
                    current_gwei: (price / 1_000_000_000) as u64,
                    max_gwei,
                });
            }
        }
        Ok(price)
    }
}

/// Sends contract calls through a [`Ledger`].
#[derive(Clone)]
pub struct Transactor {
    ledger: Arc<dyn Ledger>,
    policy: GasPolicy,
}

impl Transactor {
    pub fn new(ledger: Arc<dyn Ledger>, policy: GasPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Execute `call` and return its receipt.
    ///
    /// A receipt with failed status is turned into `LedgerError::Reverted`.
    pub async fn execute(&self, call: &ContractCall) -> LedgerResult<LedgerReceipt> {
        let start = Instant::now();
        let result = self.execute_inner(call).await;
        metrics::record_ledger_call(&call.method, result.is_ok(), start);
        result
    }

    async fn execute_inner(&self, call: &ContractCall) -> LedgerResult<LedgerReceipt> {
        let from = self.ledger.default_account().await?;
        let estimate = self.ledger.estimate_gas(from, call).await?;
        let node_price = self.ledger.gas_price().await?;

        let plan = GasPlan {
            gas_limit: self.policy.gas_limit(estimate),
            gas_price: self.policy.gas_price(node_price)?,
        };

        tracing::debug!(
            method = %call.method,
            from = %from,
            estimate,
            gas_limit = plan.gas_limit,
            gas_price = plan.gas_price,
            "Submitting contract call"
        );

        let receipt = self.ledger.submit(from, call, plan).await?;
        if !receipt.success {
            return Err(LedgerError::Reverted(format!(
                "{} in transaction {}",
                call.method, receipt.tx_hash
            )));
        }

        tracing::info!(
            method = %call.method,
            tx_hash = %receipt.tx_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Contract call mined"
        );
        Ok(receipt)
    }
}
