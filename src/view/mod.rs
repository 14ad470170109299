//! Block details view-model.
//!
//! The block page is built from typed data: [`BlockDetailsView`] is served
//! as JSON on `/block-details` for the UI to render, and [`render_text`]
//! prints the same view in `otp-cli`.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::summary::{AccountBalance, BlockSummary, TransactionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
}

/// One chart: parallel `labels` / `data` arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub id: String,
    pub kind: ChartKind,
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetailsView {
    pub title: String,
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub gas_used: String,
    /// Seconds since the Unix epoch.
    pub timestamp: String,
    pub transactions: Vec<TransactionSummary>,
    pub accounts: Vec<AccountBalance>,
    pub charts: Vec<ChartSeries>,
}

impl BlockDetailsView {
    pub fn from_summary(summary: &BlockSummary) -> Self {
        let charts = vec![
            ChartSeries {
                id: "gasUsedChart".to_string(),
                kind: ChartKind::Bar,
                label: "Gas Used".to_string(),
                labels: vec!["Gas Used".to_string()],
                data: vec![parse_number(&summary.gas_used)],
            },
            ChartSeries {
                id: "accountBalancesChart".to_string(),
                kind: ChartKind::Bar,
                label: "Account Balances".to_string(),
                labels: summary.accounts.iter().map(|a| a.address.clone()).collect(),
                data: summary
                    .accounts
                    .iter()
                    .map(|a| parse_number(&a.balance))
                    .collect(),
            },
            ChartSeries {
                id: "totalBlocksChart".to_string(),
                kind: ChartKind::Pie,
                label: "Total Blocks".to_string(),
                labels: vec!["Total Blocks".to_string()],
                data: vec![parse_number(&summary.total_blocks)],
            },
        ];

        Self {
            title: format!("Details of Block Number: {}", summary.number),
            number: summary.number.clone(),
            hash: summary.hash.clone(),
            parent_hash: summary.parent_hash.clone(),
            nonce: summary.nonce.clone(),
            gas_used: summary.gas_used.clone(),
            timestamp: summary.timestamp.clone(),
            transactions: summary.transactions.clone(),
            accounts: summary.accounts.clone(),
            charts,
        }
    }

    pub fn chart(&self, id: &str) -> Option<&ChartSeries> {
        self.charts.iter().find(|chart| chart.id == id)
    }
}

// Chart values only; the exact figures stay in the string fields
fn parse_number(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

/// Plain-text rendering for terminals.
pub fn render_text(view: &BlockDetailsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "  Hash:        {}", view.hash);
    let _ = writeln!(out, "  Parent Hash: {}", view.parent_hash);
    let _ = writeln!(out, "  Nonce:       {}", view.nonce);
    let _ = writeln!(out, "  Gas Used:    {}", view.gas_used);
    let _ = writeln!(out, "  Timestamp:   {}", view.timestamp);

    if view.transactions.is_empty() {
        let _ = writeln!(out, "No transactions in this block.");
    } else {
        let _ = writeln!(out, "Transactions:");
        for tx in &view.transactions {
            let _ = writeln!(out, "  Hash:  {}", tx.hash);
            let _ = writeln!(out, "  From:  {}", tx.from);
            let _ = writeln!(out, "  To:    {}", tx.to.as_deref().unwrap_or("(contract creation)"));
            let _ = writeln!(out, "  Value: {} ETH", tx.value);
        }
    }

    if !view.accounts.is_empty() {
        let _ = writeln!(out, "Account Balances:");
        for account in &view.accounts {
            let _ = writeln!(out, "  {}: {} ETH", account.address, account.balance);
        }
    }
    out
}
