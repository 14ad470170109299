//! Timeout enforcement.
//!
//! Every ledger call gets a deadline; a node that stops answering must not
//! pin a request handler forever. Timeout errors are distinct from RPC errors.

use std::future::IntoFuture;
use std::time::Duration;

use crate::ledger::types::{LedgerError, LedgerResult};

/// Run a ledger operation under a deadline.
///
/// `op` names the call in logs.
pub async fn with_deadline<T, E, F>(limit: Duration, op: &'static str, fut: F) -> LedgerResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(op, error = %e, "Ledger call failed");
            Err(LedgerError::Rpc(format!("{}: {}", op, e)))
        }
        Err(_) => {
            tracing::warn!(op, timeout_secs = limit.as_secs(), "Ledger call timed out");
            Err(LedgerError::Timeout(limit.as_secs()))
        }
    }
}
