//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the contract artifact
//! - Pick and connect the ledger implementation
//! - Build the OTP coordinator and block summary builder
//! - Assemble the HTTP application state

use std::sync::Arc;

use thiserror::Error;

use crate::auth::StaticCredentials;
use crate::config::{ConfigError, LedgerConfig, LedgerMode, RelayConfig};
use crate::contract::{ContractError, OtpContract};
use crate::http::{AppState, SessionGate};
use crate::ledger::{GasPolicy, Ledger, LedgerError, MemoryLedger, RpcLedger, Transactor, Wallet};
use crate::otp::OtpCoordinator;
use crate::session::SessionStore;
use crate::summary::BlockSummaryBuilder;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The workflow services, shared by the HTTP server and `otp-cli`.
#[derive(Clone)]
pub struct Services {
    pub contract: Arc<OtpContract>,
    pub ledger: Arc<dyn Ledger>,
    pub otp: OtpCoordinator,
    pub summary: BlockSummaryBuilder,
}

impl Services {
    /// Wire the services around an already constructed ledger.
    pub fn new(contract: Arc<OtpContract>, ledger: Arc<dyn Ledger>, config: &LedgerConfig) -> Self {
        let transactor = Transactor::new(ledger.clone(), GasPolicy::from_config(config));
        Self {
            otp: OtpCoordinator::new(contract.clone(), transactor),
            summary: BlockSummaryBuilder::new(ledger.clone()),
            contract,
            ledger,
        }
    }
}

/// Load the contract and connect the configured ledger.
pub async fn build_services(config: &RelayConfig) -> Result<Services, StartupError> {
    let contract = Arc::new(OtpContract::load(&config.contract)?);

    let ledger: Arc<dyn Ledger> = match config.ledger.mode {
        LedgerMode::Rpc => {
            let ledger = RpcLedger::connect(&config.ledger, Wallet::from_env()?)?;
            if let Some(expected) = config.ledger.chain_id {
                match ledger.verify_chain_id(expected).await {
                    Ok(()) => tracing::info!(chain_id = expected, "Chain ID verified"),
                    Err(e) => tracing::warn!(error = %e, "Chain ID check failed"),
                }
            }
            Arc::new(ledger)
        }
        LedgerMode::Memory => {
            tracing::warn!("Using the in-memory ledger; nothing is sent to a node");
            Arc::new(MemoryLedger::new(contract.clone()))
        }
    };

    Ok(Services::new(contract, ledger, &config.ledger))
}

/// HTTP application state for `services` under `config`.
pub fn app_state(config: &RelayConfig, services: &Services) -> AppState {
    AppState {
        otp: services.otp.clone(),
        summary: services.summary.clone(),
        ledger: services.ledger.clone(),
        auth: Arc::new(StaticCredentials::from_config(&config.auth)),
        sessions: SessionGate::new(SessionStore::new(), config.session.enforce_order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.ledger.mode = LedgerMode::Memory;
        config.contract.artifact_path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/OTPAuthentication.json"
        )
        .to_string();
        config
    }

    #[tokio::test]
    async fn test_memory_mode_boots() {
        let services = build_services(&memory_config()).await.unwrap();
        assert_eq!(services.ledger.block_number().await.unwrap(), 0);

        let otp = services.otp.issue_otp().await.unwrap();
        assert!(services.otp.check_otp(&otp).await.unwrap());
        assert_eq!(services.summary.total_blocks().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_fatal() {
        let mut config = memory_config();
        config.contract.artifact_path = "/nonexistent/OTPAuthentication.json".to_string();
        let err = build_services(&config).await.err().unwrap();
        assert!(matches!(err, StartupError::Contract(ContractError::Io { .. })));
    }

    #[tokio::test]
    async fn test_app_state_uses_configured_credentials() {
        let mut config = memory_config();
        config.auth.login_id = "operator".to_string();
        let services = build_services(&config).await.unwrap();
        let state = app_state(&config, &services);
        assert!(state.auth.verify("operator", "VVIT"));
        assert!(!state.auth.verify("Admin", "VVIT"));
    }
}
