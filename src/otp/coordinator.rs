//! Issue and check OTPs through the contract.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;

use crate::contract::{display_value, ContractError, OtpContract};
use crate::ledger::Transactor;
use crate::observability::metrics::{self, OtpOutcome};
use crate::otp::{OtpError, OtpResult};

/// Drives `generateOTP` / `validateOTP` and reads their events.
#[derive(Clone)]
pub struct OtpCoordinator {
    contract: Arc<OtpContract>,
    transactor: Transactor,
}

impl OtpCoordinator {
    pub fn new(contract: Arc<OtpContract>, transactor: Transactor) -> Self {
        Self {
            contract,
            transactor,
        }
    }

    /// Ask the contract for a fresh OTP and return it as shown to users.
    ///
    /// Blocks until the transaction is mined. The previous OTP, if any, is
    /// no longer valid afterwards.
    pub async fn issue_otp(&self) -> OtpResult<String> {
        let result = self.issue_inner().await;
        match &result {
            Ok(_) => metrics::record_otp_outcome(OtpOutcome::Issued),
            Err(e) => {
                tracing::error!(error = %e, "OTP generation failed");
                metrics::record_otp_outcome(OtpOutcome::Fault);
            }
        }
        result
    }

    async fn issue_inner(&self) -> OtpResult<String> {
        let call = self.contract.generate_call()?;
        let receipt = self.transactor.execute(&call).await?;

        let value = self
            .contract
            .generated_otp(&receipt)?
            .ok_or_else(|| OtpError::MissingEvent {
                event: self.contract.generated_event().to_string(),
                tx_hash: receipt.tx_hash,
            })?;

        let otp = display_value(&value);
        if otp.is_empty() {
            return Err(OtpError::MalformedEvent {
                event: self.contract.generated_event().to_string(),
                field: self.contract.otp_field().to_string(),
                value: format!("{:?}", value),
            });
        }

        tracing::info!(tx_hash = %receipt.tx_hash, "OTP generated");
        Ok(otp)
    }

    /// Check `candidate` against the outstanding OTP.
    ///
    /// A candidate that cannot be expressed as the contract's parameter type
    /// can never match, so it is rejected without sending a transaction.
    pub async fn check_otp(&self, candidate: &str) -> OtpResult<bool> {
        let result = self.check_inner(candidate).await;
        match &result {
            Ok(true) => metrics::record_otp_outcome(OtpOutcome::Valid),
            Ok(false) => metrics::record_otp_outcome(OtpOutcome::Invalid),
            Err(e) => {
                tracing::error!(error = %e, "OTP validation failed");
                metrics::record_otp_outcome(OtpOutcome::Fault);
            }
        }
        result
    }

    async fn check_inner(&self, candidate: &str) -> OtpResult<bool> {
        let call = match self.contract.validate_call(candidate) {
            Ok(call) => call,
            Err(ContractError::Coercion { ty, reason, .. }) => {
                tracing::info!(expected_type = %ty, reason = %reason, "OTP candidate rejected");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let receipt = self.transactor.execute(&call).await?;

        match self.contract.validation_result(&receipt)? {
            Some(DynSolValue::Bool(is_valid)) => {
                tracing::info!(tx_hash = %receipt.tx_hash, is_valid, "OTP checked");
                Ok(is_valid)
            }
            Some(other) => Err(OtpError::MalformedEvent {
                event: self.contract.validated_event().to_string(),
                field: self.contract.valid_field().to_string(),
                value: format!("{:?}", other),
            }),
            None => Err(OtpError::MissingEvent {
                event: self.contract.validated_event().to_string(),
                tx_hash: receipt.tx_hash,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fixtures::{otp_contract, text_otp_contract};
    use crate::ledger::{GasPolicy, LedgerError, MemoryLedger};

    fn coordinator() -> (Arc<MemoryLedger>, OtpCoordinator) {
        coordinator_for(otp_contract())
    }

    fn coordinator_for(contract: OtpContract) -> (Arc<MemoryLedger>, OtpCoordinator) {
        let contract = Arc::new(contract);
        let ledger = Arc::new(MemoryLedger::new(contract.clone()));
        let transactor = Transactor::new(ledger.clone(), GasPolicy::default());
        (ledger, OtpCoordinator::new(contract, transactor))
    }

    #[tokio::test]
    async fn test_issued_otp_validates_exactly_once() {
        let (_, otp) = coordinator();
        let code = otp.issue_otp().await.unwrap();
        assert_eq!(code.len(), 6);

        assert!(otp.check_otp(&code).await.unwrap());
        assert!(!otp.check_otp(&code).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_candidate_fails() {
        let (ledger, otp) = coordinator();
        ledger.script_otps([482_913]);
        assert_eq!(otp.issue_otp().await.unwrap(), "482913");

        assert!(!otp.check_otp("000000").await.unwrap());
        // A miss does not consume the slot
        assert!(otp.check_otp("482913").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_issue_invalidates_first() {
        let (ledger, otp) = coordinator();
        ledger.script_otps([111_111, 222_222]);
        let first = otp.issue_otp().await.unwrap();
        let second = otp.issue_otp().await.unwrap();

        assert!(!otp.check_otp(&first).await.unwrap());
        assert!(otp.check_otp(&second).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_numeric_candidate_sends_nothing() {
        let (ledger, otp) = coordinator();
        otp.issue_otp().await.unwrap();
        let sent = ledger.submissions().len();

        assert!(!otp.check_otp("not-a-code").await.unwrap());
        assert_eq!(ledger.submissions().len(), sent);
    }

    #[tokio::test]
    async fn test_missing_event_is_a_fault() {
        let (ledger, otp) = coordinator();
        ledger.set_drop_events(true);

        let err = otp.issue_otp().await.unwrap_err();
        assert!(matches!(err, OtpError::MissingEvent { ref event, .. } if event == "OTPGenerated"));

        let err = otp.check_otp("123456").await.unwrap_err();
        assert!(matches!(err, OtpError::MissingEvent { ref event, .. } if event == "OTPValidated"));
    }

    #[tokio::test]
    async fn test_node_down_is_a_fault() {
        let (ledger, otp) = coordinator();
        ledger.set_offline(true);

        assert!(matches!(
            otp.issue_otp().await,
            Err(OtpError::Ledger(LedgerError::Unavailable(_)))
        ));
        assert!(matches!(
            otp.check_otp("123456").await,
            Err(OtpError::Ledger(LedgerError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_text_otp_round_trip() {
        let (ledger, otp) = coordinator_for(text_otp_contract());
        ledger.script_otps(["482913"]);
        assert_eq!(otp.issue_otp().await.unwrap(), "482913");

        assert!(!otp.check_otp("000000").await.unwrap());
        assert!(otp.check_otp("482913").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_otp_is_a_fault() {
        let (ledger, otp) = coordinator_for(text_otp_contract());
        ledger.script_otps([""]);

        let err = otp.issue_otp().await.unwrap_err();
        assert!(matches!(
            err,
            OtpError::MalformedEvent { ref event, ref field, .. }
                if event == "OTPGenerated" && field == "otp"
        ));
    }
}
