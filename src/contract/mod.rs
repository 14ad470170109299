//! OTP contract descriptor.
//!
//! # Data Flow
//! ```text
//! artifact JSON (read once at startup)
//!     → artifact.rs (ABI + address for the configured network)
//!     → OtpContract (resolved methods, events, field names)
//!     → encodes ContractCall for the transactor
//!     → decodes OTPGenerated / OTPValidated out of receipt logs
//! ```
//!
//! The ABI is used dynamically, so contracts whose `validateOTP` takes a
//! `string` or `bytes32` instead of a `uint256` work without a rebuild.

pub mod artifact;

use alloy::dyn_abi::{DynSolType, DynSolValue, EventExt, JsonAbiExt, Specifier};
use alloy::json_abi::{Event, Function};
use alloy::primitives::{keccak256, Address, Log, B256};
use thiserror::Error;

use crate::config::ContractConfig;
use crate::ledger::types::{ContractCall, LedgerReceipt};

pub use artifact::ContractArtifact;

/// Errors raised while loading the artifact or (de)coding contract data.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Cannot read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Contract is not deployed on network {0}")]
    UnknownNetwork(String),

    #[error("ABI has no function named {0}")]
    MissingFunction(String),

    #[error("ABI has no event named {0}")]
    MissingEvent(String),

    #[error("Event {event} has no field named {field}")]
    MissingField { event: String, field: String },

    #[error("{method} takes {actual} arguments, expected {expected}")]
    Arity {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot coerce {input:?} to {ty}: {reason}")]
    Coercion {
        ty: String,
        input: String,
        reason: String,
    },

    #[error("ABI error: {0}")]
    Abi(String),
}

pub type ContractResult<T> = Result<T, ContractError>;

/// A decoded call to the OTP contract.
#[derive(Debug, Clone, PartialEq)]
pub enum OtpCall {
    Generate,
    Validate(DynSolValue),
}

/// The OTP contract, resolved against its ABI.
#[derive(Debug, Clone)]
pub struct OtpContract {
    name: String,
    address: Address,
    generate: Function,
    validate: Function,
    candidate_type: DynSolType,
    generated: Event,
    otp_field: String,
    validated: Event,
    valid_field: String,
}

impl OtpContract {
    /// Read the artifact named in the config and resolve the OTP interface.
    pub fn load(config: &ContractConfig) -> ContractResult<Self> {
        let artifact = ContractArtifact::from_path(std::path::Path::new(&config.artifact_path))?;
        Self::from_artifact(artifact, config)
    }

    /// Resolve the OTP interface from an already parsed artifact.
    pub fn from_artifact(artifact: ContractArtifact, config: &ContractConfig) -> ContractResult<Self> {
        let address = artifact.address_for(&config.network_id)?;
        let abi = &artifact.abi;

        let generate = find_function(abi, &config.generate_method, 0)?;
        let validate = find_function(abi, &config.validate_method, 1)?;
        let candidate_type = validate.inputs[0]
            .resolve()
            .map_err(|e| ContractError::Abi(e.to_string()))?;

        let generated = find_event(abi, &config.generated_event, &config.otp_field)?;
        let validated = find_event(abi, &config.validated_event, &config.valid_field)?;

        let name = artifact
            .contract_name
            .clone()
            .unwrap_or_else(|| "OTPAuthentication".to_string());

        tracing::info!(
            contract = %name,
            address = %address,
            network_id = %config.network_id,
            candidate_type = %candidate_type.sol_type_name(),
            "Contract artifact loaded"
        );

        Ok(Self {
            name,
            address,
            generate,
            validate,
            candidate_type,
            generated,
            otp_field: config.otp_field.clone(),
            validated,
            valid_field: config.valid_field.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn generated_event(&self) -> &str {
        &self.generated.name
    }

    pub fn validated_event(&self) -> &str {
        &self.validated.name
    }

    pub fn otp_field(&self) -> &str {
        &self.otp_field
    }

    pub fn valid_field(&self) -> &str {
        &self.valid_field
    }

    /// Call that asks the contract for a fresh OTP.
    pub fn generate_call(&self) -> ContractResult<ContractCall> {
        let input = self
            .generate
            .abi_encode_input(&[])
            .map_err(|e| ContractError::Abi(e.to_string()))?;
        Ok(self.call(&self.generate, input))
    }

    /// Call that checks `candidate` against the outstanding OTP.
    ///
    /// The candidate is coerced to the method's parameter type; a value that
    /// does not fit is a `Coercion` error.
    pub fn validate_call(&self, candidate: &str) -> ContractResult<ContractCall> {
        let value = self
            .candidate_type
            .coerce_str(candidate.trim())
            .map_err(|e| ContractError::Coercion {
                ty: self.candidate_type.sol_type_name().into_owned(),
                input: candidate.to_string(),
                reason: e.to_string(),
            })?;
        let input = self
            .validate
            .abi_encode_input(&[value])
            .map_err(|e| ContractError::Abi(e.to_string()))?;
        Ok(self.call(&self.validate, input))
    }

    fn call(&self, function: &Function, input: Vec<u8>) -> ContractCall {
        ContractCall {
            to: self.address,
            input: input.into(),
            method: function.name.clone(),
        }
    }

    /// The OTP carried by the first `OTPGenerated` log, if any.
    pub fn generated_otp(&self, receipt: &LedgerReceipt) -> ContractResult<Option<DynSolValue>> {
        self.find_field(receipt, &self.generated, &self.otp_field)
    }

    /// The verdict carried by the first `OTPValidated` log, if any.
    pub fn validation_result(&self, receipt: &LedgerReceipt) -> ContractResult<Option<DynSolValue>> {
        self.find_field(receipt, &self.validated, &self.valid_field)
    }

    fn find_field(
        &self,
        receipt: &LedgerReceipt,
        event: &Event,
        field: &str,
    ) -> ContractResult<Option<DynSolValue>> {
        let selector = event.selector();
        let log = receipt.logs.iter().find(|log| {
            log.address == self.address && log.data.topics().first() == Some(&selector)
        });
        let Some(log) = log else {
            return Ok(None);
        };

        let decoded = event
            .decode_log(&log.data)
            .map_err(|e| ContractError::Abi(e.to_string()))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        for input in &event.inputs {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            };
            if input.name == field {
                return Ok(value);
            }
        }
        Ok(None)
    }

    /// Decode contract input back into an [`OtpCall`].
    pub fn decode_call(&self, input: &[u8]) -> Option<OtpCall> {
        if input.len() < 4 {
            return None;
        }
        let (selector, args) = input.split_at(4);
        if selector == self.generate.selector().as_slice() {
            return Some(OtpCall::Generate);
        }
        if selector == self.validate.selector().as_slice() {
            let mut values = self.validate.abi_decode_input(args).ok()?;
            return values.pop().map(OtpCall::Validate);
        }
        None
    }

    /// Candidate parameter type of the validate method.
    pub fn candidate_type(&self) -> &DynSolType {
        &self.candidate_type
    }

    /// Build the log the contract emits after generating `otp` for `caller`.
    pub fn generated_log(&self, caller: Address, otp: DynSolValue) -> ContractResult<Log> {
        self.encode_log(&self.generated, &self.otp_field, otp, caller)
    }

    /// Build the log the contract emits after validating for `caller`.
    pub fn validated_log(&self, caller: Address, is_valid: bool) -> ContractResult<Log> {
        self.encode_log(
            &self.validated,
            &self.valid_field,
            DynSolValue::Bool(is_valid),
            caller,
        )
    }

    /// Encode an event where `field` carries `value` and any address
    /// parameter is the caller.
    fn encode_log(
        &self,
        event: &Event,
        field: &str,
        value: DynSolValue,
        caller: Address,
    ) -> ContractResult<Log> {
        let mut topics = vec![event.selector()];
        let mut body = Vec::new();
        for input in &event.inputs {
            let param = if input.name == field {
                value.clone()
            } else if input.ty == "address" {
                DynSolValue::Address(caller)
            } else {
                return Err(ContractError::Abi(format!(
                    "cannot fill {}.{} of type {}",
                    event.name, input.name, input.ty
                )));
            };
            if input.indexed {
                topics.push(topic_for(&param));
            } else {
                body.push(param);
            }
        }
        let data = DynSolValue::Tuple(body).abi_encode_params();
        Ok(Log::new_unchecked(self.address, topics, data.into()))
    }
}

fn topic_for(value: &DynSolValue) -> B256 {
    value
        .as_word()
        .unwrap_or_else(|| keccak256(value.abi_encode_packed()))
}

fn find_function(
    abi: &alloy::json_abi::JsonAbi,
    name: &str,
    arity: usize,
) -> ContractResult<Function> {
    let function = abi
        .function(name)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity).or(overloads.first()))
        .ok_or_else(|| ContractError::MissingFunction(name.to_string()))?;
    if function.inputs.len() != arity {
        return Err(ContractError::Arity {
            method: name.to_string(),
            expected: arity,
            actual: function.inputs.len(),
        });
    }
    Ok(function.clone())
}

fn find_event(abi: &alloy::json_abi::JsonAbi, name: &str, field: &str) -> ContractResult<Event> {
    let event = abi
        .event(name)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| ContractError::MissingEvent(name.to_string()))?;
    if !event.inputs.iter().any(|input| input.name == field) {
        return Err(ContractError::MissingField {
            event: name.to_string(),
            field: field.to_string(),
        });
    }
    Ok(event.clone())
}

/// Render a decoded ABI value the way it is shown to users.
pub fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::FixedBytes(word, size) => alloy::primitives::hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(bytes) => alloy::primitives::hex::encode_prefixed(bytes),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) const ARTIFACT: &str = include_str!("../../tests/fixtures/OTPAuthentication.json");

    pub(crate) fn otp_contract() -> OtpContract {
        let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
        OtpContract::from_artifact(artifact, &ContractConfig::default()).unwrap()
    }

    /// Same contract with `string` OTPs.
    pub(crate) const TEXT_ARTIFACT: &str =
        include_str!("../../tests/fixtures/OTPAuthenticationText.json");

    pub(crate) fn text_otp_contract() -> OtpContract {
        let artifact = ContractArtifact::from_json(TEXT_ARTIFACT).unwrap();
        OtpContract::from_artifact(artifact, &ContractConfig::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{otp_contract, ARTIFACT};
    use super::*;
    use alloy::primitives::{address, U256};

    fn receipt_with(logs: Vec<Log>) -> LedgerReceipt {
        LedgerReceipt {
            tx_hash: B256::ZERO,
            block_number: Some(1),
            gas_used: 21_000,
            success: true,
            logs,
        }
    }

    #[test]
    fn test_generate_call_is_bare_selector() {
        let contract = otp_contract();
        assert_eq!(contract.name(), "OTPAuthentication");
        let call = contract.generate_call().unwrap();
        assert_eq!(call.input.len(), 4);
        assert_eq!(call.to, contract.address());
        assert_eq!(call.method, "generateOTP");
        assert_eq!(contract.decode_call(&call.input), Some(OtpCall::Generate));
    }

    #[test]
    fn test_validate_call_coerces_candidate() {
        let contract = otp_contract();
        let call = contract.validate_call("482913").unwrap();
        assert_eq!(call.input.len(), 4 + 32);
        assert_eq!(
            contract.decode_call(&call.input),
            Some(OtpCall::Validate(DynSolValue::Uint(U256::from(482913u64), 256)))
        );
    }

    #[test]
    fn test_validate_call_rejects_non_numeric_candidate() {
        let contract = otp_contract();
        let err = contract.validate_call("12ab").unwrap_err();
        assert!(matches!(err, ContractError::Coercion { ref ty, .. } if ty == "uint256"));
    }

    #[test]
    fn test_generated_otp_roundtrips_through_log() {
        let contract = otp_contract();
        let caller = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let log = contract
            .generated_log(caller, DynSolValue::Uint(U256::from(482913u64), 256))
            .unwrap();
        assert_eq!(log.data.topics().len(), 2);

        let value = contract.generated_otp(&receipt_with(vec![log])).unwrap().unwrap();
        assert_eq!(display_value(&value), "482913");
    }

    #[test]
    fn test_validation_result_ignores_other_contracts() {
        let contract = otp_contract();
        let caller = Address::ZERO;
        let mut foreign = contract.validated_log(caller, true).unwrap();
        foreign.address = address!("0000000000000000000000000000000000000bad");

        let receipt = receipt_with(vec![foreign]);
        assert!(contract.validation_result(&receipt).unwrap().is_none());

        let own = contract.validated_log(caller, false).unwrap();
        let receipt = receipt_with(vec![own]);
        assert_eq!(
            contract.validation_result(&receipt).unwrap(),
            Some(DynSolValue::Bool(false))
        );
    }

    #[test]
    fn test_missing_event_in_receipt() {
        let contract = otp_contract();
        assert!(contract.generated_otp(&receipt_with(vec![])).unwrap().is_none());
    }

    #[test]
    fn test_unknown_method_name() {
        let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
        let config = ContractConfig {
            generate_method: "mintOTP".into(),
            ..ContractConfig::default()
        };
        let err = OtpContract::from_artifact(artifact, &config).unwrap_err();
        assert!(matches!(err, ContractError::MissingFunction(name) if name == "mintOTP"));
    }

    #[test]
    fn test_unknown_event_field() {
        let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
        let config = ContractConfig {
            otp_field: "code".into(),
            ..ContractConfig::default()
        };
        let err = OtpContract::from_artifact(artifact, &config).unwrap_err();
        assert!(matches!(err, ContractError::MissingField { .. }));
    }

    #[test]
    fn test_wrong_arity() {
        let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
        let config = ContractConfig {
            validate_method: "generateOTP".into(),
            ..ContractConfig::default()
        };
        let err = OtpContract::from_artifact(artifact, &config).unwrap_err();
        assert!(matches!(err, ContractError::Arity { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&DynSolValue::String("A1B2".into())), "A1B2");
        assert_eq!(display_value(&DynSolValue::Bool(true)), "true");
        assert_eq!(
            display_value(&DynSolValue::FixedBytes(B256::repeat_byte(0xab), 2)),
            "0xabab"
        );
    }
}
