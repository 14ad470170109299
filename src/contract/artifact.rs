//! Compiled contract artifact (Truffle layout).
//!
//! ```json
//! { "contractName": "...", "abi": [...], "networks": { "5777": { "address": "0x.." } } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use serde::Deserialize;

use crate::contract::{ContractError, ContractResult};

/// The parts of a compiled artifact the relay reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,

    /// Interface description.
    pub abi: JsonAbi,

    /// Deployments keyed by network identifier.
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

/// A deployment of the contract on one network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDeployment {
    pub address: Address,
}

impl ContractArtifact {
    /// Read and parse an artifact file.
    pub fn from_path(path: &Path) -> ContractResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse an artifact from JSON text.
    pub fn from_json(json: &str) -> ContractResult<Self> {
        serde_json::from_str(json).map_err(ContractError::Parse)
    }

    /// Deployed address on `network_id`.
    pub fn address_for(&self, network_id: &str) -> ContractResult<Address> {
        self.networks
            .get(network_id)
            .map(|deployment| deployment.address)
            .ok_or_else(|| ContractError::UnknownNetwork(network_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const FIXTURE: &str = include_str!("../../tests/fixtures/OTPAuthentication.json");

    #[test]
    fn test_parses_truffle_artifact() {
        let artifact = ContractArtifact::from_json(FIXTURE).unwrap();
        assert_eq!(artifact.contract_name.as_deref(), Some("OTPAuthentication"));
        assert!(artifact.abi.function("generateOTP").is_some());
        assert!(artifact.abi.event("OTPValidated").is_some());
        assert_eq!(
            artifact.address_for("5777").unwrap(),
            address!("5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }

    #[test]
    fn test_unknown_network() {
        let artifact = ContractArtifact::from_json(FIXTURE).unwrap();
        let err = artifact.address_for("1").unwrap_err();
        assert!(matches!(err, ContractError::UnknownNetwork(id) if id == "1"));
    }

    #[test]
    fn test_missing_file() {
        let err = ContractArtifact::from_path(Path::new("/nope/OTP.json")).unwrap_err();
        assert!(err.to_string().contains("/nope/OTP.json"));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            ContractArtifact::from_json("{\"abi\": 3}"),
            Err(ContractError::Parse(_))
        ));
    }
}
