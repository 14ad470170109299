//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the OTP relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Ledger node connection and gas policy.
    pub ledger: LedgerConfig,

    /// Contract artifact location and ABI names.
    pub contract: ContractConfig,

    /// Credentials checked by the login route.
    pub auth: AuthConfig,

    /// Server-side session ordering.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Which ledger implementation backs the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMode {
    /// A JSON-RPC node reached over HTTP.
    #[default]
    Rpc,
    /// The in-process fake chain.
    Memory,
}

/// Ledger node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub mode: LedgerMode,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID. Checked once at startup when set.
    pub chain_id: Option<u64>,

    /// Timeout for a single RPC call in seconds.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a submitted transaction to be mined.
    pub receipt_timeout_secs: u64,

    /// Gas limit = estimate * multiplier (2.0 doubles the estimate).
    pub gas_limit_multiplier: f64,

    /// Gas price multiplier (1.0 = node price).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Rpc,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: None,
            rpc_timeout_secs: 30,
            receipt_timeout_secs: 60,
            gas_limit_multiplier: 2.0,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: None,
        }
    }
}

/// Contract artifact and the ABI names the OTP workflow relies on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Path to the compiled contract JSON (ABI + deployed addresses).
    pub artifact_path: String,

    /// Key into the artifact's `networks` map.
    pub network_id: String,

    pub generate_method: String,
    pub validate_method: String,
    pub generated_event: String,
    pub otp_field: String,
    pub validated_event: String,
    pub valid_field: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            artifact_path: "build/contracts/OTPAuthentication.json".to_string(),
            network_id: "5777".to_string(),
            generate_method: "generateOTP".to_string(),
            validate_method: "validateOTP".to_string(),
            generated_event: "OTPGenerated".to_string(),
            otp_field: "otp".to_string(),
            validated_event: "OTPValidated".to_string(),
            valid_field: "isValid".to_string(),
        }
    }
}

/// Login credentials for the static authenticator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login_id: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: demo credentials. Change these outside a local setup.
            login_id: "Admin".to_string(),
            password: "VVIT".to_string(),
        }
    }
}

/// Session ordering configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Reject OTP and transfer calls made out of the login -> transfer ->
    /// OTP order.
    pub enforce_order: bool,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allow any origin, method and header.
    pub cors_permissive: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_permissive: true,
            max_body_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_node() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.ledger.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.ledger.mode, LedgerMode::Rpc);
        assert_eq!(config.ledger.gas_limit_multiplier, 2.0);
        assert_eq!(config.contract.network_id, "5777");
        assert!(!config.session.enforce_order);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [ledger]
            mode = "memory"
            gas_limit_multiplier = 1.5

            [contract]
            network_id = "1337"
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.mode, LedgerMode::Memory);
        assert_eq!(config.ledger.gas_limit_multiplier, 1.5);
        assert_eq!(config.ledger.rpc_timeout_secs, 30);
        assert_eq!(config.contract.network_id, "1337");
        assert_eq!(config.contract.generate_method, "generateOTP");
        assert_eq!(config.auth.login_id, "Admin");
    }
}
