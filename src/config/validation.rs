//! Configuration validation.
//!
//! Serde handles syntax; this checks values the relay cannot run with.
//! Every problem is reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are required",
            ));
        }
    }

    let ledger = &config.ledger;
    if ledger.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "ledger.rpc_url",
            format!("'{}' is not a URL", ledger.rpc_url),
        ));
    }
    if ledger.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.rpc_timeout_secs", "must be > 0"));
    }
    if ledger.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.receipt_timeout_secs", "must be > 0"));
    }
    if !ledger.gas_limit_multiplier.is_finite() || ledger.gas_limit_multiplier < 1.0 {
        errors.push(ValidationError::new(
            "ledger.gas_limit_multiplier",
            "must be >= 1.0",
        ));
    }
    if !ledger.gas_price_multiplier.is_finite() || ledger.gas_price_multiplier <= 0.0 {
        errors.push(ValidationError::new(
            "ledger.gas_price_multiplier",
            "must be > 0",
        ));
    }

    let contract = &config.contract;
    let names = [
        ("contract.artifact_path", &contract.artifact_path),
        ("contract.network_id", &contract.network_id),
        ("contract.generate_method", &contract.generate_method),
        ("contract.validate_method", &contract.validate_method),
        ("contract.generated_event", &contract.generated_event),
        ("contract.otp_field", &contract.otp_field),
        ("contract.validated_event", &contract.validated_event),
        ("contract.valid_field", &contract.valid_field),
    ];
    for (field, value) in names {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
