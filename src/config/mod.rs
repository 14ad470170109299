//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to lifecycle::startup, which builds the subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the contract artifact it points to is
//!   read once at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AuthConfig, ContractConfig, LedgerConfig, LedgerMode, ListenerConfig, ObservabilityConfig,
    RelayConfig, SecurityConfig, SessionConfig, TimeoutConfig, TlsConfig,
};
