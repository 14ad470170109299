//! OTP relay library.
//!
//! An HTTP facade over a one-time-password smart contract on an EVM ledger
//! node, plus a read-only snapshot of the latest block.

pub mod auth;
pub mod config;
pub mod contract;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod otp;
pub mod resilience;
pub mod session;
pub mod summary;
pub mod view;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
