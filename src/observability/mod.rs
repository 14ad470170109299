//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handlers, OTP coordinator, transactor produce:
//!     → logging.rs (tracing subscriber, structured fields)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every handler log line
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
