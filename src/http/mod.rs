//! HTTP facade.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span, session gate)
//!     → handlers.rs (OTP coordinator / block summary builder)
//!     → response.rs (typed error → status + {error})
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{SessionGate, X_REQUEST_ID, X_SESSION_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
