//! gripdash-client - retrying HTTP client for the gripper backend API.
//!
//! The backend hides the real engineering (Modbus transport, reconnect
//! state machine, register encoding) behind a small JSON-over-HTTP surface.
//! This crate wraps that surface:
//!
//! - [`ApiTransport`]: one HTTP exchange, no retry, mockable seam
//! - [`ApiClient`]: per-attempt timeout plus bounded linear-backoff retry
//! - typed wrappers for every backend route, with client-side validation
//!   run before any network call
//!
//! The client never mutates shared state; callers own interpretation of
//! every result.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiRequest, RetryPolicy, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use transport::{ApiTransport, HttpTransport};
pub use types::{
    Ack, ConnectionStatusResponse, DigitalOutputResponse, IndicatorResponse,
    ModbusConnectedResponse, ModbusStatusResponse, ParamReadResponse, ReadAllStatusResponse,
};

#[cfg(any(test, feature = "mocks"))]
pub use transport::MockApiTransport;
