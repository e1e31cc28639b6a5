//! Monitor error types.

use gripdash_client::ApiError;
use thiserror::Error;

/// Errors surfaced by dashboard operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// An identical request is already in flight; this one was dropped
    /// without touching the network or the cache (drop-newest, not
    /// last-one-wins).
    #[error("a status read is already in flight")]
    Busy,

    /// The Modbus link is known down; the operation was refused locally.
    #[error("modbus link is down")]
    ModbusDown,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type alias for monitor operations.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;
