//! Error types for gripdash-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{param} value {value} out of range ({expected})")]
    OutOfRange {
        param: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("{param} requires an integer value, got {value}")]
    NotAnInteger { param: &'static str, value: f64 },

    #[error("{param} does not carry a value")]
    NoValue { param: &'static str },

    #[error("{param} has no read endpoint")]
    NotReadable { param: &'static str },

    #[error("digital output port {0} out of range (1-16)")]
    InvalidOutputPort(u8),

    #[error("digital output value must be 0 or 1, got {0}")]
    InvalidOutputValue(u8),
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
