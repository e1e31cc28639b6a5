//! Typed backend responses.
//!
//! Field sets mirror what the backend actually sends; anything it omits on
//! some code paths is `#[serde(default)]` so a sparse payload still decodes.

use gripdash_core::ParamReading;
use serde::Deserialize;
use std::collections::BTreeMap;

/// `/get_connection_status`
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionStatusResponse {
    /// Free-text device link status; classified client-side.
    pub status: String,
    #[serde(default)]
    pub modbus_status: Option<String>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub max_attempts: u32,
}

/// `/check_modbus_connected`
#[derive(Debug, Clone, Deserialize)]
pub struct ModbusConnectedResponse {
    pub modbus_connected: bool,
    #[serde(default)]
    pub modbus_status: Option<String>,
    #[serde(default)]
    pub last_check: Option<String>,
}

/// `/check_modbus_status`
#[derive(Debug, Clone, Deserialize)]
pub struct ModbusStatusResponse {
    pub modbus_connected: bool,
    pub modbus_status: String,
    #[serde(default)]
    pub last_check: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
///
/// The retry layer already turns `success: false` into
/// [`crate::ApiError::Rejected`], so a decoded `Ack` always carries
/// `success: true`.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// `/get_digital_output`
#[derive(Debug, Clone, Deserialize)]
pub struct DigitalOutputResponse {
    pub success: bool,
    #[serde(default)]
    pub value: Option<u8>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// `/get_modbus_indicator_digital_output`
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorResponse {
    pub success: bool,
    pub output_number: u8,
}

/// `/read_all_status`
#[derive(Debug, Clone, Deserialize)]
pub struct ReadAllStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub data: BTreeMap<String, ParamReading>,
}

/// `/read_<param>`
#[derive(Debug, Clone, Deserialize)]
pub struct ParamReadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub status_text: Option<String>,
    /// Only `/read_baud_rate` sends this: the rate label behind the index.
    #[serde(default)]
    pub baud_value: Option<String>,
}
