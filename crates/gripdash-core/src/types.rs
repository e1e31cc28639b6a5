//! Cached dashboard state types.
//!
//! These are the in-memory mirrors of what the backend last told us. They
//! carry no polling logic themselves; the monitor crate owns when and how
//! they are overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::status::ConnectionState;

/// Maximum number of digital-output change records retained, newest first.
pub const HISTORY_LIMIT: usize = 50;

/// Lowest valid digital-output port on the device.
pub const OUTPUT_PORT_MIN: u8 = 1;
/// Highest valid digital-output port on the device.
pub const OUTPUT_PORT_MAX: u8 = 16;

/// Last-known device link status, mirror of `/get_connection_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    /// Classified link state.
    pub state: ConnectionState,
    /// Raw status text as the backend reported it.
    pub status_text: String,
    /// Reconnect attempts the backend has made so far.
    pub attempts: u32,
    /// Backend's reconnect attempt ceiling.
    pub max_attempts: u32,
}

impl ConnectionSnapshot {
    /// Startup value before any poll has answered.
    pub fn unknown() -> Self {
        Self {
            state: ConnectionState::Connecting,
            status_text: String::new(),
            attempts: 0,
            max_attempts: 0,
        }
    }
}

/// Last-known Modbus link health.
///
/// Tracked independently of [`ConnectionSnapshot`]; control enablement
/// follows this flag, not the device link classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusHealth {
    /// Whether the backend currently holds a working Modbus link.
    pub connected: bool,
    /// Free-text health description from the backend.
    pub status_text: String,
    /// When the health was last checked (local clock).
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ModbusHealth {
    /// Startup value: assume disconnected until proven otherwise.
    pub fn unknown() -> Self {
        Self {
            connected: false,
            status_text: String::new(),
            last_checked_at: None,
        }
    }
}

/// One recorded digital-output change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputChange {
    /// Output port the change was written to.
    pub output: u8,
    /// Written value, 0 or 1.
    pub value: u8,
    /// Why the change happened (operator action, health indicator, ...).
    pub reason: String,
    /// When the change was recorded.
    pub at: DateTime<Utc>,
}

/// Cached digital-output view: the selected indicator port, its last value,
/// and a bounded change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalOutputState {
    /// Port currently mirroring Modbus health.
    pub indicator_port: u8,
    /// Last value read for the indicator port; `None` until first read.
    pub value: Option<u8>,
    /// Change log, newest first, at most [`HISTORY_LIMIT`] entries.
    pub history: VecDeque<OutputChange>,
}

impl Default for DigitalOutputState {
    fn default() -> Self {
        Self {
            indicator_port: OUTPUT_PORT_MIN,
            value: None,
            history: VecDeque::new(),
        }
    }
}

impl DigitalOutputState {
    /// Record a change, newest first. Append-then-truncate: the new entry
    /// always survives, the oldest entry is what falls off.
    pub fn record(&mut self, change: OutputChange) {
        self.history.push_front(change);
        self.history.truncate(HISTORY_LIMIT);
    }
}

/// One parameter entry inside a `/read_all_status` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamReading {
    /// Whether the individual register read succeeded.
    #[serde(default)]
    pub success: bool,
    /// Numeric value, when the read succeeded.
    #[serde(default)]
    pub value: Option<f64>,
    /// Backend message for this register.
    #[serde(default)]
    pub message: Option<String>,
    /// Human-readable rendering (enable/disable labels, init phases, ...).
    #[serde(default)]
    pub status_text: Option<String>,
}

/// Full decoded `/read_all_status` snapshot.
///
/// Applied wholesale: either a whole new snapshot replaces the old one, or
/// the old one stays. Field-by-field merging of two responses is never done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSnapshot {
    /// When the snapshot was taken (local clock).
    pub taken_at: DateTime<Utc>,
    /// Parameter name -> reading, as keyed by the backend.
    pub readings: BTreeMap<String, ParamReading>,
}

impl ParamSnapshot {
    pub fn new(readings: BTreeMap<String, ParamReading>) -> Self {
        Self {
            taken_at: Utc::now(),
            readings,
        }
    }

    /// Look up one reading by its backend key.
    pub fn get(&self, name: &str) -> Option<&ParamReading> {
        self.readings.get(name)
    }
}
