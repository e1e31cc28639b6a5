//! Connection status classification.
//!
//! The backend reports link status as free text, not an enum. The UI it was
//! written for matches on the literal (Chinese) vocabulary the server emits,
//! so this classifier preserves those exact strings; changing them silently
//! breaks state detection. The rules live in one pure function with an
//! exhaustive test table for that reason.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified device link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Link is being established or status is indeterminate.
    Connecting,
    /// Backend reports an established link.
    Connected,
    /// Backend reports a failed, faulted, or lost link.
    Disconnected,
    /// A status poll itself failed; set locally, never by classification.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Exact text the backend reports for an established link.
const CONNECTED_TEXT: &str = "已连接";

/// Substrings marking a failed ("失败"), faulted ("异常"), or lost ("丢失") link.
const DISCONNECTED_MARKERS: [&str; 3] = ["失败", "异常", "丢失"];

/// Classify a free-text status string from the backend.
///
/// Must always run over the full status text of a single response;
/// classifying fragments of two different responses is how stale mixed
/// states appear.
pub fn classify_status(text: &str) -> ConnectionState {
    if text == CONNECTED_TEXT {
        return ConnectionState::Connected;
    }
    if DISCONNECTED_MARKERS.iter().any(|m| text.contains(m)) {
        return ConnectionState::Disconnected;
    }
    ConnectionState::Connecting
}
