//! Status cache: the single owned state container.
//!
//! Last-known mirror of device link, Modbus health, digital-output, and
//! bulk parameter state. Created with "unknown" values at startup, updated
//! by successful poll responses only; a failed poll forces an explicit
//! Disconnected/Error state and never leaves a partial overwrite behind.
//!
//! Every mutation bumps a watch channel; the render loop subscribes to it
//! instead of being called directly.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

use gripdash_core::{
    classify_status, ConnectionSnapshot, ConnectionState, DigitalOutputState, ModbusHealth,
    OutputChange, ParamReading, ParamSnapshot, PendingFlag,
};

/// One connection poll result, combining `/get_connection_status` and
/// `/check_modbus_connected`. Applied atomically so classification always
/// runs over one full payload.
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    pub status_text: String,
    pub attempts: u32,
    pub max_attempts: u32,
    pub modbus_connected: bool,
    pub modbus_status: Option<String>,
}

/// In-memory mirror of last-known device state.
pub struct StatusCache {
    connection: RwLock<ConnectionSnapshot>,
    modbus: RwLock<ModbusHealth>,
    output: RwLock<DigitalOutputState>,
    params: RwLock<Option<ParamSnapshot>>,
    /// Whether the view is visible; hidden views suppress all polling.
    visible: AtomicBool,
    connection_pending: PendingFlag,
    output_pending: PendingFlag,
    read_all_pending: PendingFlag,
    version: watch::Sender<u64>,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCache {
    /// Create a cache with unknown values; lives for the session.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            connection: RwLock::new(ConnectionSnapshot::unknown()),
            modbus: RwLock::new(ModbusHealth::unknown()),
            output: RwLock::new(DigitalOutputState::default()),
            params: RwLock::new(None),
            visible: AtomicBool::new(true),
            connection_pending: PendingFlag::new(),
            output_pending: PendingFlag::new(),
            read_all_pending: PendingFlag::new(),
            version,
        }
    }

    /// Subscribe to change notifications. The value is a bare version
    /// counter; subscribers re-read whatever state they render.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    // ---- application of poll results -----------------------------------

    /// Apply one connection poll result.
    ///
    /// Success overwrites both the connection snapshot and Modbus health in
    /// full; the two are never merged across responses. Failure is the
    /// fail-safe path: assume disconnected unless proven otherwise.
    pub fn apply_connection_status(&self, result: Result<ConnectionReport, String>) {
        match result {
            Ok(report) => {
                let state = classify_status(&report.status_text);
                *self.connection.write() = ConnectionSnapshot {
                    state,
                    status_text: report.status_text,
                    attempts: report.attempts,
                    max_attempts: report.max_attempts,
                };
                // Full overwrite, including the text: carrying a stale
                // description next to a fresh boolean is still a merge.
                *self.modbus.write() = ModbusHealth {
                    connected: report.modbus_connected,
                    status_text: report.modbus_status.unwrap_or_default(),
                    last_checked_at: Some(Utc::now()),
                };
            }
            Err(reason) => {
                let mut connection = self.connection.write();
                connection.state = ConnectionState::Error;
                connection.status_text = reason.clone();
                connection.attempts = 0;
                connection.max_attempts = 0;
                drop(connection);

                let mut modbus = self.modbus.write();
                modbus.connected = false;
                modbus.status_text = reason;
                modbus.last_checked_at = Some(Utc::now());
            }
        }
        self.bump();
    }

    /// Apply one Modbus health poll result.
    pub fn apply_modbus_health(&self, connected: bool, status_text: String) {
        let mut modbus = self.modbus.write();
        modbus.connected = connected;
        modbus.status_text = status_text;
        modbus.last_checked_at = Some(Utc::now());
        drop(modbus);
        self.bump();
    }

    /// Force Modbus health down with a reason, without touching the
    /// connection snapshot. Used when a rejected bulk read reveals the
    /// link is gone.
    pub fn mark_modbus_down(&self, reason: &str) {
        self.apply_modbus_health(false, reason.to_string());
    }

    /// Apply a digital-output read. Cached only when `output` is the
    /// current indicator port; a read of any other port is informational
    /// and must not corrupt the displayed indicator state. Returns whether
    /// the value was cached.
    pub fn apply_digital_output(&self, output: u8, value: u8) -> bool {
        let mut state = self.output.write();
        if output != state.indicator_port {
            debug!(
                output,
                indicator = state.indicator_port,
                "digital output read for non-indicator port, not cached"
            );
            return false;
        }
        state.value = Some(value);
        drop(state);
        self.bump();
        true
    }

    /// Record an output change in the bounded history (newest first).
    pub fn record_output_change(&self, value: u8, reason: &str, output: u8) {
        self.output.write().record(OutputChange {
            output,
            value,
            reason: reason.to_string(),
            at: Utc::now(),
        });
        self.bump();
    }

    /// Select which port mirrors Modbus health. The cached value is reset;
    /// the next output poll refills it for the new port.
    pub fn set_indicator_port(&self, output: u8) {
        let mut state = self.output.write();
        if state.indicator_port != output {
            state.indicator_port = output;
            state.value = None;
        }
        drop(state);
        self.bump();
    }

    /// Replace the bulk parameter snapshot wholesale.
    pub fn apply_param_snapshot(&self, snapshot: ParamSnapshot) {
        *self.params.write() = Some(snapshot);
        self.bump();
    }

    /// Update a single reading inside the current snapshot, if one exists.
    /// Single-parameter reads refresh what is displayed but never create a
    /// half-populated snapshot.
    pub fn apply_param_reading(&self, name: &str, reading: ParamReading) {
        let mut params = self.params.write();
        if let Some(snapshot) = params.as_mut() {
            snapshot.readings.insert(name.to_string(), reading);
            drop(params);
            self.bump();
        }
    }

    // ---- accessors ------------------------------------------------------

    pub fn connection(&self) -> ConnectionSnapshot {
        self.connection.read().clone()
    }

    pub fn modbus(&self) -> ModbusHealth {
        self.modbus.read().clone()
    }

    pub fn modbus_connected(&self) -> bool {
        self.modbus.read().connected
    }

    pub fn output(&self) -> DigitalOutputState {
        self.output.read().clone()
    }

    pub fn indicator_port(&self) -> u8 {
        self.output.read().indicator_port
    }

    pub fn params(&self) -> Option<ParamSnapshot> {
        self.params.read().clone()
    }

    /// Whether polling should run at all (the view is visible).
    pub fn visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Set by the embedding app when its view is shown or hidden.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    // ---- pending flags --------------------------------------------------

    pub fn connection_pending(&self) -> &PendingFlag {
        &self.connection_pending
    }

    pub fn output_pending(&self) -> &PendingFlag {
        &self.output_pending
    }

    pub fn read_all_pending(&self) -> &PendingFlag {
        &self.read_all_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gripdash_core::HISTORY_LIMIT;
    use std::collections::BTreeMap;

    fn report(status: &str, modbus: bool) -> ConnectionReport {
        ConnectionReport {
            status_text: status.to_string(),
            attempts: 1,
            max_attempts: 5,
            modbus_connected: modbus,
            modbus_status: Some(if modbus { "已连接 (响应: 2ms)" } else { "读取失败" }.to_string()),
        }
    }

    #[test]
    fn starts_unknown() {
        let cache = StatusCache::new();
        assert_eq!(cache.connection().state, ConnectionState::Connecting);
        assert!(!cache.modbus_connected());
        assert!(cache.params().is_none());
        assert!(cache.output().value.is_none());
        assert!(cache.visible());
    }

    #[test]
    fn connection_state_reflects_only_latest_response() {
        let cache = StatusCache::new();

        cache.apply_connection_status(Ok(report("已连接", true)));
        assert_eq!(cache.connection().state, ConnectionState::Connected);
        assert!(cache.modbus_connected());

        // A later response fully replaces the earlier one; nothing merges.
        cache.apply_connection_status(Ok(ConnectionReport {
            status_text: "连接丢失".to_string(),
            attempts: 3,
            max_attempts: 5,
            modbus_connected: false,
            modbus_status: None,
        }));
        let connection = cache.connection();
        assert_eq!(connection.state, ConnectionState::Disconnected);
        assert_eq!(connection.status_text, "连接丢失");
        assert_eq!(connection.attempts, 3);
        assert!(!cache.modbus_connected());
        // Absent text overwrites too; no field survives from the first
        // response.
        assert_eq!(cache.modbus().status_text, "");
    }

    #[test]
    fn failed_poll_forces_error_and_modbus_down() {
        let cache = StatusCache::new();
        cache.apply_connection_status(Ok(report("已连接", true)));

        cache.apply_connection_status(Err("network error: connection refused".to_string()));
        let connection = cache.connection();
        assert_eq!(connection.state, ConnectionState::Error);
        // The failure overwrite is total; no counter survives from the
        // earlier successful response.
        assert_eq!(connection.attempts, 0);
        assert_eq!(connection.max_attempts, 0);
        assert!(!cache.modbus_connected());
        assert!(cache.modbus().last_checked_at.is_some());
    }

    #[test]
    fn non_indicator_port_read_is_not_cached() {
        let cache = StatusCache::new();
        cache.set_indicator_port(2);
        assert!(cache.apply_digital_output(2, 1));
        assert_eq!(cache.output().value, Some(1));

        // Port 5 is not the indicator: informational only.
        assert!(!cache.apply_digital_output(5, 0));
        assert_eq!(cache.output().value, Some(1));
    }

    #[test]
    fn changing_indicator_port_resets_cached_value() {
        let cache = StatusCache::new();
        cache.apply_digital_output(1, 1);
        assert_eq!(cache.output().value, Some(1));

        cache.set_indicator_port(4);
        assert!(cache.output().value.is_none());
    }

    #[test]
    fn history_stays_bounded_through_the_cache() {
        let cache = StatusCache::new();
        for i in 0..(HISTORY_LIMIT + 10) {
            cache.record_output_change((i % 2) as u8, &format!("change {i}"), 1);
        }
        let output = cache.output();
        assert_eq!(output.history.len(), HISTORY_LIMIT);
        assert_eq!(output.history[0].reason, format!("change {}", HISTORY_LIMIT + 9));
    }

    #[test]
    fn param_snapshot_replaces_wholesale() {
        let cache = StatusCache::new();

        let mut first = BTreeMap::new();
        first.insert("gripper_id".to_string(), ParamReading {
            success: true,
            value: Some(1.0),
            ..Default::default()
        });
        first.insert("motor_enable".to_string(), ParamReading {
            success: true,
            value: Some(1.0),
            ..Default::default()
        });
        cache.apply_param_snapshot(ParamSnapshot::new(first));

        let mut second = BTreeMap::new();
        second.insert("gripper_id".to_string(), ParamReading {
            success: true,
            value: Some(9.0),
            ..Default::default()
        });
        cache.apply_param_snapshot(ParamSnapshot::new(second));

        let params = cache.params().unwrap();
        assert_eq!(params.get("gripper_id").and_then(|r| r.value), Some(9.0));
        // motor_enable came from the first snapshot only; it must be gone.
        assert!(params.get("motor_enable").is_none());
    }

    #[test]
    fn single_reading_updates_but_never_creates_a_snapshot() {
        let cache = StatusCache::new();
        cache.apply_param_reading("gripper_id", ParamReading::default());
        assert!(cache.params().is_none());

        cache.apply_param_snapshot(ParamSnapshot::new(BTreeMap::new()));
        cache.apply_param_reading("gripper_id", ParamReading {
            success: true,
            value: Some(3.0),
            ..Default::default()
        });
        assert_eq!(
            cache.params().unwrap().get("gripper_id").and_then(|r| r.value),
            Some(3.0)
        );
    }

    #[tokio::test]
    async fn mutations_notify_subscribers() {
        let cache = StatusCache::new();
        let mut rx = cache.subscribe();
        let before = *rx.borrow_and_update();

        cache.apply_modbus_health(true, "已连接 (响应: 1ms)".to_string());
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update() > before);
    }
}
