//! Dashboard controller.
//!
//! Applies poll results to the cache under the full-overwrite discipline
//! and forwards user-issued writes. Every failure path degrades into a
//! notification plus fail-safe cache state; nothing here can take the
//! polling loop down.

use std::sync::Arc;
use tracing::{debug, warn};

use gripdash_client::{ApiClient, ApiError, ApiResult, ApiTransport};
use gripdash_core::{Param, ParamReading, ParamSnapshot};

use crate::cache::{ConnectionReport, StatusCache};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::notifier::Notifier;
use crate::scheduler::{PollKind, PollScheduler};

/// Marker the backend embeds in rejection messages when the Modbus link is
/// gone; seeing it demotes cached health immediately.
const LINK_DOWN_MARKER: &str = "未连接";

/// Orchestrates API client, status cache and notifier.
pub struct DashboardController<T: ApiTransport> {
    api: ApiClient<T>,
    cache: Arc<StatusCache>,
    notifier: Arc<Notifier>,
}

impl<T: ApiTransport> DashboardController<T> {
    pub fn new(api: ApiClient<T>, cache: Arc<StatusCache>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    // ---- poll operations ------------------------------------------------

    /// Connection poll: device link status plus the Modbus link boolean,
    /// applied as one atomic result. Skips its turn if the previous poll
    /// is still in flight.
    pub async fn poll_connection(&self) {
        let Some(_guard) = self.cache.connection_pending().try_acquire() else {
            debug!("connection poll already in flight, skipping");
            return;
        };

        match self.fetch_connection_report().await {
            Ok(report) => self.cache.apply_connection_status(Ok(report)),
            Err(err) => {
                warn!(error = %err, "connection status poll failed");
                self.cache.apply_connection_status(Err(err.to_string()));
            }
        }
    }

    async fn fetch_connection_report(&self) -> ApiResult<ConnectionReport> {
        let connection = self.api.connection_status().await?;
        let modbus = self.api.modbus_connected().await?;
        Ok(ConnectionReport {
            status_text: connection.status,
            attempts: connection.attempts,
            max_attempts: connection.max_attempts,
            modbus_connected: modbus.modbus_connected,
            modbus_status: modbus.modbus_status,
        })
    }

    /// Modbus health poll. A failed probe is itself a health verdict:
    /// assume disconnected.
    pub async fn poll_modbus_health(&self) {
        match self.api.modbus_status().await {
            Ok(status) => {
                self.cache
                    .apply_modbus_health(status.modbus_connected, status.modbus_status);
            }
            Err(err) => {
                warn!(error = %err, "modbus health poll failed");
                self.cache.apply_modbus_health(false, err.to_string());
            }
        }
    }

    /// Read the indicator port's digital output and cache it. Reads of any
    /// other port never reach the cache, so this cannot corrupt the
    /// displayed indicator.
    pub async fn poll_digital_output(&self) {
        let Some(_guard) = self.cache.output_pending().try_acquire() else {
            debug!("digital output poll already in flight, skipping");
            return;
        };

        let port = self.cache.indicator_port();
        match self.api.digital_output(port).await {
            Ok(response) => {
                if let Some(value) = response.value {
                    self.cache.apply_digital_output(port, value);
                }
            }
            Err(err) => debug!(port, error = %err, "digital output poll failed"),
        }
    }

    /// Bulk status refresh.
    ///
    /// Refused locally while the Modbus link is down, and dropped (not
    /// queued) while a previous refresh is still in flight: the caller
    /// gets [`MonitorError::Busy`] and neither the network nor the cache
    /// is touched.
    pub async fn refresh_all(&self) -> MonitorResult<()> {
        if !self.cache.modbus_connected() {
            return Err(MonitorError::ModbusDown);
        }
        let Some(_guard) = self.cache.read_all_pending().try_acquire() else {
            debug!("status read already in flight, dropping this request");
            return Err(MonitorError::Busy);
        };

        match self.api.read_all_status().await {
            Ok(response) => {
                self.cache
                    .apply_param_snapshot(ParamSnapshot::new(response.data));
                Ok(())
            }
            Err(err) => {
                if let ApiError::Rejected(message) = &err {
                    if message.contains(LINK_DOWN_MARKER) {
                        self.cache.mark_modbus_down(message);
                    }
                }
                warn!(error = %err, "status refresh failed");
                self.notifier.error(format!("status refresh failed: {err}"));
                Err(err.into())
            }
        }
    }

    // ---- user operations ------------------------------------------------

    /// Force the backend to drop the device link.
    pub async fn disconnect(&self) -> MonitorResult<()> {
        match self.api.disconnect().await {
            Ok(ack) => {
                self.cache.mark_modbus_down("disconnected by operator");
                self.notifier.success(ack.message);
                // Refresh the link view right away instead of waiting for
                // the next connection tick.
                self.poll_connection().await;
                Ok(())
            }
            Err(err) => {
                self.notifier.error(format!("disconnect failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Write a digital output and record the change.
    ///
    /// The history entry is recorded for any port; only the cached
    /// indicator value is port-filtered.
    pub async fn set_digital_output(
        &self,
        output: u8,
        value: u8,
        reason: &str,
    ) -> MonitorResult<()> {
        match self.api.set_digital_output(output, value).await {
            Ok(_) => {
                self.cache.record_output_change(value, reason, output);
                self.cache.apply_digital_output(output, value);
                self.notifier.success(format!(
                    "digital output {output} set to {}",
                    if value == 1 { "ON" } else { "OFF" }
                ));
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .error(format!("setting digital output {output} failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Select which digital output mirrors Modbus health, then read it
    /// once so the view updates without waiting for the next tick.
    pub async fn select_indicator_port(&self, output: u8) -> MonitorResult<()> {
        match self.api.set_indicator_output(output).await {
            Ok(ack) => {
                self.cache.set_indicator_port(output);
                self.notifier.success(ack.message);
                self.poll_digital_output().await;
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .error(format!("selecting indicator port failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Fetch the backend's current indicator port into the cache.
    pub async fn load_indicator_port(&self) -> MonitorResult<()> {
        let response = self.api.indicator_output().await?;
        self.cache.set_indicator_port(response.output_number);
        Ok(())
    }

    /// Write a device parameter. Validation runs client-side first; an
    /// out-of-range value is notified and never sent. On success the
    /// parameter is re-read so the cache shows the device's view, not the
    /// operator's input.
    pub async fn write_param(&self, param: Param, value: f64) -> MonitorResult<()> {
        if !self.cache.modbus_connected() {
            self.notifier
                .warning("modbus link is down, write refused");
            return Err(MonitorError::ModbusDown);
        }

        match self.api.write_param(param, value).await {
            Ok(ack) => {
                self.notifier.success(ack.message);
                if param.readable() {
                    if let Err(err) = self.read_param(param).await {
                        debug!(param = param.name(), error = %err, "post-write readback failed");
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .error(format!("writing {} failed: {err}", param.name()));
                Err(err.into())
            }
        }
    }

    /// Read one device parameter and fold it into the current snapshot.
    pub async fn read_param(&self, param: Param) -> MonitorResult<Option<f64>> {
        if !self.cache.modbus_connected() {
            return Err(MonitorError::ModbusDown);
        }

        let response = self.api.read_param(param).await?;
        self.cache.apply_param_reading(
            param.name(),
            ParamReading {
                success: response.success,
                value: response.value,
                message: Some(response.message),
                status_text: response.status_text.or(response.baud_value),
            },
        );
        Ok(response.value)
    }

    /// Send the gripper initialization pulse.
    pub async fn gripper_init(&self) -> MonitorResult<()> {
        if !self.cache.modbus_connected() {
            self.notifier
                .warning("modbus link is down, init refused");
            return Err(MonitorError::ModbusDown);
        }

        match self.api.gripper_init().await {
            Ok(ack) => {
                self.notifier.success(ack.message);
                Ok(())
            }
            Err(err) => {
                self.notifier.error(format!("gripper init failed: {err}"));
                Err(err.into())
            }
        }
    }
}

/// Wire the three monitors (and auto-refresh, if configured) onto the
/// scheduler.
pub fn start_monitors<T>(
    scheduler: &PollScheduler,
    controller: &Arc<DashboardController<T>>,
    config: &MonitorConfig,
) where
    T: ApiTransport + 'static,
{
    let c = Arc::clone(controller);
    scheduler.start(PollKind::Connection, config.connection_interval(), move || {
        let c = Arc::clone(&c);
        async move { c.poll_connection().await }
    });

    let c = Arc::clone(controller);
    scheduler.start(PollKind::ModbusHealth, config.modbus_interval(), move || {
        let c = Arc::clone(&c);
        async move { c.poll_modbus_health().await }
    });

    let c = Arc::clone(controller);
    scheduler.start(PollKind::DigitalOutput, config.output_interval(), move || {
        let c = Arc::clone(&c);
        async move { c.poll_digital_output().await }
    });

    set_auto_refresh(scheduler, controller, config.auto_refresh_interval());
}

/// Apply an auto-refresh interval; zero cancels without replacement.
pub fn set_auto_refresh<T>(
    scheduler: &PollScheduler,
    controller: &Arc<DashboardController<T>>,
    interval: std::time::Duration,
) where
    T: ApiTransport + 'static,
{
    let c = Arc::clone(controller);
    scheduler.start(PollKind::AutoRefresh, interval, move || {
        let c = Arc::clone(&c);
        async move {
            // Busy and link-down refusals are routine here; the next tick
            // simply tries again.
            if let Err(err) = c.refresh_all().await {
                debug!(error = %err, "auto refresh skipped");
            }
        }
    });
}
