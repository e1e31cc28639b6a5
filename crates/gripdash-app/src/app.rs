//! Application wiring and the render loop.
//!
//! Builds the transport/client/controller stack from configuration, starts
//! the poll timers, and then sits on the cache's watch channel rendering
//! state changes as structured log lines until shutdown.

use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use gripdash_client::{ApiClient, HttpTransport, RetryPolicy};
use gripdash_core::ConnectionState;
use gripdash_monitor::{
    start_monitors, DashboardController, Notice, Notifier, PollScheduler, StatusCache,
};

use crate::config::AppConfig;
use crate::error::AppResult;

pub struct Application {
    config: AppConfig,
    controller: Arc<DashboardController<HttpTransport>>,
    scheduler: PollScheduler,
    cache: Arc<StatusCache>,
    notifier: Arc<Notifier>,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let transport = HttpTransport::new(&config.base_url)?;
        let api = ApiClient::with_policy(
            transport,
            config.timeout(),
            RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay(),
            },
        );

        let cache = Arc::new(StatusCache::new());
        let notifier = Arc::new(Notifier::new(config.monitor.notice_dismiss()));
        let controller = Arc::new(DashboardController::new(
            api,
            Arc::clone(&cache),
            Arc::clone(&notifier),
        ));
        let scheduler = PollScheduler::new(Arc::clone(&cache));

        Ok(Self {
            config,
            controller,
            scheduler,
            cache,
            notifier,
        })
    }

    pub fn controller(&self) -> &Arc<DashboardController<HttpTransport>> {
        &self.controller
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Prime the view, start the timers, and render until Ctrl-C.
    pub async fn run(&self) -> AppResult<()> {
        // First poll up front so the view starts from real state instead
        // of waiting one full interval.
        self.controller.poll_connection().await;
        if let Err(err) = self.controller.load_indicator_port().await {
            warn!(error = %err, "could not load indicator port, keeping default");
        }

        start_monitors(&self.scheduler, &self.controller, &self.config.monitor);
        info!(base_url = %self.config.base_url, "dashboard running");

        let mut state_rx = self.cache.subscribe();
        let mut notice_rx = self.notifier.subscribe();

        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.render();
                }
                changed = notice_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let notice = notice_rx.borrow_and_update().clone();
                    render_notice(notice);
                }
            }
        }

        self.scheduler.shutdown();
        Ok(())
    }

    /// One render pass: log the current cache state.
    fn render(&self) {
        let connection = self.cache.connection();
        let modbus = self.cache.modbus();

        info!(
            state = %connection.state,
            status = %connection.status_text,
            attempts = connection.attempts,
            max_attempts = connection.max_attempts,
            modbus_connected = modbus.connected,
            modbus_status = %modbus.status_text,
            "device status"
        );

        if connection.state == ConnectionState::Connecting && connection.attempts > 0 {
            warn!(
                attempts = connection.attempts,
                max_attempts = connection.max_attempts,
                "reconnecting"
            );
        }
        if !modbus.connected {
            warn!("modbus link down, parameter controls disabled");
        }

        let output = self.cache.output();
        if let Some(value) = output.value {
            info!(
                port = output.indicator_port,
                value,
                "indicator output"
            );
        }

        if let Some(params) = self.cache.params() {
            info!(
                readings = params.readings.len(),
                taken_at = %params.taken_at,
                "parameter snapshot"
            );
        }
    }
}

fn render_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        info!(level = ?notice.level, text = %notice.text, "notice");
    }
}
