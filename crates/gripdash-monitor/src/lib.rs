//! gripdash-monitor - polling, health monitoring and stale-state
//! suppression for the gripper dashboard.
//!
//! The pieces, leaf to root:
//!
//! - [`Notifier`]: single transient user-facing message, auto-dismissed
//! - [`StatusCache`]: last-known device/connection/output state, the one
//!   owned state container every operation reads and writes
//! - [`PollScheduler`]: repeating timers per poll kind, suppressed while
//!   the view is hidden or the Modbus link is known dead
//! - [`DashboardController`]: applies poll results to the cache under a
//!   full-overwrite discipline and forwards user-issued writes
//!
//! Data flows one way in: timers -> API -> cache -> watch channel ->
//! render. User actions flow the other way: operation -> API write ->
//! cache refresh.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod notifier;
pub mod scheduler;

pub use cache::{ConnectionReport, StatusCache};
pub use config::MonitorConfig;
pub use controller::{set_auto_refresh, start_monitors, DashboardController};
pub use error::{MonitorError, MonitorResult};
pub use notifier::{Notice, NoticeLevel, Notifier};
pub use scheduler::{PollKind, PollScheduler};
