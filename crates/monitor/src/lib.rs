//! Job monitor: lifecycle orchestration for tracked backend jobs.
//!
//! [`JobMonitor`] owns one event stream per active job, folds incoming
//! updates into [`JobRecord`](newsinsight_core::JobRecord)s through the
//! pure reducer, and broadcasts every change to subscribers. It handles
//! idle timeouts, bounded reconnection, authoritative-fetch fallback,
//! and closes streams automatically when jobs reach a terminal status.

pub mod config;
pub mod events;
pub mod monitor;
mod processor;

pub use config::MonitorConfig;
pub use events::{MonitorEvent, MonitorEventKind};
pub use monitor::JobMonitor;
