//! Monitor configuration loaded from environment variables.

use std::time::Duration;

use newsinsight_stream::ReconnectConfig;

/// Tunables for the job monitor.
///
/// All fields have defaults suitable for production use; override via
/// environment variables where needed.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// A non-terminal job with no events for this long is treated as a
    /// lost connection (default: 5 minutes).
    pub idle_timeout: Duration,
    /// Retry policy for dropped streams.
    pub reconnect: ReconnectConfig,
    /// Whether to replace the streamed record with an authoritative
    /// fetch once a job reaches a terminal status (default: off — the
    /// stream already delivered the terminal record).
    pub refetch_on_terminal: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            reconnect: ReconnectConfig::default(),
            refetch_on_terminal: false,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `MONITOR_IDLE_TIMEOUT_SECS`     | `300`   |
    /// | `MONITOR_RECONNECT_ATTEMPTS`    | `2`     |
    /// | `MONITOR_RECONNECT_BACKOFF_SECS`| `5`     |
    /// | `MONITOR_REFETCH_ON_TERMINAL`   | `false` |
    pub fn from_env() -> Self {
        let idle_timeout_secs: u64 = std::env::var("MONITOR_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("MONITOR_IDLE_TIMEOUT_SECS must be a valid u64");

        let max_attempts: u32 = std::env::var("MONITOR_RECONNECT_ATTEMPTS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("MONITOR_RECONNECT_ATTEMPTS must be a valid u32");

        let backoff_secs: u64 = std::env::var("MONITOR_RECONNECT_BACKOFF_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("MONITOR_RECONNECT_BACKOFF_SECS must be a valid u64");

        let refetch_on_terminal = std::env::var("MONITOR_REFETCH_ON_TERMINAL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            reconnect: ReconnectConfig {
                max_attempts,
                backoff: Duration::from_secs(backoff_secs),
            },
            refetch_on_terminal,
        }
    }
}
