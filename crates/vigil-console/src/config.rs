use std::time::Duration;

use vigil_core::session::DEFAULT_CAPTURE_TARGET;

/// Console configuration, loaded from environment variables.
pub struct Config {
    /// Backend base URL (default: http://127.0.0.1:5000).
    pub backend_url: String,
    /// Interval between status polls.
    pub status_poll: Duration,
    /// Interval between log polls.
    pub log_poll: Duration,
    /// Photos required per registration.
    pub capture_target: usize,
    /// Pause after a successful automatic capture.
    pub auto_capture_pace: Duration,
    /// Pause before retrying a rejected automatic capture.
    pub auto_capture_retry: Duration,
}

impl Config {
    /// Load configuration from `VIGIL_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("VIGIL_BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            status_poll: Duration::from_secs(env_u64("VIGIL_STATUS_POLL_SECS", 2)),
            log_poll: Duration::from_secs(env_u64("VIGIL_LOG_POLL_SECS", 5)),
            capture_target: env_usize("VIGIL_CAPTURE_TARGET", DEFAULT_CAPTURE_TARGET),
            auto_capture_pace: Duration::from_millis(env_u64("VIGIL_AUTO_CAPTURE_PACE_MS", 2000)),
            auto_capture_retry: Duration::from_millis(env_u64("VIGIL_AUTO_CAPTURE_RETRY_MS", 1000)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
