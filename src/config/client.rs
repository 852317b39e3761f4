//! HTTP client and verification settings.

use std::time::Duration;

use serde::Deserialize;

/// HTTP client configuration shared by every service call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Policy for re-reading state while a saga settles.
///
/// One attempt means a single fetch and diff; only state mismatches are
/// retried when more are allowed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Total fetch+diff attempts per verification step.
    pub max_attempts: usize,
    /// Delay before the first retry in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound on the delay between retries in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            min_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }
}

impl VerifyConfig {
    /// Verify exactly once.
    pub fn single_shot() -> Self {
        Self::default()
    }

    /// Allow up to `max_attempts` reads, starting `min_delay` apart.
    pub fn eventually(max_attempts: usize, min_delay: Duration) -> Self {
        let min_delay_ms = u64::try_from(min_delay.as_millis()).unwrap_or(u64::MAX);
        Self {
            max_attempts: max_attempts.max(1),
            min_delay_ms,
            max_delay_ms: min_delay_ms.max(Self::default().max_delay_ms),
        }
    }

    /// Retries allowed after the first attempt.
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }
}
