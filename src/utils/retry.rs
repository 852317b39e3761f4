//! Backoff for verification steps waiting on eventually consistent state.
//!
//! Uses `backon` for exponential backoff with jitter.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::config::VerifyConfig;

/// Backoff between fetch+diff attempts of one verification step.
///
/// `max_times` counts retries, so a single-attempt policy never sleeps.
pub fn verify_backoff(config: &VerifyConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.min_delay_ms))
        .with_max_delay(Duration::from_millis(
            config.max_delay_ms.max(config.min_delay_ms),
        ))
        .with_max_times(config.retries())
        .with_jitter()
}
