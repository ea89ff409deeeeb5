use crate::config::{PolitenessConfig, RetryConfig};
use std::time::Duration;

/// Calculates how long a queue must snooze after a successful fetch
///
/// This takes the fetch duration scaled by the configured delay factor,
/// clamped to `[min_delay, max_delay]`, and then raised to `floor` if one is
/// given (a per-URI override such as a robots crawl-delay, or a per-site
/// minimum). The floor wins even when it exceeds `max_delay`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ripple_frontier::config::PolitenessConfig;
/// use ripple_frontier::frontier::politeness_delay;
///
/// let config = PolitenessConfig {
///     delay_factor: 5.0,
///     min_delay_ms: 1_000,
///     max_delay_ms: 30_000,
/// };
/// let delay = politeness_delay(&config, Duration::from_secs(2), None);
/// assert_eq!(delay, Duration::from_secs(10));
/// ```
pub fn politeness_delay(
    config: &PolitenessConfig,
    fetch_duration: Duration,
    floor: Option<Duration>,
) -> Duration {
    let scaled = Duration::try_from_secs_f64(fetch_duration.as_secs_f64() * config.delay_factor)
        .unwrap_or_else(|_| config.max_delay());

    let delay = scaled.clamp(config.min_delay(), config.max_delay());

    match floor {
        Some(floor) => delay.max(floor),
        None => delay,
    }
}

/// Calculates the snooze applied after the `attempts`-th retryable failure
///
/// `base * 2^(attempts - 1)`, capped at the configured maximum.
pub fn backoff_delay(config: &RetryConfig, attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(32);
    let millis = config
        .backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(config.backoff_max_ms);
    Duration::from_millis(millis)
}
