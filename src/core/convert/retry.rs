//! Delay between conversion attempts

use crate::config::{BackoffKind, ConversionConfig};
use std::time::Duration;

/// How long to wait before each retry
///
/// # Examples
///
/// ```
/// use docpipe::core::convert::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::Exponential {
///     initial: Duration::from_secs(1),
///     multiplier: 2.0,
///     max: Duration::from_secs(5),
/// };
/// assert_eq!(policy.delay_for(1), Duration::from_secs(1));
/// assert_eq!(policy.delay_for(3), Duration::from_secs(4));
/// assert_eq!(policy.delay_for(4), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryPolicy {
    /// Same delay before every retry
    Fixed(Duration),

    /// `initial * multiplier^(retry - 1)`, capped at `max`
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

impl RetryPolicy {
    /// Build the policy described by the `[conversion]` section
    pub fn from_config(config: &ConversionConfig) -> Self {
        match config.retry_backoff {
            BackoffKind::Fixed => RetryPolicy::Fixed(config.retry_delay()),
            BackoffKind::Exponential => RetryPolicy::Exponential {
                initial: config.retry_delay(),
                multiplier: config.retry_backoff_multiplier,
                max: config.retry_max_delay(),
            },
        }
    }

    /// Delay before retry number `retry` (1 for the first retry)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed(delay) => delay,
            RetryPolicy::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = initial.as_secs_f64() * multiplier.powi(exponent);
                if secs.is_finite() && secs < max.as_secs_f64() {
                    Duration::from_secs_f64(secs)
                } else {
                    max
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Fixed(Duration::from_secs(1))
    }
}
