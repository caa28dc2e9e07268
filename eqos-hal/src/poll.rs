//! # Bounded hardware polling
//!
//! Waiting on hardware never blocks indefinitely. Every wait checks a condition at most
//! [PollConfig::max_attempts] times and sleeps [PollConfig::interval] between two checks.
use embedded_hal::delay::DelayNs;

use crate::time::Microseconds;

/// Retry budget of a polled wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Microseconds,
}

impl PollConfig {
    /// Budget used for all XPCS waits: 1000 attempts spaced 1 ms apart.
    pub const XPCS: Self = Self::new(1000, Microseconds::from_ticks(1000));

    pub const fn new(max_attempts: u32, interval: Microseconds) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::XPCS
    }
}

/// The polled condition did not become true within the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("condition not met after {attempts} attempts")]
pub struct PollTimeout {
    pub attempts: u32,
}

/// Check `condition` until it returns true or the retry budget is exhausted.
///
/// Returns the number of attempts which were required. There is no delay after the final
/// failed attempt.
pub fn poll_until(
    delay: &mut impl DelayNs,
    cfg: &PollConfig,
    mut condition: impl FnMut() -> bool,
) -> Result<u32, PollTimeout> {
    for attempt in 1..=cfg.max_attempts {
        if condition() {
            return Ok(attempt);
        }
        if attempt < cfg.max_attempts {
            delay.delay_us(cfg.interval.ticks());
        }
    }
    Err(PollTimeout {
        attempts: cfg.max_attempts,
    })
}
