use crate::errors::{
    Result,
    ServiceError,
    TaxQuantError,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Duration;
use tracing::{
    info,
    warn,
};

/// Something that can wait. Production code blocks the thread, tests record
/// the requested delays instead.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// `retry * base_delay`
    #[default]
    Linear,
    /// `2^(retry - 1) * base_delay`
    Exponential,
}

/// How transient service failures are retried.
///
/// `max_attempts` counts every call including the first one, `None` retries
/// forever: a service that never comes back stalls the run instead of
/// producing a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(3),
            max_attempts: None,
            backoff: Backoff::Linear,
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (starting at 1).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let retry = retry.max(1);
        let factor = match self.backoff {
            Backoff::Linear => Some(retry),
            Backoff::Exponential => 2u32.checked_pow(retry - 1),
        };
        let delay = factor
            .and_then(|f| self.base_delay.checked_mul(f))
            .unwrap_or(Duration::MAX);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Calls `op` until it succeeds, fails with a non transient error or the
    /// attempts run out.
    pub fn run<T, Z: Sleeper>(
        &self,
        sleeper: &Z,
        context: &'static str,
        mut op: impl FnMut() -> std::result::Result<T, ServiceError>,
    ) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(x) => {
                    if attempt > 1 {
                        info!("{} succeeded after {} attempts", context, attempt);
                    }
                    return Ok(x);
                }
                Err(e) if e.is_transient() => {
                    if let Some(max_attempts) = self.max_attempts {
                        if attempt >= max_attempts {
                            return Err(TaxQuantError::RetriesExhausted {
                                context,
                                attempts: attempt,
                                last_error: e,
                            });
                        }
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed ({}), retry {} in {:?}",
                        context, e, attempt, delay
                    );
                    sleeper.sleep(delay);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
