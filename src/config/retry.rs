//! Retry policy configuration.

use std::time::Duration;

/// Backoff and retry policy for mutating calls.
///
/// Retries use capped exponential backoff with jitter. The defaults match
/// a short-lived interactive workload: a 50ms first pause doubling up to
/// 2s, at most 10 retries, and a 30s deadline per attempt. Total elapsed
/// time is not bounded beyond the attempt count.
///
/// ```rust
/// use std::time::Duration;
/// use relish::RetryConfig;
///
/// let patient = RetryConfig::new()
///     .with_max_retries(20)
///     .with_max_interval(Duration::from_secs(10));
/// assert!(patient.is_enabled());
///
/// let one_shot = RetryConfig::disabled();
/// assert!(!one_shot.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    max_retries: u32,
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    jitter: f64,
    attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_interval: Duration::from_millis(50),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that never retries. Each call gets exactly one
    /// attempt, still bounded by the attempt timeout.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Sets the maximum number of retries after the first attempt.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the pause before the first retry.
    #[must_use]
    pub fn with_initial_interval(mut self, initial_interval: Duration) -> Self {
        self.initial_interval = initial_interval;
        self
    }

    /// Sets the upper bound on the pause between retries.
    #[must_use]
    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Sets the backoff growth factor.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter fraction applied to each pause, in `0.0..=1.0`.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Sets the deadline applied to every individual attempt.
    #[must_use]
    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Returns `true` if at least one retry is allowed.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Returns the maximum number of retries.
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the per-attempt deadline.
    #[inline]
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Computes the pause before retry number `attempt` (zero-based),
    /// with jitter applied.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_interval.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_interval.as_secs_f64());

        // Spread delays by +/- jitter to avoid retry stampedes.
        let spread = capped * self.jitter;
        let jittered = capped - spread + fastrand::f64() * spread * 2.0;

        Duration::from_secs_f64(jittered.max(0.0))
    }
}
