//! Retry policy types and configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Describes how a failing task is re-attempted.
///
/// Policies are plain data. They compute delays but never sleep; the
/// [`TaskResult::retry`](crate::TaskResult::retry) loop does the waiting.
///
/// `attempts` counts *total* invocations, so `RetryPolicy::new(1)` never
/// retries. Values below 1 are raised to 1.
///
/// # Examples
///
/// ```rust
/// use undertow::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(4)
///     .with_backoff(Backoff::exponential(Duration::from_millis(100)))
///     .with_max_delay(Duration::from_millis(250));
///
/// assert_eq!(policy.attempts(), 4);
/// assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
/// assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
/// assert_eq!(policy.delay_after(3), Some(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Backoff,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// Delay applied between two attempts.
///
/// Every strategy is a function of the 1-based number of the attempt that
/// just failed.
#[derive(Clone, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Fixed delay between attempts.
    Constant(Duration),
    /// `base * attempt`.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// `base * 2^(attempt - 1)`.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// `base * fib(attempt)`: 1, 1, 2, 3, 5, ...
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
    /// Caller-supplied delay function.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to the delay.
    Proportional(f64),
    /// Random delay between 0 and the calculated delay.
    Full,
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, `None` when the loop is about to stop
    /// or retries immediately.
    pub next_delay: Option<Duration>,
    /// Whether another attempt follows.
    pub will_retry: bool,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl Backoff {
    /// Constant delay.
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant(delay)
    }

    /// Linearly growing delay.
    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base }
    }

    /// Doubling delay.
    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential { base }
    }

    /// Fibonacci-growing delay.
    pub fn fibonacci(base: Duration) -> Self {
        Backoff::Fibonacci { base }
    }

    /// Delay computed from the attempt that just failed.
    ///
    /// ```rust
    /// use undertow::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::custom(|attempt| Duration::from_millis(u64::from(attempt) * 7));
    /// assert_eq!(backoff.delay(3), Duration::from_millis(21));
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Backoff::Custom(Arc::new(f))
    }

    /// Raw delay after `attempt` (1-based), before capping and jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Constant(d) => *d,
            Backoff::Linear { base } => base.saturating_mul(attempt),
            Backoff::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt - 1))
            }
            Backoff::Fibonacci { base } => base.saturating_mul(fibonacci(attempt)),
            Backoff::Custom(f) => f(attempt),
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::None => f.write_str("None"),
            Backoff::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            Backoff::Linear { base } => f.debug_struct("Linear").field("base", base).finish(),
            Backoff::Exponential { base } => {
                f.debug_struct("Exponential").field("base", base).finish()
            }
            Backoff::Fibonacci { base } => {
                f.debug_struct("Fibonacci").field("base", base).finish()
            }
            Backoff::Custom(_) => f.debug_tuple("Custom").field(&"<function>").finish(),
        }
    }
}

impl From<Duration> for Backoff {
    fn from(delay: Duration) -> Self {
        Backoff::Constant(delay)
    }
}

impl RetryPolicy {
    /// A policy making at most `attempts` total attempts with no delay.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff: Backoff::None,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Set the backoff between attempts. A bare `Duration` means constant.
    pub fn with_backoff(mut self, backoff: impl Into<Backoff>) -> Self {
        self.backoff = backoff.into();
        self
    }

    /// Cap every computed delay.
    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Add proportional jitter; `0.25` means ±25%.
    ///
    /// Without the `jitter` feature the delay is left untouched.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(sanitize_factor(factor));
        self
    }

    /// Pick a random delay between zero and the computed delay.
    ///
    /// Without the `jitter` feature the delay is left untouched.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Total number of attempts, including the first.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The configured backoff.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// The configured delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// The configured jitter.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }

    /// Delay to wait after `attempt` (1-based) failed.
    ///
    /// `None` means no wait: either the backoff yields zero or the policy has
    /// no attempts left.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if !self.allows_retry_after(attempt) {
            return None;
        }

        let raw = self.backoff.delay(attempt);
        let capped = match self.max_delay {
            Some(max) => raw.min(max),
            None => raw,
        };
        let delay = self.jitter.apply(capped);

        (!delay.is_zero()).then_some(delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl JitterStrategy {
    /// Apply jitter to an already capped delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let millis = delay.as_millis() as f64;
                let range = millis * sanitize_factor(*factor);
                let min = (millis - range).max(0.0);
                let max = millis + range;
                if max <= min {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(min..=max) as u64)
                }
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_millis = delay.as_millis() as u64;
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) | JitterStrategy::Full => delay,
        }
    }
}

/// Clamp a jitter factor to `0.0..=1.0`; NaN and infinities mean no jitter.
fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn fibonacci(n: u32) -> u32 {
    let (mut a, mut b) = (0u32, 1u32);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}
