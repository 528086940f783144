//! Error types for timed-out tasks.

use std::time::Duration;

/// Failure of a task raced against a timer.
///
/// Produced by [`TaskResult::timeout_err`](crate::TaskResult::timeout_err),
/// which keeps the task's own error apart from the timer firing.
///
/// # Examples
///
/// ```rust
/// use undertow::{TaskResult, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let slow = TaskResult::<i32, String>::succeed(1).delay(Duration::from_secs(5));
///
/// match slow.timeout_err(Duration::from_millis(10)).run().await {
///     Err(TimeoutError::Timeout { duration }) => {
///         assert_eq!(duration, Duration::from_millis(10));
///     }
///     other => panic!("expected timeout, got {other:?}"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The timer fired before the task resolved.
    Timeout {
        /// The timeout that was exceeded.
        duration: Duration,
    },
    /// The task failed on its own before the timer fired.
    Inner(E),
}

impl<E> TimeoutError<E> {
    /// Create a timeout error.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Wrap an error from the task itself.
    pub fn inner(error: E) -> Self {
        Self::Inner(error)
    }

    /// Returns true if the timer fired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the task failed on its own.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Get the task's own error, if that is what this is.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "task timed out after {:?}", duration),
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}
