//! Retry and timeout configuration for [`TaskResult`](crate::TaskResult).
//!
//! A [`RetryPolicy`] is just data: a total attempt budget plus a [`Backoff`]
//! that maps the number of the attempt that just failed to a wait. The retry
//! loop itself lives on `TaskResult`.
//!
//! # Quick Start
//!
//! ```rust
//! use undertow::{Backoff, RetryPolicy, TaskResult};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::new(3).with_backoff(Backoff::exponential(Duration::from_millis(1)));
//!
//! let task = TaskResult::<i32, String>::succeed(42).retry(policy);
//! assert_eq!(task.run().await, Ok(42));
//! # });
//! ```
//!
//! # Backoff Strategies
//!
//! - **None**: retry immediately
//! - **Constant**: fixed delay between attempts
//! - **Linear**: 100ms, 200ms, 300ms, ...
//! - **Exponential**: 100ms, 200ms, 400ms, ...
//! - **Fibonacci**: 100ms, 100ms, 200ms, 300ms, ...
//! - **Custom**: any function of the attempt number
//!
//! Enable the `jitter` feature to randomize delays.

mod error;
mod policy;

pub use error::TimeoutError;
pub use policy::{Backoff, JitterStrategy, RetryEvent, RetryPolicy};
