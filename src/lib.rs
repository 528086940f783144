//! # Undertow
//!
//! Composable effects for Rust: synchronous results, error-accumulating
//! validation, lazy asynchronous tasks, and their fallible combinations.
//!
//! | Type | Failure | Combining independent values |
//! |------|---------|------------------------------|
//! | `Result<T, E>` + [`ResultExt`] | first error | fail-fast |
//! | [`Validation<T, E>`] | all errors ([`NonEmptyVec`]) | accumulating |
//! | [`Task<T>`] | none | concurrent |
//! | [`TaskResult<T, E>`] | first error | concurrent, fail-fast, with retry and timeout |
//! | [`TaskValidation<T, E>`] | all errors | concurrent, accumulating |
//!
//! Tasks are descriptions of work. Building one does nothing; every call to
//! `run` starts a fresh, independent execution.
//!
//! ## Quick Example
//!
//! ```rust
//! use undertow::Validation;
//!
//! fn validate_email(email: &str) -> Validation<String, String> {
//!     if email.contains('@') {
//!         Validation::valid(email.to_string())
//!     } else {
//!         Validation::invalid("Email must contain @".to_string())
//!     }
//! }
//!
//! fn validate_age(age: i32) -> Validation<i32, String> {
//!     if age >= 18 {
//!         Validation::valid(age)
//!     } else {
//!         Validation::invalid("Must be 18 or older".to_string())
//!     }
//! }
//!
//! // Collect all errors at once
//! let result = Validation::all((validate_email("user.example.com"), validate_age(12)));
//!
//! match result {
//!     Validation::Valid((email, age)) => println!("{email} is {age} years old"),
//!     Validation::Invalid(errors) => assert_eq!(errors.len(), 2),
//! }
//! ```
//!
//! ## Asynchronous work
//!
//! ```rust
//! use undertow::{Backoff, RetryPolicy, TaskResult};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let fetch = TaskResult::<String, String>::succeed("payload".into())
//!     .retry(RetryPolicy::new(3).with_backoff(Backoff::exponential(Duration::from_millis(10))))
//!     .timeout(Duration::from_secs(2), || "fetch timed out".into());
//!
//! assert_eq!(fetch.run().await.as_deref(), Ok("payload"));
//! # });
//! ```
//!
//! ## Feature flags
//!
//! - `jitter`: randomized retry delays
//! - `tracing`: `Task::instrument` and debug events from retry, timeout and repeat
//! - `serde`: serialization for [`Validation`] and [`NonEmptyVec`]
//! - `proptest`: `Arbitrary` implementations

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod memo;
pub mod nonempty;
pub mod result;
pub mod retry;
pub mod semigroup;
pub mod task;
pub mod task_result;
pub mod task_validation;
pub mod testing;
pub mod validation;

// Re-exports
pub use memo::{memoize, Memo};
pub use nonempty::NonEmptyVec;
pub use result::ResultExt;
pub use retry::{Backoff, JitterStrategy, RetryEvent, RetryPolicy, TimeoutError};
pub use semigroup::Semigroup;
pub use task::{Repeat, Task};
pub use task_result::TaskResult;
pub use task_validation::TaskValidation;
pub use validation::{ValidateAll, Validation};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::nonempty::NonEmptyVec;
    pub use crate::result::ResultExt;
    pub use crate::retry::{Backoff, RetryPolicy, TimeoutError};
    pub use crate::semigroup::Semigroup;
    pub use crate::task::{Repeat, Task};
    pub use crate::task_result::TaskResult;
    pub use crate::task_validation::TaskValidation;
    pub use crate::validation::{ValidateAll, Validation};
}
