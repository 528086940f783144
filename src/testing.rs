//! Testing utilities for code built on undertow
//!
//! Assertion macros for [`Validation`](crate::Validation), an invocation
//! counter for checking laziness and retry budgets, and (with the `proptest`
//! feature) `Arbitrary` implementations for the crate's data types.
//!
//! # Examples
//!
//! ## Assertion Macros
//!
//! ```rust
//! use undertow::{Validation, assert_valid, assert_invalid, assert_invalid_errors};
//!
//! let valid = Validation::<_, String>::valid(42);
//! assert_valid!(valid);
//!
//! let invalid = Validation::<i32, _>::invalid("too short");
//! assert_invalid!(invalid.clone());
//! assert_invalid_errors!(invalid, vec!["too short"]);
//! ```
//!
//! ## Counting Invocations
//!
//! ```rust
//! use undertow::testing::CallCounter;
//! use undertow::{RetryPolicy, TaskResult};
//!
//! # tokio_test::block_on(async {
//! let calls = CallCounter::new();
//! let task = TaskResult::<(), _>::new({
//!     let calls = calls.clone();
//!     move || {
//!         calls.hit();
//!         async { Err("unavailable") }
//!     }
//! });
//!
//! assert_eq!(calls.count(), 0);
//! let _ = task.retry(RetryPolicy::new(3)).run().await;
//! assert_eq!(calls.count(), 3);
//! # });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared counter for observing how often a producer runs.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call, returning the count before it.
    pub fn hit(&self) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of calls recorded so far.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Assert that a validation is `Valid`.
///
/// Evaluates to the valid value.
///
/// # Example
///
/// ```rust
/// use undertow::{Validation, assert_valid};
///
/// let val = Validation::<_, String>::valid(42);
/// assert_eq!(assert_valid!(val), 42);
/// ```
#[macro_export]
macro_rules! assert_valid {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Valid(value) => value,
            $crate::Validation::Invalid(errors) => {
                panic!("Expected Valid, got Invalid: {:?}", errors);
            }
        }
    };
}

/// Assert that a validation is `Invalid`.
///
/// Evaluates to the accumulated errors.
///
/// # Example
///
/// ```rust
/// use undertow::{Validation, assert_invalid};
///
/// let val = Validation::<i32, _>::invalid("error");
/// assert_eq!(assert_invalid!(val).len(), 1);
/// ```
#[macro_export]
macro_rules! assert_invalid {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Invalid(errors) => errors,
            $crate::Validation::Valid(v) => {
                panic!("Expected Invalid, got Valid: {:?}", v);
            }
        }
    };
}

/// Assert that a validation is `Invalid` with exactly these errors, in order.
///
/// # Example
///
/// ```rust
/// use undertow::{NonEmptyVec, Validation, assert_invalid_errors};
///
/// let val = Validation::<i32, _>::invalid_all(NonEmptyVec::new("error1", vec!["error2"]));
/// assert_invalid_errors!(val, vec!["error1", "error2"]);
/// ```
#[macro_export]
macro_rules! assert_invalid_errors {
    ($validation:expr, $expected:expr) => {
        match $validation {
            $crate::Validation::Invalid(errors) => {
                assert_eq!(errors.into_vec(), $expected);
            }
            $crate::Validation::Valid(v) => {
                panic!(
                    "Expected Invalid with errors {:?}, got Valid: {:?}",
                    $expected, v
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
mod arbitrary {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use crate::{NonEmptyVec, Validation};

    impl<T> Arbitrary for NonEmptyVec<T>
    where
        T: Arbitrary + 'static,
        T::Parameters: Clone,
    {
        type Parameters = T::Parameters;
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
            (any_with::<T>(args.clone()), vec(any_with::<T>(args), 0..8))
                .prop_map(|(head, tail)| NonEmptyVec::new(head, tail))
                .boxed()
        }
    }

    impl<T, E> Arbitrary for Validation<T, E>
    where
        T: Arbitrary + 'static,
        E: Arbitrary + 'static,
        E::Parameters: Clone,
    {
        type Parameters = (T::Parameters, E::Parameters);
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
            let (t_params, e_params) = args;
            prop_oneof![
                any_with::<T>(t_params).prop_map(Validation::Valid),
                any_with::<NonEmptyVec<E>>(e_params).prop_map(Validation::Invalid),
            ]
            .boxed()
        }
    }
}
