//! Asynchronous validation that accumulates every failure
//!
//! [`TaskValidation<T, E>`] is a [`Task`] resolving to a [`Validation`].
//! Independent checks combined with [`ap`](TaskValidation::ap),
//! [`and`](TaskValidation::and) or [`all`](TaskValidation::all) run
//! concurrently, and the combined outcome carries every error from every
//! failing check, in argument order.
//!
//! Dependent checks use [`and_then`](TaskValidation::and_then), which is
//! fail-fast: there is nothing to validate downstream of a failed step.
//!
//! # Example
//!
//! ```
//! use undertow::{TaskValidation, Validation};
//!
//! fn username_free(name: &'static str) -> TaskValidation<&'static str, String> {
//!     TaskValidation::new(move || async move {
//!         if name == "admin" {
//!             Validation::invalid(format!("{name} is taken"))
//!         } else {
//!             Validation::valid(name)
//!         }
//!     })
//! }
//!
//! fn email_deliverable(email: &'static str) -> TaskValidation<&'static str, String> {
//!     TaskValidation::from_validation(if email.contains('@') {
//!         Validation::valid(email)
//!     } else {
//!         Validation::invalid(format!("{email} is not an address"))
//!     })
//! }
//!
//! # tokio_test::block_on(async {
//! let signup = username_free("admin").and(email_deliverable("nowhere"));
//! let errors = signup.run().await.errors().cloned().unwrap().into_vec();
//! assert_eq!(errors, vec!["admin is taken", "nowhere is not an address"]);
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture};

use crate::{NonEmptyVec, Task, TaskResult, Validation};

/// A re-invocable asynchronous computation resolving to a [`Validation`].
pub struct TaskValidation<T, E> {
    task: Task<Validation<T, E>>,
}

impl<T, E> Clone for TaskValidation<T, E> {
    fn clone(&self) -> Self {
        TaskValidation {
            task: self.task.clone(),
        }
    }
}

impl<T, E> fmt::Debug for TaskValidation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskValidation")
            .field("task", &self.task)
            .finish()
    }
}

impl<T, E> From<Task<Validation<T, E>>> for TaskValidation<T, E> {
    fn from(task: Task<Validation<T, E>>) -> Self {
        TaskValidation { task }
    }
}

impl<T, E> From<TaskValidation<T, E>> for Task<Validation<T, E>> {
    fn from(task: TaskValidation<T, E>) -> Self {
        task.task
    }
}

impl<T, E> TaskValidation<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create from a producer of `Validation` futures.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Validation<T, E>> + Send + 'static,
    {
        Task::new(producer).into()
    }

    /// Always valid with a clone of `value`.
    pub fn valid(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move || future::ready(Validation::valid(value.clone())))
    }

    /// Always invalid with a single error.
    pub fn invalid(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::invalid_all(NonEmptyVec::singleton(error))
    }

    /// Always invalid with the given errors.
    pub fn invalid_all(errors: NonEmptyVec<E>) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move || future::ready(Validation::invalid_all(errors.clone())))
    }

    /// Lift a synchronous `Validation`.
    pub fn from_validation(validation: Validation<T, E>) -> Self
    where
        T: Clone + Sync,
        E: Clone + Sync,
    {
        Self::new(move || future::ready(validation.clone()))
    }

    /// Lift an infallible task.
    pub fn from_task(task: Task<T>) -> Self {
        task.map(Validation::valid).into()
    }

    /// Lift a [`TaskResult`]; its error becomes a single accumulated error.
    pub fn from_task_result(task: TaskResult<T, E>) -> Self {
        task.into_validation()
    }

    /// Invoke the task, returning the future for this run.
    pub fn run(&self) -> BoxFuture<'static, Validation<T, E>> {
        self.task.run()
    }

    /// Unwrap into the underlying [`Task`].
    pub fn into_task(self) -> Task<Validation<T, E>> {
        self.task
    }

    /// Transform the valid value.
    pub fn map<U, F>(self, f: F) -> TaskValidation<U, E>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        self.task.map(move |v| v.map(&f)).into()
    }

    /// Transform each accumulated error.
    pub fn map_err<E2, F>(self, f: F) -> TaskValidation<T, E2>
    where
        F: Fn(E) -> E2 + Send + Sync + 'static,
        E2: Send + 'static,
    {
        self.task.map(move |v| v.map_err(&f)).into()
    }

    /// Sequence a dependent check.
    ///
    /// Fail-fast: when `self` is invalid, `f` never runs and only `self`'s
    /// errors are reported.
    pub fn and_then<U, F>(self, f: F) -> TaskValidation<U, E>
    where
        F: Fn(T) -> TaskValidation<U, E> + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        TaskValidation::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move {
                match pending.await {
                    Validation::Valid(value) => f(value).run().await,
                    Validation::Invalid(errors) => Validation::Invalid(errors),
                }
            }
        })
    }

    /// Apply the function this task produces to the value `arg` produces.
    ///
    /// Both tasks run concurrently. When both are invalid, the errors of
    /// `self` come first, followed by those of `arg`.
    pub fn ap<A, B>(self, arg: TaskValidation<A, E>) -> TaskValidation<B, E>
    where
        T: FnOnce(A) -> B,
        A: Send + 'static,
        B: Send + 'static,
    {
        self.task.zip(arg.task).map(|(f, a)| f.ap(a)).into()
    }

    /// Run two checks concurrently and pair their values.
    pub fn and<U>(self, other: TaskValidation<U, E>) -> TaskValidation<(T, U), E>
    where
        U: Send + 'static,
    {
        self.task.zip(other.task).map(|(a, b)| a.and(b)).into()
    }

    /// Run every check concurrently, accumulating all errors in input order.
    pub fn all<I>(tasks: I) -> TaskValidation<Vec<T>, E>
    where
        I: IntoIterator<Item = TaskValidation<T, E>>,
    {
        Task::all(tasks.into_iter().map(TaskValidation::into_task))
            .map(|validations| validations.into_iter().collect())
            .into()
    }

    /// Eliminate both branches into a plain [`Task`].
    pub fn fold<B, F, G>(self, on_invalid: F, on_valid: G) -> Task<B>
    where
        F: Fn(NonEmptyVec<E>) -> B + Send + Sync + 'static,
        G: Fn(T) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        self.task.map(move |v| v.fold(&on_invalid, &on_valid))
    }

    /// Resolve to the valid value, or compute one from the errors.
    pub fn get_or_else<F>(self, f: F) -> Task<T>
    where
        F: Fn(NonEmptyVec<E>) -> T + Send + Sync + 'static,
    {
        self.task.map(move |v| v.get_or_else(&f))
    }

    /// When invalid, run `fallback` instead.
    pub fn recover(self, fallback: TaskValidation<T, E>) -> Self {
        Self::new(move || {
            let pending = self.run();
            let fallback = fallback.clone();
            async move {
                match pending.await {
                    Validation::Invalid(_) => fallback.run().await,
                    valid => valid,
                }
            }
        })
    }

    /// When invalid, run `fallback` unless any accumulated error is in
    /// `blocked`.
    pub fn recover_unless(
        self,
        blocked: impl Into<Arc<[E]>>,
        fallback: TaskValidation<T, E>,
    ) -> Self
    where
        E: PartialEq + Sync,
    {
        let blocked: Arc<[E]> = blocked.into();
        Self::new(move || {
            let pending = self.run();
            let blocked = Arc::clone(&blocked);
            let fallback = fallback.clone();
            async move {
                match pending.await {
                    Validation::Invalid(errors) if !errors.iter().any(|e| blocked.contains(e)) => {
                        fallback.run().await
                    }
                    other => other,
                }
            }
        })
    }

    /// Observe the valid value.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.task.map(move |v| v.tap(&f)).into()
    }

    /// Wait `duration` before invoking the task.
    pub fn delay(self, duration: Duration) -> Self {
        self.task.delay(duration).into()
    }

    /// Drop the errors, keeping the value if there is one.
    pub fn to_option(self) -> Task<Option<T>> {
        self.task.map(Validation::ok)
    }

    /// Switch to the fail-fast [`TaskResult`], carrying all errors at once.
    pub fn into_task_result(self) -> TaskResult<T, NonEmptyVec<E>> {
        self.task.map(Validation::into_result).into()
    }
}
