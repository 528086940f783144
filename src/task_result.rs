//! Asynchronous computations that fail structurally
//!
//! [`TaskResult<T, E>`] is a [`Task`] resolving to `Result<T, E>`. Failures
//! travel as `Err` values, never as panics, so every combinator can inspect
//! them. On top of `Result`'s fail-fast sequencing it adds the two policies
//! that only make sense for asynchronous work: [`retry`](TaskResult::retry)
//! and [`timeout`](TaskResult::timeout).
//!
//! # Examples
//!
//! ```
//! use undertow::{RetryPolicy, TaskResult};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let lookup = TaskResult::<u32, String>::succeed(7)
//!     .and_then(|id| TaskResult::succeed(format!("user-{id}")))
//!     .retry(RetryPolicy::new(3))
//!     .timeout(Duration::from_secs(1), || "lookup timed out".to_string());
//!
//! assert_eq!(lookup.run().await, Ok("user-7".to_string()));
//! # });
//! ```
//!
//! Lowering back to a plain [`Task`] happens by folding both branches:
//!
//! ```
//! use undertow::TaskResult;
//!
//! # tokio_test::block_on(async {
//! let status = TaskResult::<i32, &str>::fail("offline").fold(|e| format!("down: {e}"), |_| "up".into());
//! assert_eq!(status.run().await, "down: offline");
//! # });
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::retry::{RetryEvent, RetryPolicy, TimeoutError};
use crate::{result, ResultExt, Task, TaskValidation, Validation};

/// A re-invocable asynchronous computation resolving to `Result<T, E>`.
pub struct TaskResult<T, E> {
    task: Task<Result<T, E>>,
}

impl<T, E> Clone for TaskResult<T, E> {
    fn clone(&self) -> Self {
        TaskResult {
            task: self.task.clone(),
        }
    }
}

impl<T, E> fmt::Debug for TaskResult<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskResult")
            .field("task", &self.task)
            .finish()
    }
}

impl<T, E> From<Task<Result<T, E>>> for TaskResult<T, E> {
    fn from(task: Task<Result<T, E>>) -> Self {
        TaskResult { task }
    }
}

impl<T, E> From<TaskResult<T, E>> for Task<Result<T, E>> {
    fn from(task: TaskResult<T, E>) -> Self {
        task.task
    }
}

impl<T, E> TaskResult<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create from a producer of `Result` futures.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task::new(producer).into()
    }

    /// Always succeed with a clone of `value`.
    pub fn succeed(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move || future::ready(Ok(value.clone())))
    }

    /// Always fail with a clone of `error`.
    pub fn fail(error: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move || future::ready(Err(error.clone())))
    }

    /// Lift a synchronous `Result`.
    pub fn from_result(result: Result<T, E>) -> Self
    where
        T: Clone + Sync,
        E: Clone + Sync,
    {
        Self::new(move || future::ready(result.clone()))
    }

    /// Lift an `Option`, building the error with `on_none` when it is empty.
    pub fn from_option<F>(option: Option<T>, on_none: F) -> Self
    where
        T: Clone + Sync,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self::new(move || future::ready(option.clone().ok_or_else(&on_none)))
    }

    /// Lift an infallible task into the success channel.
    pub fn from_task(task: Task<T>) -> Self {
        task.map(Ok).into()
    }

    /// Wrap fallible work, converting its errors with `on_error`.
    ///
    /// This is the boundary between foreign error types and the structural
    /// error channel.
    ///
    /// ```
    /// use undertow::TaskResult;
    ///
    /// # tokio_test::block_on(async {
    /// let parsed = TaskResult::try_catch(
    ///     || async { "12x".parse::<i32>() },
    ///     |e| format!("bad input: {e}"),
    /// );
    /// assert!(parsed.run().await.unwrap_err().starts_with("bad input"));
    /// # });
    /// ```
    pub fn try_catch<X, F, Fut, H>(work: F, on_error: H) -> Self
    where
        X: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, X>> + Send + 'static,
        H: Fn(X) -> E + Send + Sync + 'static,
    {
        let on_error = Arc::new(on_error);
        Self::new(move || {
            let pending = work();
            let on_error = Arc::clone(&on_error);
            async move { pending.await.map_err(|e| on_error(e)) }
        })
    }

    /// Invoke the task, returning the future for this run.
    pub fn run(&self) -> BoxFuture<'static, Result<T, E>> {
        self.task.run()
    }

    /// Unwrap into the underlying [`Task`].
    pub fn into_task(self) -> Task<Result<T, E>> {
        self.task
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> TaskResult<U, E>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        self.task.map(move |result| result.map(&f)).into()
    }

    /// Transform the error value.
    pub fn map_err<E2, F>(self, f: F) -> TaskResult<T, E2>
    where
        F: Fn(E) -> E2 + Send + Sync + 'static,
        E2: Send + 'static,
    {
        self.task.map(move |result| result.map_err(&f)).into()
    }

    /// Sequence a dependent task; a failure skips `f` entirely.
    pub fn and_then<U, F>(self, f: F) -> TaskResult<U, E>
    where
        F: Fn(T) -> TaskResult<U, E> + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        TaskResult::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move {
                match pending.await {
                    Ok(value) => f(value).run().await,
                    Err(error) => Err(error),
                }
            }
        })
    }

    /// Sequence a synchronous `Result`-producing step.
    pub fn and_then_result<U, F>(self, f: F) -> TaskResult<U, E>
    where
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
        U: Send + 'static,
    {
        self.task.map(move |result| result.and_then(&f)).into()
    }

    /// Apply the function this task produces to the value `arg` produces.
    ///
    /// Both tasks run concurrently. When both fail, the function side's
    /// error wins.
    pub fn ap<A, B>(self, arg: TaskResult<A, E>) -> TaskResult<B, E>
    where
        T: FnOnce(A) -> B,
        A: Send + 'static,
        B: Send + 'static,
    {
        self.task
            .zip(arg.task)
            .map(|(f, a)| result::ap(f, a))
            .into()
    }

    /// Run two tasks concurrently and pair their values.
    pub fn zip<U>(self, other: TaskResult<U, E>) -> TaskResult<(T, U), E>
    where
        U: Send + 'static,
    {
        self.task
            .zip(other.task)
            .map(|(a, b)| a.and_then(|a| b.map(|b| (a, b))))
            .into()
    }

    /// Run every task concurrently; succeed with all values in input order,
    /// or fail with the first failure in input order.
    pub fn all<I>(tasks: I) -> TaskResult<Vec<T>, E>
    where
        I: IntoIterator<Item = TaskResult<T, E>>,
    {
        Task::all(tasks.into_iter().map(TaskResult::into_task))
            .map(|results| results.into_iter().collect())
            .into()
    }

    /// Eliminate both branches into a plain [`Task`].
    pub fn fold<B, F, G>(self, on_failure: F, on_success: G) -> Task<B>
    where
        F: Fn(E) -> B + Send + Sync + 'static,
        G: Fn(T) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        self.task
            .map(move |result| result.fold(&on_failure, &on_success))
    }

    /// Resolve to the success value, or compute one from the error.
    pub fn get_or_else<F>(self, f: F) -> Task<T>
    where
        F: Fn(E) -> T + Send + Sync + 'static,
    {
        self.task.map(move |result| result.unwrap_or_else(&f))
    }

    /// On failure, continue with the task `f` builds from the error.
    pub fn or_else<E2, F>(self, f: F) -> TaskResult<T, E2>
    where
        F: Fn(E) -> TaskResult<T, E2> + Send + Sync + 'static,
        E2: Send + 'static,
    {
        let f = Arc::new(f);
        TaskResult::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move {
                match pending.await {
                    Ok(value) => Ok(value),
                    Err(error) => f(error).run().await,
                }
            }
        })
    }

    /// On failure, run `fallback` instead.
    pub fn recover(self, fallback: TaskResult<T, E>) -> Self {
        self.or_else(move |_| fallback.clone())
    }

    /// On failure, run `fallback` unless the error is in `blocked`.
    ///
    /// `blocked` may be a `Vec`, an array, or a slice of cloneable errors.
    ///
    /// ```
    /// use undertow::TaskResult;
    ///
    /// # tokio_test::block_on(async {
    /// let cached = TaskResult::<i32, &str>::succeed(0);
    /// let fatal = TaskResult::<i32, _>::fail("fatal").recover_unless(&["fatal"][..], cached.clone());
    /// let flaky = TaskResult::<i32, _>::fail("flaky").recover_unless(vec!["fatal"], cached);
    ///
    /// assert_eq!(fatal.run().await, Err("fatal"));
    /// assert_eq!(flaky.run().await, Ok(0));
    /// # });
    /// ```
    pub fn recover_unless(
        self,
        blocked: impl Into<Arc<[E]>>,
        fallback: TaskResult<T, E>,
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
                    Err(error) if !blocked.contains(&error) => fallback.run().await,
                    other => other,
                }
            }
        })
    }

    /// Observe the success value.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.task.map(move |result| result.tap(&f)).into()
    }

    /// Observe the error value.
    pub fn tap_err<F>(self, f: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.task.map(move |result| result.tap_err(&f)).into()
    }

    /// Wait `duration` before invoking the task.
    pub fn delay(self, duration: Duration) -> Self {
        self.task.delay(duration).into()
    }

    /// Drop the error, keeping the value if there is one.
    pub fn to_option(self) -> Task<Option<T>> {
        self.task.map(Result::ok)
    }

    /// Switch to the accumulating [`TaskValidation`].
    pub fn into_validation(self) -> TaskValidation<T, E> {
        self.task.map(Validation::from_result).into()
    }

    /// Convert a panic in the underlying work into a failure.
    ///
    /// Covers both the synchronous invocation and polling of the future.
    /// `on_panic` receives the panic message.
    pub fn catch_panic<H>(self, on_panic: H) -> Self
    where
        H: Fn(String) -> E + Send + Sync + 'static,
    {
        let on_panic = Arc::new(on_panic);
        Self::new(move || {
            let started = std::panic::catch_unwind(AssertUnwindSafe(|| self.run()));
            let on_panic = Arc::clone(&on_panic);
            async move {
                let pending = match started {
                    Ok(pending) => pending,
                    Err(payload) => return Err(on_panic(panic_message(payload))),
                };
                match AssertUnwindSafe(pending).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(on_panic(panic_message(payload))),
                }
            }
        })
    }

    /// Re-run the task on failure, up to `policy.attempts()` total runs.
    ///
    /// A success stops immediately. When the budget runs out, the last
    /// failure is returned as-is. Backoff waits happen between attempts,
    /// never before the first or after the last.
    ///
    /// ```
    /// use undertow::{RetryPolicy, TaskResult};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let calls = Arc::new(AtomicU32::new(0));
    /// let flaky = TaskResult::new({
    ///     let calls = Arc::clone(&calls);
    ///     move || {
    ///         let n = calls.fetch_add(1, Ordering::SeqCst);
    ///         async move { if n < 2 { Err("busy") } else { Ok(n) } }
    ///     }
    /// });
    ///
    /// assert_eq!(flaky.retry(RetryPolicy::new(5)).run().await, Ok(2));
    /// assert_eq!(calls.load(Ordering::SeqCst), 3);
    /// # });
    /// ```
    pub fn retry(self, policy: RetryPolicy) -> Self {
        self.retry_with_hooks(policy, |_| true, |_| {})
    }

    /// Like [`retry`](TaskResult::retry), but stop as soon as `when` rejects
    /// an error, even if attempts remain.
    pub fn retry_if<P>(self, policy: RetryPolicy, when: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_with_hooks(policy, when, |_| {})
    }

    /// Like [`retry_if`](TaskResult::retry_if), calling `on_retry` after
    /// every failed attempt.
    ///
    /// The hook runs synchronously inside the retry loop; keep it to
    /// logging and metrics.
    pub fn retry_with_hooks<P, H>(self, policy: RetryPolicy, when: P, on_retry: H) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
        H: Fn(&RetryEvent<'_, E>) + Send + Sync + 'static,
    {
        let policy = Arc::new(policy);
        let when = Arc::new(when);
        let on_retry = Arc::new(on_retry);
        Self::new(move || {
            let task = self.clone();
            let policy = Arc::clone(&policy);
            let when = Arc::clone(&when);
            let on_retry = Arc::clone(&on_retry);
            async move {
                let start = Instant::now();
                let mut attempt = 1u32;
                loop {
                    let error = match task.run().await {
                        Ok(value) => return Ok(value),
                        Err(error) => error,
                    };

                    let will_retry = policy.allows_retry_after(attempt) && when(&error);
                    let next_delay = if will_retry {
                        policy.delay_after(attempt)
                    } else {
                        None
                    };

                    on_retry(&RetryEvent {
                        attempt,
                        error: &error,
                        next_delay,
                        will_retry,
                        elapsed: start.elapsed(),
                    });

                    if !will_retry {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempt, "task failed, not retrying");
                        return Err(error);
                    }

                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, delay = ?next_delay, "task failed, retrying");

                    if let Some(delay) = next_delay {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        })
    }

    /// Race the task against a timer; if the timer wins, fail with
    /// `on_timeout()`.
    ///
    /// An outcome that arrives first, success or failure, is returned and the
    /// timer is dropped. A task that loses the race is dropped at its next
    /// suspension point, so side effects it has already performed stay done
    /// and nothing after that point runs.
    pub fn timeout<F>(self, duration: Duration, on_timeout: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        let on_timeout = Arc::new(on_timeout);
        Self::new(move || {
            let pending = self.run();
            let on_timeout = Arc::clone(&on_timeout);
            async move {
                match tokio::time::timeout(duration, pending).await {
                    Ok(result) => result,
                    Err(_elapsed) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(?duration, "task timed out");
                        Err(on_timeout())
                    }
                }
            }
        })
    }

    /// Like [`timeout`](TaskResult::timeout), keeping the task's own errors
    /// apart from the timer firing.
    pub fn timeout_err(self, duration: Duration) -> TaskResult<T, TimeoutError<E>> {
        self.map_err(TimeoutError::Inner)
            .timeout(duration, move || TimeoutError::timeout(duration))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CallCounter;
    use crate::Backoff;
    use parking_lot::Mutex;

    fn always_failing(counter: &CallCounter, error: &'static str) -> TaskResult<i32, &'static str> {
        let counter = counter.clone();
        TaskResult::new(move || {
            counter.hit();
            future::ready(Err(error))
        })
    }

    fn succeed_after(counter: &CallCounter, failures: usize) -> TaskResult<usize, &'static str> {
        let counter = counter.clone();
        TaskResult::new(move || {
            let n = counter.hit();
            future::ready(if n < failures { Err("transient") } else { Ok(n) })
        })
    }

    #[tokio::test]
    async fn and_then_skips_continuation_on_failure() {
        let counter = CallCounter::new();
        let seen = counter.clone();
        let task = TaskResult::<i32, _>::fail("boom").and_then(move |x| {
            seen.hit();
            TaskResult::succeed(x)
        });
        assert_eq!(task.run().await, Err("boom"));
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn ap_prefers_function_side_failure() {
        let f = TaskResult::<fn(i32) -> i32, _>::fail("fn");
        let arg = TaskResult::<i32, _>::fail("arg");
        assert_eq!(f.ap(arg).run().await, Err("fn"));
    }

    #[tokio::test(start_paused = true)]
    async fn ap_runs_sides_concurrently() {
        let ms = Duration::from_millis;
        let f = TaskResult::<_, &str>::from_task(Task::from_fn(|| |x: i32| x + 1)).delay(ms(20));
        let arg = TaskResult::<_, &str>::succeed(1).delay(ms(20));

        let start = Instant::now();
        assert_eq!(f.ap(arg).run().await, Ok(2));
        assert!(start.elapsed() < ms(40));
    }

    #[tokio::test]
    async fn retry_exhausts_attempt_budget() {
        let counter = CallCounter::new();
        let task = always_failing(&counter, "down").retry(RetryPolicy::new(3));
        assert_eq!(task.run().await, Err("down"));
        assert_eq!(counter.count(), 3);
    }

    #[tokio::test]
    async fn retry_predicate_stops_early() {
        let counter = CallCounter::new();
        let task = always_failing(&counter, "fatal").retry_if(RetryPolicy::new(3), |e| *e != "fatal");
        assert_eq!(task.run().await, Err("fatal"));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn retry_stops_on_first_success() {
        let counter = CallCounter::new();
        let task = succeed_after(&counter, 1).retry(RetryPolicy::new(5));
        assert_eq!(task.run().await, Ok(1));
        assert_eq!(counter.count(), 2);
    }

    #[tokio::test]
    async fn retry_with_single_attempt_never_retries() {
        let counter = CallCounter::new();
        let task = always_failing(&counter, "once").retry(RetryPolicy::new(1));
        assert_eq!(task.run().await, Err("once"));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_only_between_attempts() {
        let counter = CallCounter::new();
        let policy = RetryPolicy::new(3).with_backoff(Duration::from_millis(100));
        let task = always_failing(&counter, "down").retry(policy);

        let start = Instant::now();
        assert_eq!(task.run().await, Err("down"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300), "waited after the final attempt");
    }

    #[tokio::test(start_paused = true)]
    async fn custom_backoff_sees_completed_attempt_numbers() {
        let counter = CallCounter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let policy = RetryPolicy::new(4).with_backoff(Backoff::custom(move |attempt| {
            recorder.lock().push(attempt);
            Duration::from_millis(1)
        }));

        always_failing(&counter, "down").retry(policy).run().await.unwrap_err();
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
        assert_eq!(counter.count(), 4);
    }

    #[tokio::test]
    async fn retry_runs_independently_per_invocation() {
        let counter = CallCounter::new();
        let task = always_failing(&counter, "down").retry(RetryPolicy::new(2));
        task.run().await.unwrap_err();
        task.run().await.unwrap_err();
        assert_eq!(counter.count(), 4);
    }

    #[tokio::test]
    async fn retry_hooks_report_each_failure() {
        let counter = CallCounter::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&events);

        let task = always_failing(&counter, "down").retry_with_hooks(
            RetryPolicy::new(3),
            |_| true,
            move |event: &RetryEvent<'_, &'static str>| {
                log.lock().push((event.attempt, *event.error, event.will_retry));
            },
        );

        task.run().await.unwrap_err();
        assert_eq!(
            *events.lock(),
            vec![(1, "down", true), (2, "down", true), (3, "down", false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_returns_fast_outcome() {
        let fast = TaskResult::<_, &str>::succeed(1).delay(Duration::from_millis(10));
        let task = fast.timeout(Duration::from_millis(1000), || "late");
        assert_eq!(task.run().await, Ok(1));

        let failing = TaskResult::<i32, _>::fail("own").delay(Duration::from_millis(10));
        let task = failing.timeout(Duration::from_millis(1000), || "late");
        assert_eq!(task.run().await, Err("own"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_synthesizes_failure_when_timer_wins() {
        let slow = TaskResult::<_, &str>::succeed(1).delay(Duration::from_millis(1000));
        let start = Instant::now();
        let task = slow.timeout(Duration::from_millis(10), || "late");
        assert_eq!(task.run().await, Err("late"));
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_err_separates_timer_from_inner_error() {
        let slow = TaskResult::<i32, &str>::succeed(1).delay(Duration::from_millis(100));
        let result = slow.timeout_err(Duration::from_millis(5)).run().await;
        assert_eq!(result, Err(TimeoutError::timeout(Duration::from_millis(5))));

        let failing = TaskResult::<i32, _>::fail("refused");
        let result = failing.timeout_err(Duration::from_millis(5)).run().await;
        assert_eq!(result, Err(TimeoutError::Inner("refused")));
    }

    #[tokio::test]
    async fn try_catch_maps_errors_and_keeps_success() {
        let ok = TaskResult::try_catch(|| async { "42".parse::<i32>() }, |e| e.to_string());
        assert_eq!(ok.run().await, Ok(42));

        let err = TaskResult::try_catch(|| async { "x".parse::<i32>() }, |_| "not a number");
        assert_eq!(err.run().await, Err("not a number"));
    }

    #[tokio::test]
    async fn catch_panic_turns_panics_into_failures() {
        fn explode() -> Result<i32, String> {
            panic!("kaboom")
        }

        let exploding = TaskResult::new(|| async { explode() });
        let task = exploding.catch_panic(|message| format!("caught: {message}"));
        assert_eq!(task.run().await, Err("caught: kaboom".to_string()));

        let sync_panic = TaskResult::<i32, String>::new(|| -> future::Ready<Result<i32, String>> {
            panic!("before the future")
        });
        let task = sync_panic.catch_panic(|message| message);
        assert_eq!(task.run().await, Err("before the future".to_string()));
    }

    #[tokio::test]
    async fn fold_lowers_to_plain_task() {
        let ok = TaskResult::<i32, &str>::succeed(2).fold(|_| 0, |x| x * 10);
        let err = TaskResult::<i32, &str>::fail("e").fold(|_| 0, |x| x * 10);
        assert_eq!(ok.run().await, 20);
        assert_eq!(err.run().await, 0);
    }

    #[tokio::test]
    async fn recover_unless_respects_blocklist() {
        let counter = CallCounter::new();
        let fallback_counter = counter.clone();
        let fallback = TaskResult::<i32, &str>::new(move || {
            fallback_counter.hit();
            future::ready(Ok(0))
        });

        let blocked = TaskResult::fail("fatal").recover_unless(["fatal"], fallback.clone());
        assert_eq!(blocked.run().await, Err("fatal"));
        assert_eq!(counter.count(), 0);

        let recovered = TaskResult::fail("flaky").recover_unless(vec!["fatal"], fallback);
        assert_eq!(recovered.run().await, Ok(0));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn all_keeps_order_and_reports_first_failure() {
        let ms = Duration::from_millis;
        let tasks = vec![
            TaskResult::<_, &str>::succeed("slow").delay(ms(30)),
            TaskResult::succeed("fast").delay(ms(5)),
        ];
        assert_eq!(TaskResult::all(tasks).run().await, Ok(vec!["slow", "fast"]));

        let tasks = vec![
            TaskResult::<&str, _>::fail("first").delay(ms(30)),
            TaskResult::fail("second").delay(ms(5)),
        ];
        assert_eq!(TaskResult::all(tasks).run().await, Err("first"));
    }

    #[tokio::test]
    async fn from_option_and_to_option() {
        let present = TaskResult::from_option(Some(3), || "missing");
        let absent = TaskResult::<i32, _>::from_option(None, || "missing");
        assert_eq!(present.run().await, Ok(3));
        assert_eq!(absent.clone().run().await, Err("missing"));
        assert_eq!(absent.to_option().run().await, None);
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    #[tracing_test::traced_test]
    async fn retry_and_timeout_emit_debug_events() {
        let counter = CallCounter::new();
        always_failing(&counter, "down")
            .retry(RetryPolicy::new(2))
            .run()
            .await
            .unwrap_err();
        assert!(logs_contain("task failed, retrying"));
        assert!(logs_contain("task failed, not retrying"));

        let never = TaskResult::<i32, &str>::new(future::pending);
        never
            .timeout(Duration::from_millis(1), || "late")
            .run()
            .await
            .unwrap_err();
        assert!(logs_contain("task timed out"));
    }

    #[tokio::test]
    async fn into_validation_wraps_error() {
        let v = TaskResult::<i32, _>::fail("bad").into_validation();
        assert_eq!(v.run().await, Validation::invalid("bad"));
    }
}
