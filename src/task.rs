//! Re-invocable asynchronous computations
//!
//! A [`Task<T>`] is a zero-argument producer of a future. Nothing happens
//! when a task is built or combined; work starts when [`Task::run`] is
//! called, and every call starts it again. There is no caching and no
//! de-duplication of concurrent runs.
//!
//! # Examples
//!
//! ```
//! use undertow::Task;
//!
//! # tokio_test::block_on(async {
//! let task = Task::of(20)
//!     .map(|x| x + 1)
//!     .and_then(|x| Task::of(x * 2));
//!
//! assert_eq!(task.run().await, 42);
//! // Running again re-runs the whole pipeline.
//! assert_eq!(task.run().await, 42);
//! # });
//! ```
//!
//! # Concurrency
//!
//! [`Task::ap`], [`Task::zip`] and [`Task::all`] start every underlying task
//! before awaiting any of them, and report results in input order no matter
//! which one finishes first. They interleave on the calling task; nothing is
//! spawned onto other threads.
//!
//! ```
//! use undertow::Task;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let slow = Task::of("slow").delay(Duration::from_millis(30));
//! let fast = Task::of("fast").delay(Duration::from_millis(5));
//!
//! assert_eq!(Task::all(vec![slow, fast]).run().await, vec!["slow", "fast"]);
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};

type Producer<T> = dyn Fn() -> BoxFuture<'static, T> + Send + Sync;

/// A deferred, re-invocable asynchronous computation producing `T`.
///
/// Cloning a task is cheap and shares the producer; both clones run the same
/// work independently.
pub struct Task<T> {
    producer: Arc<Producer<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Task {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("producer", &"<function>")
            .finish()
    }
}

/// How many times [`Task::repeat`] runs a task, and how long it waits in
/// between.
///
/// ```
/// use undertow::Repeat;
/// use std::time::Duration;
///
/// let options = Repeat::times(3).with_delay(Duration::from_millis(50));
/// assert_eq!(options.times, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repeat {
    /// Number of sequential runs. Zero runs nothing.
    pub times: usize,
    /// Wait between two runs, never before the first or after the last.
    pub delay: Option<Duration>,
}

impl Repeat {
    /// Run `times` times back to back.
    pub fn times(times: usize) -> Self {
        Repeat { times, delay: None }
    }

    /// Wait `delay` between runs.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl<T: Send + 'static> Task<T> {
    /// Create a task from a producer of futures.
    ///
    /// The producer is called once per [`run`](Task::run).
    ///
    /// ```
    /// use undertow::Task;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let calls = Arc::new(AtomicUsize::new(0));
    /// let task = Task::new({
    ///     let calls = Arc::clone(&calls);
    ///     move || {
    ///         let calls = Arc::clone(&calls);
    ///         async move { calls.fetch_add(1, Ordering::SeqCst) + 1 }
    ///     }
    /// });
    ///
    /// assert_eq!(calls.load(Ordering::SeqCst), 0);
    /// assert_eq!(task.run().await, 1);
    /// assert_eq!(task.run().await, 2);
    /// # });
    /// ```
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Task {
            producer: Arc::new(move || producer().boxed()),
        }
    }

    /// A task that resolves to a clone of `value` every time it runs.
    pub fn of(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Task::new(move || future::ready(value.clone()))
    }

    /// A task that calls the synchronous `f` each time it runs.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Task::new(move || future::ready(f()))
    }

    /// Invoke the task, returning the future for this run.
    pub fn run(&self) -> BoxFuture<'static, T> {
        (self.producer)()
    }

    /// Transform the resolved value.
    pub fn map<U, F>(self, f: F) -> Task<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move { f(pending.await) }
        })
    }

    /// Sequence a dependent task after this one resolves.
    pub fn and_then<U, F>(self, f: F) -> Task<U>
    where
        F: Fn(T) -> Task<U> + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move {
                let next = f(pending.await);
                next.run().await
            }
        })
    }

    /// Apply the function this task produces to the value `arg` produces.
    ///
    /// Both tasks are started before either is awaited.
    ///
    /// ```
    /// use undertow::Task;
    ///
    /// # tokio_test::block_on(async {
    /// let add_one = Task::from_fn(|| |x: i32| x + 1);
    /// assert_eq!(add_one.ap(Task::of(41)).run().await, 42);
    /// # });
    /// ```
    pub fn ap<A, B>(self, arg: Task<A>) -> Task<B>
    where
        T: FnOnce(A) -> B,
        A: Send + 'static,
        B: Send + 'static,
    {
        Task::new(move || {
            let f = self.run();
            let a = arg.run();
            async move {
                let (f, a) = futures::join!(f, a);
                f(a)
            }
        })
    }

    /// Run two tasks concurrently and pair their values.
    pub fn zip<U>(self, other: Task<U>) -> Task<(T, U)>
    where
        U: Send + 'static,
    {
        Task::new(move || future::join(self.run(), other.run()))
    }

    /// Run every task concurrently, collecting values in input order.
    pub fn all<I>(tasks: I) -> Task<Vec<T>>
    where
        I: IntoIterator<Item = Task<T>>,
    {
        let tasks: Vec<Task<T>> = tasks.into_iter().collect();
        Task::new(move || future::join_all(tasks.iter().map(Task::run)))
    }

    /// Run tasks one after another, collecting values in input order.
    ///
    /// Task N+1 is not invoked before task N resolves.
    pub fn sequence<I>(tasks: I) -> Task<Vec<T>>
    where
        I: IntoIterator<Item = Task<T>>,
    {
        let tasks: Arc<[Task<T>]> = tasks.into_iter().collect();
        Task::new(move || {
            let tasks = Arc::clone(&tasks);
            async move {
                let mut values = Vec::with_capacity(tasks.len());
                for task in tasks.iter() {
                    values.push(task.run().await);
                }
                values
            }
        })
    }

    /// Wait `duration` before invoking the task.
    pub fn delay(self, duration: Duration) -> Task<T> {
        Task::new(move || {
            let task = self.clone();
            async move {
                tokio::time::sleep(duration).await;
                task.run().await
            }
        })
    }

    /// Observe the resolved value without changing it.
    pub fn tap<F>(self, f: F) -> Task<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.map(move |value| {
            f(&value);
            value
        })
    }

    /// Run the task `options.times` times in sequence, collecting every value.
    ///
    /// ```
    /// use undertow::{Repeat, Task};
    ///
    /// # tokio_test::block_on(async {
    /// let ticks = Task::of("tick").repeat(Repeat::times(3));
    /// assert_eq!(ticks.run().await, vec!["tick"; 3]);
    /// # });
    /// ```
    pub fn repeat(self, options: Repeat) -> Task<Vec<T>> {
        let delay = options.delay.filter(|d| !d.is_zero());
        Task::new(move || {
            let task = self.clone();
            async move {
                let mut values = Vec::new();
                for run in 0..options.times {
                    if run > 0 {
                        if let Some(d) = delay {
                            tokio::time::sleep(d).await;
                        }
                    }
                    #[cfg(feature = "tracing")]
                    tracing::trace!(run = run + 1, times = options.times, "repeating task");
                    values.push(task.run().await);
                }
                values
            }
        })
    }

    /// Run the task repeatedly until `when` accepts a value, then return it.
    ///
    /// There is no attempt ceiling: a predicate that never accepts loops
    /// forever.
    pub fn repeat_until<P>(self, when: P, delay: Option<Duration>) -> Task<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let when = Arc::new(when);
        let delay = delay.filter(|d| !d.is_zero());
        Task::new(move || {
            let task = self.clone();
            let when = Arc::clone(&when);
            async move {
                loop {
                    let value = task.run().await;
                    if when(&value) {
                        return value;
                    }
                    if let Some(d) = delay {
                        tokio::time::sleep(d).await;
                    }
                }
            }
        })
    }

    /// Run every invocation of this task inside `span`.
    ///
    /// ```rust,ignore
    /// let task = fetch_profile(id).instrument(tracing::info_span!("fetch_profile", %id));
    /// ```
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> Task<T> {
        use tracing::Instrument as _;
        Task::new(move || {
            let pending = span.in_scope(|| self.run());
            pending.instrument(span.clone())
        })
    }
}
