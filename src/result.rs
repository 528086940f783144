//! Extensions for `std::result::Result`
//!
//! `Result` already provides `map`, `and_then` (fail-fast chaining) and `ok`.
//! [`ResultExt`] adds the remaining pieces: elimination with [`fold`],
//! application with a fixed failure priority, and fallback substitution that
//! can refuse to recover from blocked errors.
//!
//! [`fold`]: ResultExt::fold
//!
//! ```
//! use undertow::ResultExt;
//!
//! let parsed: Result<i32, &str> = Err("not a number");
//! let message = parsed.fold(|e| format!("error: {e}"), |n| format!("got {n}"));
//! assert_eq!(message, "error: not a number");
//! ```

use crate::Validation;

/// Apply a function held in a `Result` to an argument held in a `Result`.
///
/// Short-circuits. When both sides are `Err`, the function side's error is
/// returned.
///
/// ```
/// use undertow::result::ap;
///
/// let f: Result<fn(i32) -> i32, &str> = Err("no function");
/// assert_eq!(ap(f, Err::<i32, _>("no argument")), Err("no function"));
/// ```
pub fn ap<F, A, B, E>(f: Result<F, E>, arg: Result<A, E>) -> Result<B, E>
where
    F: FnOnce(A) -> B,
{
    let f = f?;
    arg.map(f)
}

/// Combinators missing from `std::result::Result`.
pub trait ResultExt<T, E>: Sized {
    /// Eliminate the result into a common type; exactly one handler runs.
    fn fold<B, F, G>(self, on_failure: F, on_success: G) -> B
    where
        F: FnOnce(E) -> B,
        G: FnOnce(T) -> B;

    /// Apply the function in `self` to `arg`; see [`ap`].
    fn ap<A, B>(self, arg: Result<A, E>) -> Result<B, E>
    where
        T: FnOnce(A) -> B;

    /// Replace an `Err` with `fallback`.
    fn recover(self, fallback: Result<T, E>) -> Result<T, E>;

    /// Replace an `Err` with the result of `f`.
    fn recover_with<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(E) -> Result<T, E>;

    /// Replace an `Err` with `fallback` unless the error is blocked.
    ///
    /// ```
    /// use undertow::ResultExt;
    ///
    /// let fatal: Result<i32, &str> = Err("fatal");
    /// assert_eq!(fatal.recover_unless(&["fatal"], Ok(0)), Err("fatal"));
    ///
    /// let soft: Result<i32, &str> = Err("soft");
    /// assert_eq!(soft.recover_unless(&["fatal"], Ok(0)), Ok(0));
    /// ```
    fn recover_unless(self, blocked: &[E], fallback: Result<T, E>) -> Result<T, E>
    where
        E: PartialEq;

    /// Run a side effect on the success value.
    fn tap<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T);

    /// Run a side effect on the error value.
    fn tap_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&E);

    /// Lift into a `Validation` with a single error.
    fn to_validation(self) -> Validation<T, E>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    #[inline]
    fn fold<B, F, G>(self, on_failure: F, on_success: G) -> B
    where
        F: FnOnce(E) -> B,
        G: FnOnce(T) -> B,
    {
        match self {
            Ok(value) => on_success(value),
            Err(error) => on_failure(error),
        }
    }

    #[inline]
    fn ap<A, B>(self, arg: Result<A, E>) -> Result<B, E>
    where
        T: FnOnce(A) -> B,
    {
        ap(self, arg)
    }

    #[inline]
    fn recover(self, fallback: Result<T, E>) -> Result<T, E> {
        self.or(fallback)
    }

    #[inline]
    fn recover_with<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(E) -> Result<T, E>,
    {
        self.or_else(f)
    }

    fn recover_unless(self, blocked: &[E], fallback: Result<T, E>) -> Result<T, E>
    where
        E: PartialEq,
    {
        match self {
            Err(error) if blocked.contains(&error) => Err(error),
            other => other.recover(fallback),
        }
    }

    #[inline]
    fn tap<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T),
    {
        self.inspect(f)
    }

    #[inline]
    fn tap_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&E),
    {
        self.inspect_err(f)
    }

    #[inline]
    fn to_validation(self) -> Validation<T, E> {
        Validation::from_result(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn and_then_never_calls_continuation_on_failure() {
        let calls = Cell::new(0);
        let failed: Result<i32, &str> = Err("boom");
        let result = failed.and_then(|x| {
            calls.set(calls.get() + 1);
            Ok::<_, &str>(x + 1)
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn ap_prefers_function_side_failure() {
        let f: Result<fn(i32) -> i32, &str> = Err("fn");
        assert_eq!(f.ap(Err("arg")), Err("fn"));
    }

    #[test]
    fn ap_applies_when_both_succeed() {
        let f: Result<_, &str> = Ok(|x: i32| x * 3);
        assert_eq!(f.ap(Ok(14)), Ok(42));

        let f: Result<_, &str> = Ok(|x: i32| x * 3);
        assert_eq!(f.ap(Err("arg")), Err("arg"));
    }

    #[test]
    fn fold_runs_exactly_one_handler() {
        let ok: Result<i32, &str> = Ok(2);
        assert_eq!(ok.fold(|_| -1, |x| x * 10), 20);

        let err: Result<i32, &str> = Err("x");
        assert_eq!(err.fold(|e| e.len() as i32, |x| x), 1);
    }

    #[test]
    fn recover_substitutes_only_on_failure() {
        assert_eq!(Ok::<_, &str>(1).recover(Ok(2)), Ok(1));
        assert_eq!(Err::<i32, _>("e").recover(Ok(2)), Ok(2));
        assert_eq!(Err::<i32, _>("e").recover_with(|e| Ok(e.len() as i32)), Ok(1));
    }

    #[test]
    fn recover_unless_propagates_blocked_error() {
        let blocked = ["fatal", "corrupt"];
        assert_eq!(Err::<i32, _>("corrupt").recover_unless(&blocked, Ok(0)), Err("corrupt"));
        assert_eq!(Err::<i32, _>("flaky").recover_unless(&blocked, Ok(0)), Ok(0));
        assert_eq!(Ok::<_, &str>(7).recover_unless(&blocked, Ok(0)), Ok(7));
    }

    #[test]
    fn tap_observes_without_changing() {
        let seen = Cell::new(0);
        let result = Ok::<_, &str>(5).tap(|x| seen.set(*x)).tap_err(|_| seen.set(-1));
        assert_eq!(result, Ok(5));
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn to_validation_wraps_single_error() {
        let v = Err::<i32, _>("bad").to_validation();
        assert_eq!(v, Validation::invalid("bad"));
    }
}
