//! Validation type for accumulating errors
//!
//! `Validation` has the same shape as `Result`, but its applicative
//! combinators (`ap`, `and`, `all`, `combine`) merge the errors of both sides
//! instead of stopping at the first one. A form with three broken fields
//! reports three errors in one pass.
//!
//! Sequencing with [`Validation::and_then`] still fails fast: a step that
//! depends on a previous value cannot run without it.
//!
//! # Examples
//!
//! ```
//! use undertow::Validation;
//!
//! fn validate_name(name: &str) -> Validation<String, &'static str> {
//!     if name.is_empty() {
//!         Validation::invalid("name is required")
//!     } else {
//!         Validation::valid(name.to_string())
//!     }
//! }
//!
//! fn validate_age(age: u8) -> Validation<u8, &'static str> {
//!     if age >= 18 {
//!         Validation::valid(age)
//!     } else {
//!         Validation::invalid("must be an adult")
//!     }
//! }
//!
//! let result = Validation::all((validate_name(""), validate_age(12)));
//! assert_eq!(
//!     result.errors().map(|e| e.clone().into_vec()),
//!     Some(vec!["name is required", "must be an adult"]),
//! );
//! ```

use crate::{NonEmptyVec, Semigroup};

/// The outcome of a validation: a value, or at least one error.
///
/// The error list of `Invalid` is never empty; [`NonEmptyVec`] makes an empty
/// `Invalid` unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation<T, E> {
    /// Validation passed with a value
    Valid(T),
    /// Validation failed with one or more errors
    Invalid(NonEmptyVec<E>),
}

impl<T, E> Validation<T, E> {
    /// Create a passing validation.
    #[inline]
    pub fn valid(value: T) -> Self {
        Validation::Valid(value)
    }

    /// Create a failing validation with a single error.
    ///
    /// ```
    /// use undertow::Validation;
    ///
    /// let v = Validation::<i32, _>::invalid("too short");
    /// assert!(v.is_invalid());
    /// ```
    #[inline]
    pub fn invalid(error: E) -> Self {
        Validation::Invalid(NonEmptyVec::singleton(error))
    }

    /// Create a failing validation carrying several errors.
    #[inline]
    pub fn invalid_all(errors: NonEmptyVec<E>) -> Self {
        Validation::Invalid(errors)
    }

    /// Lift a `Result`; an `Err` becomes a single-error `Invalid`.
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Valid(value),
            Err(error) => Validation::invalid(error),
        }
    }

    /// Convert into a `Result` carrying the full error list.
    #[inline]
    pub fn into_result(self) -> Result<T, NonEmptyVec<E>> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(errors) => Err(errors),
        }
    }

    /// Discard the errors, keeping the value if there is one.
    #[inline]
    pub fn ok(self) -> Option<T> {
        match self {
            Validation::Valid(value) => Some(value),
            Validation::Invalid(_) => None,
        }
    }

    /// Check if this validation passed.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    /// Check if this validation failed.
    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Validation::Invalid(_))
    }

    /// Borrow the errors of an `Invalid`.
    pub fn errors(&self) -> Option<&NonEmptyVec<E>> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid(errors) => Some(errors),
        }
    }

    /// Transform the value of a `Valid`.
    ///
    /// ```
    /// use undertow::Validation;
    ///
    /// let v = Validation::<_, String>::valid(5).map(|x| x * 2);
    /// assert_eq!(v, Validation::Valid(10));
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Valid(value) => Validation::Valid(f(value)),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Transform every error of an `Invalid`.
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnMut(E) -> E2,
    {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid(errors) => Validation::Invalid(errors.map(f)),
        }
    }

    /// Transform the error list of an `Invalid` as a whole.
    #[inline]
    pub fn map_errors<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnOnce(NonEmptyVec<E>) -> NonEmptyVec<E2>,
    {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid(errors) => Validation::Invalid(f(errors)),
        }
    }

    /// Chain a dependent validation.
    ///
    /// Fails fast: on `Invalid` the function is never called and the errors
    /// propagate unchanged.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> Validation<U, E>,
    {
        match self {
            Validation::Valid(value) => f(value),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Apply a validated function to a validated argument, accumulating.
    ///
    /// When both sides are `Invalid` the result carries the function side's
    /// errors followed by the argument side's. When exactly one side is
    /// `Invalid` its errors are returned.
    ///
    /// ```
    /// use undertow::Validation;
    ///
    /// let f = Validation::<fn(i32) -> i32, _>::invalid("bad fn");
    /// let arg = Validation::<i32, _>::invalid("bad arg");
    /// let result = f.ap(arg);
    /// assert_eq!(result.errors().unwrap().clone().into_vec(), vec!["bad fn", "bad arg"]);
    /// ```
    pub fn ap<A, B>(self, arg: Validation<A, E>) -> Validation<B, E>
    where
        T: FnOnce(A) -> B,
    {
        match (self, arg) {
            (Validation::Valid(f), Validation::Valid(a)) => Validation::Valid(f(a)),
            (Validation::Invalid(e1), Validation::Invalid(e2)) => {
                Validation::Invalid(e1.combine(e2))
            }
            (Validation::Invalid(errors), _) | (_, Validation::Invalid(errors)) => {
                Validation::Invalid(errors)
            }
        }
    }

    /// Pair two validations, accumulating errors from both.
    ///
    /// ```
    /// use undertow::Validation;
    ///
    /// let v = Validation::<_, &str>::valid(1).and(Validation::valid("one"));
    /// assert_eq!(v, Validation::Valid((1, "one")));
    /// ```
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        self.map(|a| move |b: U| (a, b)).ap(other)
    }

    /// Reduce two validations, keeping the second value when both pass.
    ///
    /// The reducer exists to collect errors, so the error law is the same as
    /// [`ap`](Validation::ap); the first success value is dropped.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Validation::Valid(_), other @ Validation::Valid(_)) => other,
            (Validation::Invalid(e1), Validation::Invalid(e2)) => {
                Validation::Invalid(e1.combine(e2))
            }
            (invalid @ Validation::Invalid(_), _) | (_, invalid @ Validation::Invalid(_)) => {
                invalid
            }
        }
    }

    /// Left-fold [`combine`](Validation::combine) over a sequence.
    ///
    /// There is no identity element, so an empty input yields `None`.
    ///
    /// ```
    /// use undertow::Validation;
    ///
    /// let none = Validation::<i32, &str>::combine_all(Vec::new());
    /// assert_eq!(none, None);
    ///
    /// let some = Validation::combine_all(vec![
    ///     Validation::valid(1),
    ///     Validation::invalid("a"),
    ///     Validation::invalid("b"),
    /// ]);
    /// assert_eq!(some.and_then(|v| v.errors().map(|e| e.len())), Some(2));
    /// ```
    pub fn combine_all<I>(validations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        validations.into_iter().reduce(Validation::combine)
    }

    /// Collect a list of validations, accumulating every error in input order.
    ///
    /// An empty input is `Valid(vec![])`.
    pub fn all_vec(validations: Vec<Validation<T, E>>) -> Validation<Vec<T>, E> {
        validations.into_iter().collect()
    }

    /// Combine a tuple of validations; see [`ValidateAll`].
    pub fn all<V>(validations: V) -> Self
    where
        V: ValidateAll<E, Output = T>,
    {
        validations.validate_all()
    }

    /// Eliminate the validation; exactly one handler runs.
    pub fn fold<B, F, G>(self, on_invalid: F, on_valid: G) -> B
    where
        F: FnOnce(NonEmptyVec<E>) -> B,
        G: FnOnce(T) -> B,
    {
        match self {
            Validation::Valid(value) => on_valid(value),
            Validation::Invalid(errors) => on_invalid(errors),
        }
    }

    /// Return the value, or compute one from the errors.
    pub fn get_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(NonEmptyVec<E>) -> T,
    {
        self.fold(f, |value| value)
    }

    /// Replace an `Invalid` with `fallback`.
    pub fn recover(self, fallback: Self) -> Self {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid(_) => fallback,
        }
    }

    /// Replace an `Invalid` with `fallback` unless any of its errors is blocked.
    ///
    /// Blocked errors are unrecoverable: if a single error of a multi-error
    /// `Invalid` appears in `blocked`, the original propagates unchanged.
    ///
    /// ```
    /// use undertow::{NonEmptyVec, Validation};
    ///
    /// let failed = Validation::<i32, _>::invalid_all(NonEmptyVec::new("timeout", vec!["fatal"]));
    /// let result = failed.recover_unless(&["fatal"], Validation::valid(0));
    /// assert!(result.is_invalid());
    /// ```
    pub fn recover_unless(self, blocked: &[E], fallback: Self) -> Self
    where
        E: PartialEq,
    {
        match self {
            Validation::Invalid(errors) if errors.iter().any(|e| blocked.contains(e)) => {
                Validation::Invalid(errors)
            }
            other => other.recover(fallback),
        }
    }

    /// Turn a `Valid` into an `Invalid` when `predicate` rejects its value.
    pub fn ensure<P>(self, predicate: P, error: E) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        self.and_then(|value| {
            if predicate(&value) {
                Validation::Valid(value)
            } else {
                Validation::invalid(error)
            }
        })
    }

    /// Run a side effect on the value without changing it.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Validation::Valid(value) = &self {
            f(value);
        }
        self
    }
}

impl<T, E> From<Result<T, E>> for Validation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Validation::from_result(result)
    }
}

impl<T, E> FromIterator<Validation<T, E>> for Validation<Vec<T>, E> {
    fn from_iter<I: IntoIterator<Item = Validation<T, E>>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Validation::Valid(Vec::new()), |acc, next| {
                acc.map(|mut values: Vec<T>| {
                    move |value: T| {
                        values.push(value);
                        values
                    }
                })
                .ap(next)
            })
    }
}

/// Combine a tuple of validations of different value types.
///
/// Implemented for tuples of 1 to 8 validations sharing an error type. Errors
/// accumulate left to right.
pub trait ValidateAll<E> {
    /// The tuple of values produced when every validation passes
    type Output;

    /// Combine all validations, accumulating errors.
    fn validate_all(self) -> Validation<Self::Output, E>;
}

impl<E, A> ValidateAll<E> for (Validation<A, E>,) {
    type Output = (A,);

    fn validate_all(self) -> Validation<Self::Output, E> {
        self.0.map(|a| (a,))
    }
}

macro_rules! impl_validate_all {
    ($first:ident $(, $rest:ident)+) => {
        impl<E, $first $(, $rest)+> ValidateAll<E> for (Validation<$first, E> $(, Validation<$rest, E>)+) {
            type Output = ($first $(, $rest)+);

            #[allow(non_snake_case)]
            fn validate_all(self) -> Validation<Self::Output, E> {
                let ($first $(, $rest)+) = self;
                let acc = $first.map(|v| (v,));
                $(
                    let acc = acc
                        .and($rest)
                        .map(|(prefix, last)| TupleAppend::append(prefix, last));
                )+
                acc
            }
        }
    };
}

/// Appends one element to a tuple; used to flatten nested pairs.
trait TupleAppend<X> {
    type Appended;
    fn append(self, x: X) -> Self::Appended;
}

macro_rules! impl_tuple_append {
    ($($T:ident),*) => {
        impl<$($T,)* X> TupleAppend<X> for ($($T,)*) {
            type Appended = ($($T,)* X,);

            #[allow(non_snake_case)]
            fn append(self, x: X) -> Self::Appended {
                let ($($T,)*) = self;
                ($($T,)* x,)
            }
        }
    };
}

impl_tuple_append!(A);
impl_tuple_append!(A, B);
impl_tuple_append!(A, B, C);
impl_tuple_append!(A, B, C, D);
impl_tuple_append!(A, B, C, D, F);
impl_tuple_append!(A, B, C, D, F, G);
impl_tuple_append!(A, B, C, D, F, G, H);

impl_validate_all!(T1, T2);
impl_validate_all!(T1, T2, T3);
impl_validate_all!(T1, T2, T3, T4);
impl_validate_all!(T1, T2, T3, T4, T5);
impl_validate_all!(T1, T2, T3, T4, T5, T6);
impl_validate_all!(T1, T2, T3, T4, T5, T6, T7);
impl_validate_all!(T1, T2, T3, T4, T5, T6, T7, T8);
