//! Semigroup trait for associative combination
//!
//! Error accumulation in [`Validation`](crate::Validation) is built on this
//! trait: two independently produced error collections are merged with
//! `combine`, left operand first.
//!
//! # Laws
//!
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use undertow::{NonEmptyVec, Semigroup};
//!
//! assert_eq!(vec![1, 2].combine(vec![3]), vec![1, 2, 3]);
//! assert_eq!("ab".to_string().combine("c".to_string()), "abc");
//!
//! let errors = NonEmptyVec::singleton("first").combine(NonEmptyVec::singleton("second"));
//! assert_eq!(errors.into_vec(), vec!["first", "second"]);
//! ```

/// A type that supports an associative binary operation.
///
/// `combine` takes both operands by value; clone first if the originals are
/// still needed.
pub trait Semigroup: Sized {
    /// Combine `self` with `other`, keeping `self`'s contents first.
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vec_combine_keeps_left_first() {
        assert_eq!(vec!["a"].combine(vec!["b", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn string_combine_concatenates() {
        assert_eq!("err: ".to_string().combine("boom".to_string()), "err: boom");
    }

    proptest! {
        #[test]
        fn vec_combine_is_associative(
            a in prop::collection::vec(any::<u8>(), 0..8),
            b in prop::collection::vec(any::<u8>(), 0..8),
            c in prop::collection::vec(any::<u8>(), 0..8),
        ) {
            let left = a.clone().combine(b.clone()).combine(c.clone());
            let right = a.combine(b.combine(c));
            prop_assert_eq!(left, right);
        }
    }
}
