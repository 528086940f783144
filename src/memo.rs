//! Caller-owned caches
//!
//! There is no global cache anywhere in this crate. When a pure, expensive
//! function should only run once per input, the caller creates a [`Memo`]
//! and decides its lifetime and key.
//!
//! ```
//! use undertow::{memoize, Memo};
//!
//! let cache = Memo::new();
//! let word_count = memoize(&cache, |text: &&str| text.to_string(), |text: &str| {
//!     text.split_whitespace().count()
//! });
//!
//! assert_eq!(word_count("a b c"), 3);
//! assert_eq!(word_count("a b c"), 3);
//! assert_eq!(cache.len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// A shared, thread-safe cache from `K` to `V`.
///
/// Clones share the same entries.
pub struct Memo<K, V> {
    entries: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Clone for Memo<K, V> {
    fn clone(&self) -> Self {
        Memo {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> fmt::Debug for Memo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("len", &self.entries.lock().len())
            .finish()
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held, so it may use the same cache.
    /// If two callers miss concurrently, the first value stored wins and both
    /// receive it.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.entries.lock().get(&key) {
            return value.clone();
        }
        let value = compute();
        self.entries.lock().entry(key).or_insert(value).clone()
    }

    /// Look up a cached value.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Wrap `f` so results are cached in `memo` under `key_fn(&arg)`.
///
/// Arguments that map to the same key share one cached result, so `key_fn`
/// must only identify arguments for which `f` gives the same answer.
pub fn memoize<A, K, V, KF, F>(memo: &Memo<K, V>, key_fn: KF, f: F) -> impl Fn(A) -> V
where
    K: Eq + Hash,
    V: Clone,
    KF: Fn(&A) -> K,
    F: Fn(A) -> V,
{
    let memo = memo.clone();
    move |arg| {
        let key = key_fn(&arg);
        memo.get_or_insert_with(key, || f(arg))
    }
}
