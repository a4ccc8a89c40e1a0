//! Keyed single-flight memoization.
//!
//! Provides [`FlightCache`], a thread-safe concurrent map from a key to a value
//! that is computed at most once at a time. Concurrent callers for the same key
//! join the in-flight computation and all observe its outcome. Successful
//! values are kept for the lifetime of the cache; a failure is handed to every
//! caller of that flight and then forgotten, so the next call starts afresh.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

type Flight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    Ready(V),
    Pending(Flight<V, E>),
}

/// Thread-safe, keyed, single-flight cache.
///
/// # Examples
///
/// ```
/// use futures::FutureExt;
/// use smdeploy_core::FlightCache;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let cache = FlightCache::<&str, u32, String>::new();
/// let v = cache.get_or_try_init("answer", || async { Ok(42) }.boxed()).await;
/// assert_eq!(v, Ok(42));
/// assert_eq!(cache.get(&"answer"), Some(42));
/// # });
/// ```
pub struct FlightCache<K, V, E> {
    inner: DashMap<K, Slot<V, E>>,
}

impl<K, V, E> FlightCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, joining or starting a computation.
    ///
    /// `init` is called only when no value is cached and no computation for
    /// `key` is in flight.
    ///
    /// # Errors
    /// Returns the error of the flight this call joined.
    pub async fn get_or_try_init<F>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V, E>>,
    {
        // The entry guard must be released before awaiting.
        let flight = match self.inner.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Pending(flight) => flight.clone(),
            },
            Entry::Vacant(entry) => {
                let flight = init().shared();
                entry.insert(Slot::Pending(flight.clone()));
                flight
            }
        };

        let result = flight.clone().await;
        self.settle(key, &flight, &result);
        result
    }

    /// Record the outcome of `flight`, unless the slot has since moved on.
    fn settle(&self, key: K, flight: &Flight<V, E>, result: &Result<V, E>) {
        if let Entry::Occupied(mut entry) = self.inner.entry(key) {
            let ours = matches!(entry.get(), Slot::Pending(f) if f.ptr_eq(flight));
            if !ours {
                return;
            }
            match result {
                Ok(value) => {
                    entry.insert(Slot::Ready(value.clone()));
                }
                Err(_) => {
                    entry.remove();
                }
            }
        }
    }

    /// The cached value for `key`, if one is ready.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).and_then(|slot| match slot.value() {
            Slot::Ready(value) => Some(value.clone()),
            Slot::Pending(_) => None,
        })
    }

    /// Number of keys that are cached or in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V, E> Default for FlightCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V, E> fmt::Debug for FlightCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightCache")
            .field("entries", &self.inner.len())
            .finish()
    }
}
