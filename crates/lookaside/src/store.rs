use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::config::CacheConfig;
use crate::error::CacheContents;
use crate::key::CacheKey;
use crate::observer::{CacheObserver, TracingObserver};
use crate::pool::{SpawnHandle, WorkerPool};
use crate::slot::Slot;

/// The shared table of memoized lookups.
///
/// A store maps [`CacheKey`]s to [`Slot`]s and is shared between all
/// collaborators of the owning context (a request, a session). It is
/// append-only: once a key holds a slot, that slot is never replaced or
/// removed for the lifetime of the store. There is no eviction and no retry;
/// a captured failure stays cached like any success, and retrying a failed
/// key is a policy decision for the caller (a fresh key, or a fresh store).
///
/// Stores are cheap to clone; clones share the same table.
pub struct Store<V: Clone> {
    slots: Arc<Mutex<HashMap<CacheKey, Slot<V>>>>,
    observer: Arc<dyn CacheObserver>,
}

impl<V: Clone> Clone for Store<V> {
    fn clone(&self) -> Self {
        // https://github.com/rust-lang/rust/issues/26925
        Store {
            slots: Arc::clone(&self.slots),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<V: Clone> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.slots.try_lock().map(|s| s.len()).unwrap_or_default();
        f.debug_struct("Store").field("entries", &entries).finish()
    }
}

impl<V> Default for Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty store logging through a [`TracingObserver`].
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver::new("lookaside")))
    }

    /// Creates an empty store tagging its log events with the configured
    /// cache name.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_observer(Arc::new(TracingObserver::new(config.name.clone())))
    }

    /// Creates an empty store with a custom observer.
    pub fn with_observer(observer: Arc<dyn CacheObserver>) -> Self {
        Store {
            slots: Default::default(),
            observer,
        }
    }

    /// Read-only lookup by exact key. No side effects.
    pub fn get(&self, key: &CacheKey) -> Option<Slot<V>> {
        self.slots.lock().unwrap().get(key).cloned()
    }

    /// Atomically installs `slot` at `key` unless the key is already taken.
    ///
    /// Returns whatever slot ends up stored at `key`: the offered one if this
    /// call won the race, the pre-existing one otherwise. Losing costs
    /// nothing: the offered slot is still unevaluated and is simply dropped
    /// unforced, and winner and losers all end up forcing the same slot.
    pub fn install_if_absent(&self, key: CacheKey, slot: Slot<V>) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap();
        match slots.entry(key) {
            Entry::Occupied(entry) => {
                self.observer.on_install(entry.key(), false);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                self.observer.on_install(entry.key(), true);
                entry.insert(slot).clone()
            }
        }
    }

    /// Returns the slot for `key`, installing a new one wrapping `action` on
    /// a miss.
    ///
    /// The returned slot is not forced by this call: the action runs lazily
    /// once some holder forces it, so concurrent populations of one key share
    /// a single pending computation without any of them paying for it up
    /// front. The install race yields one winner per key and the slot itself
    /// executes at most once under concurrent forcing; together they give
    /// strict at-most-once execution of `action` per key.
    pub fn populate<F>(&self, key: CacheKey, action: F) -> Slot<V>
    where
        F: Future<Output = CacheContents<V>> + Send + 'static,
    {
        if let Some(slot) = self.get(&key) {
            self.observer.on_lookup(&key, true);
            return slot;
        }
        self.observer.on_lookup(&key, false);

        let slot = Slot::new(observed(Arc::clone(&self.observer), key.clone(), action));
        self.install_if_absent(key, slot)
    }

    /// Returns a handle for `key`, submitting `action` to `pool` unless the
    /// store already holds a resolved slot for it.
    ///
    /// Submission never suspends the caller; only forcing the returned handle
    /// does. This path consults the store only for resolved entries and never
    /// installs anything: an unresolved key is treated like a miss, so
    /// concurrent async populations of one pending key each submit their own
    /// task. Deduplication of in-flight work is the synchronous
    /// [`populate`](Self::populate)'s job.
    pub fn populate_async<F>(&self, key: CacheKey, action: F, pool: &WorkerPool) -> SpawnHandle<V>
    where
        F: Future<Output = CacheContents<V>> + Send + 'static,
    {
        if let Some(contents) = self.get(&key).and_then(|slot| slot.peek()) {
            self.observer.on_lookup(&key, true);
            return SpawnHandle::resolved(contents);
        }
        self.observer.on_lookup(&key, false);
        self.observer.on_spawn(&key);

        pool.spawn(observed(Arc::clone(&self.observer), key, action))
    }

    /// Returns the already-resolved slot at `key`, if there is one.
    ///
    /// Never executes anything and never suspends. An unresolved slot is
    /// reported as `None` just like an absent key, so callers can poll
    /// without ever being on the hook for a pending computation.
    pub fn peek(&self, key: &CacheKey) -> Option<Slot<V>> {
        let slot = self.get(key)?;
        slot.is_resolved().then_some(slot)
    }
}

/// Wraps an action so the observer sees when it actually runs and how it
/// resolves.
fn observed<V, F>(
    observer: Arc<dyn CacheObserver>,
    key: CacheKey,
    action: F,
) -> impl Future<Output = CacheContents<V>> + Send + 'static
where
    V: Clone + Send + Sync + 'static,
    F: Future<Output = CacheContents<V>> + Send + 'static,
{
    async move {
        observer.on_compute(&key);
        let contents = action.await;
        observer.on_resolve(&key, contents.is_ok());
        contents
    }
}
