use std::sync::Arc;

use crate::key::CacheKey;

/// Observes cache decision points.
///
/// The [`Store`](crate::Store) invokes these hooks at lookup, install, spawn
/// and computation time. Every hook defaults to a no-op, so an observer only
/// implements the events it cares about. [`TracingObserver`] is the stock
/// implementation wired up by [`Store::new`](crate::Store::new).
///
/// Hooks run synchronously on the caller's thread, in the install case while
/// the store lock is held. Implementations must be quick and must not call
/// back into the store.
pub trait CacheObserver: Send + Sync + 'static {
    /// A key was looked up; `hit` tells whether a slot was already installed.
    fn on_lookup(&self, _key: &CacheKey, _hit: bool) {}

    /// A slot was offered for installation; `won` is `false` if a competing
    /// slot was already in place and the offered one was discarded unforced.
    fn on_install(&self, _key: &CacheKey, _won: bool) {}

    /// An action was submitted to the worker pool.
    fn on_spawn(&self, _key: &CacheKey) {}

    /// A slot's action actually started running.
    fn on_compute(&self, _key: &CacheKey) {}

    /// A slot's action finished; `ok` distinguishes a success from a captured
    /// failure.
    fn on_resolve(&self, _key: &CacheKey, _ok: bool) {}
}

/// The default observer: emits `tracing` events for every cache decision,
/// tagged with the cache name.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    name: Arc<str>,
}

impl TracingObserver {
    /// Creates an observer tagging its events with `name`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        TracingObserver { name: name.into() }
    }
}

impl CacheObserver for TracingObserver {
    fn on_lookup(&self, key: &CacheKey, hit: bool) {
        tracing::trace!(cache = %self.name, %key, hit, "cache lookup");
    }

    fn on_install(&self, key: &CacheKey, won: bool) {
        if won {
            tracing::trace!(cache = %self.name, %key, "installed new slot");
        } else {
            tracing::trace!(cache = %self.name, %key, "lost install race, reusing competing slot");
        }
    }

    fn on_spawn(&self, key: &CacheKey) {
        tracing::trace!(cache = %self.name, %key, "submitting lookup to worker pool");
    }

    fn on_compute(&self, key: &CacheKey) {
        tracing::trace!(cache = %self.name, %key, "running lookup");
    }

    fn on_resolve(&self, key: &CacheKey, ok: bool) {
        tracing::trace!(cache = %self.name, %key, ok, "lookup finished");
    }
}
