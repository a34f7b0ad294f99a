//! # Lookaside caching for remote lookups
//!
//! Remote lookups (does this path exist on the other side, what permission
//! level does this user have) are slow and can fail. This crate memoizes
//! them: each fact is computed at most once per [`Store`], successes and
//! failures alike, and every caller that asks again gets the captured result.
//!
//! ## Building blocks
//!
//! - A [`CacheKey`] is an ordered sequence of opaque string segments
//!   (typically operation, path or user, and zone) identifying one entry.
//! - A [`Slot`] is a lazily evaluated, memoizing computation: constructing it
//!   runs nothing, the first force runs the wrapped action exactly once, and
//!   every forcer observes the single captured result forever after.
//! - The [`Store`] is the shared, append-only table from keys to slots. Its
//!   only mutation is an atomic install-if-absent, so concurrent installers
//!   of one key agree on a single winner.
//!
//! The two layers compose into a strict at-most-once guarantee per key: the
//! install race picks one slot, and that slot runs its action once no matter
//! how many holders force it concurrently. Losing either race is free:
//! an unevaluated slot that is dropped unforced never did any work.
//!
//! ## Populating
//!
//! Three entry points cover how long a caller is willing to wait:
//!
//! - [`Store::populate`] installs a lazy slot and defers all cost to the
//!   point where somebody actually forces it.
//! - [`Store::populate_async`] submits the action to a bounded
//!   [`WorkerPool`] and returns a [`SpawnHandle`] immediately; only forcing
//!   the handle waits for the background task. Already-resolved store
//!   entries are answered without spawning anything. Note that this path
//!   deduplicates *resolved* entries only: pending keys are not consulted
//!   and the handle is never installed into the store, so concurrent async
//!   populations of one unresolved key each run their own task.
//! - [`Store::peek`] returns a resolved slot or nothing, and is guaranteed
//!   never to execute or wait; pending entries look exactly like absent
//!   ones, which lets callers poll with a fallback.
//!
//! ## [`CacheContents`] / [`CacheError`]
//!
//! Actions return [`CacheContents<V>`], an alias for
//! `Result<V, CacheError>`. A failure raised by an action is captured into
//! the slot as data, exactly like a success; the cache stores and rethrows
//! it but never interprets it. Callers unwrap a forced result with `?`,
//! which restores ordinary fail-fast behavior at the edge: a cached failure
//! is indistinguishable from a fresh one. Captured failures are permanent;
//! retrying a failed key means using a fresh key or a fresh store.
//!
//! ## Observability
//!
//! The store reports lookups, installs, pool submissions and action runs to
//! a [`CacheObserver`]. The default [`TracingObserver`] turns these into
//! `tracing` events tagged with the cache name; embedders with their own
//! telemetry pipeline inject a custom observer via
//! [`Store::with_observer`].

#![warn(missing_docs)]

mod config;
mod error;
mod key;
pub mod logging;
mod observer;
mod pool;
mod slot;
mod store;


pub use config::CacheConfig;
pub use error::{CacheContents, CacheError};
pub use key::{CacheKey, CacheKeyBuilder};
pub use observer::{CacheObserver, TracingObserver};
pub use pool::{SpawnHandle, WorkerPool};
pub use slot::Slot;
pub use store::Store;
