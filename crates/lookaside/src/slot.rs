use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::CacheContents;

/// The memoized computation shared by all holders of one [`Slot`].
pub(crate) type SharedContents<V> = Shared<BoxFuture<'static, CacheContents<V>>>;

/// A lazily evaluated, memoizing computation.
///
/// A slot starts out unevaluated: constructing it does not run the wrapped
/// action. The first holder to [`force`](Self::force) it drives the action to
/// completion; every concurrent and subsequent forcer observes that single
/// execution and its captured result. A captured failure is just as permanent
/// as a success: it is rethrown to every forcer and never retried.
///
/// Slots are cheap to clone; all clones share one underlying computation.
pub struct Slot<V: Clone> {
    inner: SharedContents<V>,
}

impl<V: Clone> Clone for Slot<V> {
    fn clone(&self) -> Self {
        Slot {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone> fmt::Debug for Slot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}

impl<V> Slot<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Wraps `action` in a new, unevaluated slot.
    pub fn new<F>(action: F) -> Self
    where
        F: Future<Output = CacheContents<V>> + Send + 'static,
    {
        Slot {
            inner: action.boxed().shared(),
        }
    }

    /// Forces the slot, running the wrapped action if no holder has done so
    /// yet.
    ///
    /// The first force suspends for the duration of the action; once the slot
    /// is resolved, forcing returns instantly. All forcers observe the same
    /// captured result, and the caller rethrows a captured failure by
    /// propagating the returned `Err` with `?`.
    pub async fn force(&self) -> CacheContents<V> {
        self.inner.clone().await
    }

    /// Returns the captured result if the slot is resolved, without
    /// suspending or triggering any work.
    pub fn peek(&self) -> Option<CacheContents<V>> {
        self.inner.peek().cloned()
    }

    /// `true` once the wrapped action has run and its result is captured.
    pub fn is_resolved(&self) -> bool {
        self.inner.peek().is_some()
    }
}
