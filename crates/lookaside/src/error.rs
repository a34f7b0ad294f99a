use std::io;
use std::time::Duration;

use thiserror::Error;

/// An error that happens when resolving a fact from a remote location.
///
/// This error enum is intended for caching: a failed lookup is captured once
/// and then rethrown to every caller that unwraps the cached result. The
/// variants describe what the remote side reported; the cache itself never
/// inspects them, it only stores and rethrows. The exception is
/// [`InternalError`](Self::InternalError), which denotes a problem in the
/// cache machinery rather than in the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The path or user was not found on the remote side.
    #[error("not found")]
    NotFound,
    /// The remote side refused the lookup due to missing permissions.
    ///
    /// The attached string contains the remote side's response.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The lookup did not complete in time.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    /// The lookup could not be performed due to another problem, like
    /// connection loss or a failing remote shell.
    ///
    /// The attached string contains the remote side's response.
    #[error("lookup failed: {0}")]
    LookupError(String),
    /// An unexpected error in the cache machinery itself.
    ///
    /// This variant is not produced by lookup actions. It stands in for
    /// worker pool teardown and panicked background tasks.
    #[error("internal error")]
    InternalError,
}

impl From<io::Error> for CacheError {
    #[track_caller]
    fn from(err: io::Error) -> Self {
        Self::from_std_error(err)
    }
}

impl CacheError {
    /// Captures an arbitrary error as an [`InternalError`](Self::InternalError),
    /// logging its details.
    #[track_caller]
    pub fn from_std_error<E: std::error::Error + 'static>(e: E) -> Self {
        let dynerr: &dyn std::error::Error = &e; // tracing expects a `&dyn Error`
        tracing::error!(error = dynerr);
        Self::InternalError
    }
}

/// The result of a cached lookup, containing either `Ok(V)` or the error the
/// lookup action was captured with.
pub type CacheContents<T = ()> = Result<T, CacheError>;
