//! Fail-fast wrapper that turns a group abort into process termination.

use strata_core::{Collective, CommError};
use tracing::error;

/// Forwards every collective to `C`; on [`abort`](Collective::abort) it
/// aborts `C` and then exits the process with the abort code.
///
/// This is the deployment behavior for batch jobs where no rank may
/// continue after a fatal condition.
#[derive(Debug)]
pub struct ExitOnAbort<C> {
    inner: C,
}

impl<C: Collective> ExitOnAbort<C> {
    /// Wrap a communicator.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// The wrapped communicator.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the communicator.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Collective> Collective for ExitOnAbort<C> {
    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError> {
        self.inner.all_reduce_min(local)
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError> {
        self.inner.all_reduce_max(local)
    }

    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError> {
        self.inner.reduce_sum(local, root)
    }

    fn abort(&self, code: i32, reason: &str) {
        self.inner.abort(code, reason);
        error!(rank = self.inner.rank(), code, reason, "terminating process");
        std::process::exit(code);
    }
}
