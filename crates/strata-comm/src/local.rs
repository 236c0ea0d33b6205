//! Single-rank communicator.

use std::cell::Cell;

use strata_core::{Collective, CommError, ROOT_RANK};
use tracing::error;

/// A group of one: every reduction returns the caller's own contribution.
///
/// Useful for serial runs of code written against [`Collective`].
///
/// # Examples
///
/// ```
/// use strata_comm::SelfComm;
/// use strata_core::Collective;
///
/// let comm = SelfComm::new();
/// assert_eq!(comm.all_reduce_min(3.5).unwrap(), 3.5);
/// assert_eq!(comm.reduce_sum(&[1, 2], 0).unwrap(), Some(vec![1, 2]));
/// ```
#[derive(Debug, Default)]
pub struct SelfComm {
    aborted: Cell<Option<i32>>,
}

impl SelfComm {
    /// Create a fresh, un-aborted communicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort code, if [`abort`](Collective::abort) has been called.
    pub fn abort_code(&self) -> Option<i32> {
        self.aborted.get()
    }

    fn check(&self) -> Result<(), CommError> {
        match self.aborted.get() {
            Some(code) => Err(CommError::Aborted { code }),
            None => Ok(()),
        }
    }
}

impl Collective for SelfComm {
    fn rank(&self) -> usize {
        ROOT_RANK
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError> {
        self.check()?;
        Ok(local)
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError> {
        self.check()?;
        Ok(local)
    }

    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError> {
        self.check()?;
        if root != ROOT_RANK {
            return Err(CommError::InvalidRoot { root, size: 1 });
        }
        Ok(Some(local.to_vec()))
    }

    fn abort(&self, code: i32, reason: &str) {
        error!(code, reason, "aborting single-rank group");
        self.aborted.set(Some(code));
    }
}
