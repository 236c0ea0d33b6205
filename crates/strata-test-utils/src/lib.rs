//! Test utilities and fake collectives for strata development.
//!
//! [`ScriptedComm`] plays one rank of a larger group whose other ranks are
//! simulated by pre-supplied contributions, so multi-rank code paths can be
//! exercised on a single thread. [`fixtures`] holds deterministic data
//! generators and a serial reference histogram.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;

use strata_core::{Collective, CommError};

/// A collective call observed by [`ScriptedComm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectiveCall {
    Min,
    Max,
    Sum { root: usize, len: usize },
}

/// One rank of a simulated group.
///
/// Reductions combine the caller's contribution with the scripted peer
/// contributions. `reduce_sum` returns `Some` only when the scripted rank
/// is the root. Every call and abort is recorded for later assertions.
#[derive(Debug)]
pub struct ScriptedComm {
    rank: usize,
    size: usize,
    peer_mins: Vec<f64>,
    peer_maxes: Vec<f64>,
    peer_counts: Vec<Vec<u64>>,
    calls: RefCell<Vec<CollectiveCall>>,
    aborts: RefCell<Vec<(i32, String)>>,
}

impl ScriptedComm {
    /// Rank `rank` of a group of `size`, with no peer contributions.
    pub fn new(rank: usize, size: usize) -> Self {
        assert!(rank < size, "rank {rank} outside group of {size}");
        Self {
            rank,
            size,
            peer_mins: Vec::new(),
            peer_maxes: Vec::new(),
            peer_counts: Vec::new(),
            calls: RefCell::new(Vec::new()),
            aborts: RefCell::new(Vec::new()),
        }
    }

    /// Add a peer whose local range is `[min, max]`.
    pub fn with_peer_range(mut self, min: f64, max: f64) -> Self {
        self.peer_mins.push(min);
        self.peer_maxes.push(max);
        self
    }

    /// Add a peer that contributed nothing (empty-range sentinel).
    pub fn with_empty_peer(self) -> Self {
        self.with_peer_range(f64::INFINITY, f64::NEG_INFINITY)
    }

    /// Add a peer's bin counts to every `reduce_sum`.
    pub fn with_peer_counts(mut self, counts: Vec<u64>) -> Self {
        self.peer_counts.push(counts);
        self
    }

    /// Collective calls made so far, in order.
    pub fn calls(&self) -> Vec<CollectiveCall> {
        self.calls.borrow().clone()
    }

    /// Aborts raised so far, as `(code, reason)`.
    pub fn aborts(&self) -> Vec<(i32, String)> {
        self.aborts.borrow().clone()
    }

    fn check(&self) -> Result<(), CommError> {
        match self.aborts.borrow().first() {
            Some(&(code, _)) => Err(CommError::Aborted { code }),
            None => Ok(()),
        }
    }
}

impl Collective for ScriptedComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError> {
        self.check()?;
        self.calls.borrow_mut().push(CollectiveCall::Min);
        Ok(self.peer_mins.iter().copied().fold(local, f64::min))
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError> {
        self.check()?;
        self.calls.borrow_mut().push(CollectiveCall::Max);
        Ok(self.peer_maxes.iter().copied().fold(local, f64::max))
    }

    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError> {
        self.check()?;
        if root >= self.size {
            return Err(CommError::InvalidRoot {
                root,
                size: self.size,
            });
        }
        self.calls.borrow_mut().push(CollectiveCall::Sum {
            root,
            len: local.len(),
        });
        if self.rank != root {
            return Ok(None);
        }
        let mut sum = local.to_vec();
        for (peer, counts) in self.peer_counts.iter().enumerate() {
            if counts.len() != sum.len() {
                return Err(CommError::LengthMismatch {
                    rank: peer + 1,
                    expected: sum.len(),
                    found: counts.len(),
                });
            }
            for (acc, c) in sum.iter_mut().zip(counts) {
                *acc += c;
            }
        }
        Ok(Some(sum))
    }

    fn abort(&self, code: i32, reason: &str) {
        self.aborts.borrow_mut().push((code, reason.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peers_join_reductions() {
        let comm = ScriptedComm::new(0, 3)
            .with_peer_range(-1.0, 2.0)
            .with_empty_peer()
            .with_peer_counts(vec![1, 1])
            .with_peer_counts(vec![0, 5]);
        assert_eq!(comm.all_reduce_min(0.5).unwrap(), -1.0);
        assert_eq!(comm.all_reduce_max(0.5).unwrap(), 2.0);
        assert_eq!(comm.reduce_sum(&[2, 0], 0).unwrap(), Some(vec![3, 6]));
        assert_eq!(
            comm.calls(),
            vec![
                CollectiveCall::Min,
                CollectiveCall::Max,
                CollectiveCall::Sum { root: 0, len: 2 }
            ]
        );
    }

    #[test]
    fn non_root_gets_none() {
        let comm = ScriptedComm::new(2, 3);
        assert_eq!(comm.reduce_sum(&[1], 0).unwrap(), None);
        assert!(!comm.is_root());
    }

    #[test]
    fn abort_is_recorded_and_poisons() {
        let comm = ScriptedComm::new(0, 2);
        comm.abort(4, "bad");
        assert_eq!(comm.aborts(), vec![(4, "bad".to_string())]);
        assert_eq!(comm.all_reduce_min(0.0), Err(CommError::Aborted { code: 4 }));
    }
}
