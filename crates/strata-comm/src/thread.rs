//! In-process rank group: one thread per rank, crossbeam channels between them.
//!
//! Rank 0 is the gatherer for every collective. Non-root ranks send their
//! contribution to rank 0 and block on their own inbox for the reply; rank 0
//! collects one contribution per rank, combines them, and answers each rank.
//! Because a non-root rank always waits for its reply before entering the
//! next collective, rank 0 never holds more than one pending contribution
//! per peer.
//!
//! Abort sets a group-wide flag and pushes an abort packet into every inbox,
//! waking any rank blocked mid-collective.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use strata_core::{Collective, CommError};
use tracing::{debug, error};

/// Rank that gathers and combines every collective.
const GATHER_RANK: usize = 0;

const OP_MIN: &str = "all_reduce_min";
const OP_MAX: &str = "all_reduce_max";
const OP_SUM: &str = "reduce_sum";
const OP_SUM_OTHER_ROOT: &str = "reduce_sum with a different root";

#[derive(Debug)]
enum Contribution {
    Min(f64),
    Max(f64),
    Sum { root: usize, values: Vec<u64> },
}

impl Contribution {
    fn name(&self) -> &'static str {
        match self {
            Self::Min(_) => OP_MIN,
            Self::Max(_) => OP_MAX,
            Self::Sum { .. } => OP_SUM,
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Scalar(f64),
    Sum(Option<Vec<u64>>),
    Failed(CommError),
}

#[derive(Debug)]
enum Packet {
    Contribute {
        rank: usize,
        contribution: Contribution,
    },
    Reply(Reply),
    Abort {
        code: i32,
    },
    /// A peer's communicator was dropped.
    Departed {
        rank: usize,
    },
}

#[derive(Debug, Default)]
struct AbortState {
    aborted: AtomicBool,
    code: AtomicI32,
}

impl AbortState {
    fn check(&self) -> Result<(), CommError> {
        if self.aborted.load(Ordering::Acquire) {
            Err(CommError::Aborted {
                code: self.code.load(Ordering::Acquire),
            })
        } else {
            Ok(())
        }
    }
}

/// One rank's endpoint into a [`ThreadGroup`].
///
/// Move each endpoint onto its own thread. Dropping an endpoint tells the
/// rest of the group it has left; a collective that was waiting on it then
/// fails with [`CommError::Disconnected`].
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    inbox: Receiver<Packet>,
    peers: Arc<[Sender<Packet>]>,
    abort: Arc<AbortState>,
}

// Compile-time assertion: endpoints must be movable onto rank threads.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<ThreadComm>();
};

/// Factory for in-process rank groups.
///
/// # Examples
///
/// ```
/// use strata_comm::ThreadGroup;
/// use strata_core::Collective;
///
/// let sums = ThreadGroup::run(3, |comm| {
///     let local = vec![comm.rank() as u64, 1];
///     comm.reduce_sum(&local, 0).unwrap()
/// });
/// let sums: Vec<_> = sums.into_iter().map(|r| r.unwrap()).collect();
/// assert_eq!(sums[0], Some(vec![0 + 1 + 2, 3]));
/// assert_eq!(sums[1], None);
/// ```
pub struct ThreadGroup;

impl ThreadGroup {
    /// Create `size` connected endpoints, indexed by rank.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn split(size: usize) -> Vec<ThreadComm> {
        assert!(size > 0, "a rank group needs at least one rank");
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
        let peers: Arc<[Sender<Packet>]> = senders.into();
        let abort = Arc::new(AbortState::default());
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank,
                inbox,
                peers: Arc::clone(&peers),
                abort: Arc::clone(&abort),
            })
            .collect()
    }

    /// Run `f` once per rank, each on its own scoped thread, and collect the
    /// results in rank order. A rank that panics yields `Err` with the panic
    /// payload.
    pub fn run<T, F>(size: usize, f: F) -> Vec<thread::Result<T>>
    where
        F: Fn(ThreadComm) -> T + Sync,
        T: Send,
    {
        let comms = Self::split(size);
        let f = &f;
        thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| scope.spawn(move || f(comm)))
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        })
    }
}

impl ThreadComm {
    fn send(&self, to: usize, packet: Packet) -> Result<(), CommError> {
        self.peers[to]
            .send(packet)
            .map_err(|_| CommError::Disconnected { rank: self.rank })
    }

    fn recv(&self) -> Result<Packet, CommError> {
        self.inbox
            .recv()
            .map_err(|_| CommError::Disconnected { rank: self.rank })
    }

    fn collective(&self, contribution: Contribution) -> Result<Reply, CommError> {
        self.abort.check()?;
        if self.rank == GATHER_RANK {
            return self.gather(contribution);
        }
        self.send(
            GATHER_RANK,
            Packet::Contribute {
                rank: self.rank,
                contribution,
            },
        )?;
        loop {
            match self.recv()? {
                Packet::Reply(Reply::Failed(e)) => return Err(e),
                Packet::Reply(reply) => return Ok(reply),
                Packet::Abort { code } => return Err(CommError::Aborted { code }),
                Packet::Departed { rank } if rank == GATHER_RANK => {
                    return Err(CommError::Disconnected { rank: self.rank })
                }
                Packet::Departed { .. } | Packet::Contribute { .. } => {}
            }
        }
    }

    fn gather(&self, own: Contribution) -> Result<Reply, CommError> {
        let size = self.peers.len();
        let mut slots: Vec<Option<Contribution>> = (0..size).map(|_| None).collect();
        slots[GATHER_RANK] = Some(own);
        let mut pending = size - 1;

        while pending > 0 {
            match self.recv()? {
                Packet::Contribute { rank, contribution } => {
                    slots[rank] = Some(contribution);
                    pending -= 1;
                }
                Packet::Abort { code } => return Err(CommError::Aborted { code }),
                Packet::Departed { rank } if slots[rank].is_none() => {
                    let err = CommError::Disconnected { rank: self.rank };
                    self.fail_peers(&slots, &err);
                    return Err(err);
                }
                Packet::Departed { .. } | Packet::Reply(_) => {}
            }
        }

        let contributions: Vec<Contribution> = slots.into_iter().flatten().collect();
        match combine(&contributions) {
            Ok(mut replies) => {
                for (rank, reply) in replies.iter().enumerate().skip(1) {
                    self.send(rank, Packet::Reply(reply.clone()))?;
                }
                Ok(replies.swap_remove(GATHER_RANK))
            }
            Err(err) => {
                debug!(%err, "collective rejected");
                for rank in 1..size {
                    self.send(rank, Packet::Reply(Reply::Failed(err.clone())))?;
                }
                Err(err)
            }
        }
    }

    /// Release every rank that already contributed to a collective that cannot complete.
    fn fail_peers(&self, slots: &[Option<Contribution>], err: &CommError) {
        for (rank, slot) in slots.iter().enumerate().skip(1) {
            if slot.is_some() {
                let _ = self.send(rank, Packet::Reply(Reply::Failed(err.clone())));
            }
        }
    }
}

/// Combine one contribution per rank into one reply per rank.
fn combine(contributions: &[Contribution]) -> Result<Vec<Reply>, CommError> {
    let size = contributions.len();
    let first = &contributions[GATHER_RANK];
    let expected = first.name();
    for (rank, c) in contributions.iter().enumerate() {
        if c.name() != expected {
            return Err(CommError::Mismatch {
                rank,
                expected,
                found: c.name(),
            });
        }
    }

    match first {
        Contribution::Min(_) | Contribution::Max(_) => {
            let values = contributions.iter().map(|c| match c {
                Contribution::Min(v) | Contribution::Max(v) => *v,
                Contribution::Sum { .. } => f64::NAN,
            });
            let result = if matches!(first, Contribution::Min(_)) {
                values.fold(f64::INFINITY, f64::min)
            } else {
                values.fold(f64::NEG_INFINITY, f64::max)
            };
            Ok(vec![Reply::Scalar(result); size])
        }
        Contribution::Sum { root, values } => {
            let root = *root;
            let mut total = values.clone();
            for (rank, c) in contributions.iter().enumerate().skip(1) {
                let Contribution::Sum {
                    root: other_root,
                    values,
                } = c
                else {
                    continue;
                };
                if *other_root != root {
                    return Err(CommError::Mismatch {
                        rank,
                        expected: OP_SUM,
                        found: OP_SUM_OTHER_ROOT,
                    });
                }
                if values.len() != total.len() {
                    return Err(CommError::LengthMismatch {
                        rank,
                        expected: total.len(),
                        found: values.len(),
                    });
                }
                for (acc, v) in total.iter_mut().zip(values) {
                    *acc += v;
                }
            }
            let mut replies = vec![Reply::Sum(None); size];
            replies[root] = Reply::Sum(Some(total));
            Ok(replies)
        }
    }
}

impl Collective for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError> {
        match self.collective(Contribution::Min(local))? {
            Reply::Scalar(v) => Ok(v),
            _ => Err(CommError::Mismatch {
                rank: self.rank,
                expected: OP_MIN,
                found: OP_SUM,
            }),
        }
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError> {
        match self.collective(Contribution::Max(local))? {
            Reply::Scalar(v) => Ok(v),
            _ => Err(CommError::Mismatch {
                rank: self.rank,
                expected: OP_MAX,
                found: OP_SUM,
            }),
        }
    }

    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError> {
        let size = self.peers.len();
        if root >= size {
            return Err(CommError::InvalidRoot { root, size });
        }
        let contribution = Contribution::Sum {
            root,
            values: local.to_vec(),
        };
        match self.collective(contribution)? {
            Reply::Sum(sum) => Ok(sum),
            _ => Err(CommError::Mismatch {
                rank: self.rank,
                expected: OP_SUM,
                found: OP_MIN,
            }),
        }
    }

    fn abort(&self, code: i32, reason: &str) {
        error!(rank = self.rank, code, reason, "aborting rank group");
        self.abort.code.store(code, Ordering::Release);
        self.abort.aborted.store(true, Ordering::Release);
        for (rank, peer) in self.peers.iter().enumerate() {
            if rank != self.rank {
                let _ = peer.send(Packet::Abort { code });
            }
        }
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        if self.rank == GATHER_RANK {
            for peer in self.peers.iter().skip(1) {
                let _ = peer.send(Packet::Departed { rank: self.rank });
            }
        } else {
            let _ = self.peers[GATHER_RANK].send(Packet::Departed { rank: self.rank });
        }
    }
}
