//! Error types for collective communication.

use std::error::Error;
use std::fmt;

/// Errors from a [`Collective`](crate::Collective) operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// The group was aborted by some rank; no further collectives succeed.
    Aborted {
        /// Abort code passed to [`Collective::abort`](crate::Collective::abort).
        code: i32,
    },
    /// Ranks entered different collective operations at the same point.
    Mismatch {
        /// Rank whose operation did not match the root's.
        rank: usize,
        /// Operation the root entered.
        expected: &'static str,
        /// Operation the offending rank entered.
        found: &'static str,
    },
    /// Vector contributions to a reduction have different lengths.
    LengthMismatch {
        /// Rank whose contribution had the wrong length.
        rank: usize,
        /// Length of the root's contribution.
        expected: usize,
        /// Length of the offending contribution.
        found: usize,
    },
    /// A reduction root outside the group.
    InvalidRoot {
        /// Requested root rank.
        root: usize,
        /// Number of ranks in the group.
        size: usize,
    },
    /// A peer went away (its communicator was dropped mid-collective).
    Disconnected {
        /// Rank that observed the disconnect.
        rank: usize,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted { code } => write!(f, "collective group aborted with code {code}"),
            Self::Mismatch {
                rank,
                expected,
                found,
            } => write!(
                f,
                "rank {rank} entered {found} while the root entered {expected}"
            ),
            Self::LengthMismatch {
                rank,
                expected,
                found,
            } => write!(
                f,
                "rank {rank} contributed {found} values, expected {expected}"
            ),
            Self::InvalidRoot { root, size } => {
                write!(f, "root rank {root} outside group of {size}")
            }
            Self::Disconnected { rank } => write!(f, "rank {rank} lost its peers"),
        }
    }
}

impl Error for CommError {}
