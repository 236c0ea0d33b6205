//! Core abstraction traits for scalar array access and collective operations.

use crate::error::CommError;

/// Rank that receives reductions and owns authoritative results.
pub const ROOT_RANK: usize = 0;

/// Read-only, per-element access to a sequence of numeric values.
///
/// Every element is read as `f64`; implementations exist for the primitive
/// numeric slices, vectors and arrays so callers never dispatch on element
/// type themselves.
pub trait ScalarArray {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Element `index` as `f64`. `index` must be below [`len`](Self::len).
    fn value(&self, index: usize) -> f64;

    /// True when the array holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_scalar_array {
    ($($t:ty),* $(,)?) => {
        $(
            impl ScalarArray for [$t] {
                fn len(&self) -> usize {
                    <[$t]>::len(self)
                }

                fn value(&self, index: usize) -> f64 {
                    self[index] as f64
                }
            }

            impl ScalarArray for Vec<$t> {
                fn len(&self) -> usize {
                    Vec::len(self)
                }

                fn value(&self, index: usize) -> f64 {
                    self[index] as f64
                }
            }

            impl<const N: usize> ScalarArray for [$t; N] {
                fn len(&self) -> usize {
                    N
                }

                fn value(&self, index: usize) -> f64 {
                    self[index] as f64
                }
            }
        )*
    };
}

impl_scalar_array!(f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl<A: ScalarArray + ?Sized> ScalarArray for &A {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn value(&self, index: usize) -> f64 {
        (**self).value(index)
    }
}

/// Collective operations over a group of cooperating ranks.
///
/// Every collective blocks until all ranks of the group have entered the
/// matching call. Callers must invoke collectives on every rank, the same
/// number of times and in the same order; skipping one on a subset of ranks
/// deadlocks the group.
pub trait Collective {
    /// Rank of the calling process within the group.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Minimum of `local` over all ranks, returned on every rank.
    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError>;

    /// Maximum of `local` over all ranks, returned on every rank.
    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError>;

    /// Element-wise sum of every rank's `local` vector, delivered to `root`.
    ///
    /// Returns `Some(sum)` on `root` and `None` elsewhere.
    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError>;

    /// Abort the whole group.
    ///
    /// After this call every pending or later collective on every rank fails
    /// with [`CommError::Aborted`]. Implementations backed by real processes
    /// may terminate instead of returning.
    fn abort(&self, code: i32, reason: &str);

    /// True on [`ROOT_RANK`].
    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }
}

impl<C: Collective + ?Sized> Collective for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn all_reduce_min(&self, local: f64) -> Result<f64, CommError> {
        (**self).all_reduce_min(local)
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64, CommError> {
        (**self).all_reduce_max(local)
    }

    fn reduce_sum(&self, local: &[u64], root: usize) -> Result<Option<Vec<u64>>, CommError> {
        (**self).reduce_sum(local, root)
    }

    fn abort(&self, code: i32, reason: &str) {
        (**self).abort(code, reason)
    }
}
