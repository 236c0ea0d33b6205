//! The distributed histogram state machine.
//!
//! A histogram goes through a fixed sequence per analysis step:
//!
//! ```text
//! Idle ──add_range──► RangeAccumulating ──pre_compute──► RangeFrozen
//!   ▲                                                      │ compute
//!   │                                                      ▼
//!   └──────reset────── GloballyReduced ◄──post_compute── LocalComputed
//! ```
//!
//! [`pre_compute`](DistributedHistogram::pre_compute) and
//! [`post_compute`](DistributedHistogram::post_compute) are collectives:
//! every rank of the group must call them, in the same order, or the group
//! deadlocks.

use std::fmt;
use std::io;
use std::path::PathBuf;

use strata_core::{Collective, ScalarArray, ROOT_RANK};
use tracing::{debug, error, info};

use crate::error::HistogramError;
use crate::report::{HistogramReport, ReportTarget};

/// Abort code raised when the reduced range is empty or inverted.
pub const ABORT_DEGENERATE_RANGE: i32 = 1;

/// Abort code raised when the root cannot write the report.
pub const ABORT_OUTPUT_FAILED: i32 = 2;

/// Abort code raised when a rank's input is rejected inside a collective
/// analysis step.
pub const ABORT_INVALID_INPUT: i32 = 3;

/// Lifecycle phase of a [`DistributedHistogram`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fresh or reset; the local range is the empty sentinel.
    Idle,
    /// At least one array has contributed to the local range.
    RangeAccumulating,
    /// The global range and bin count are fixed.
    RangeFrozen,
    /// At least one array has been binned locally.
    LocalComputed,
    /// Counts have been summed onto the root.
    GloballyReduced,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::RangeAccumulating => "range-accumulating",
            Self::RangeFrozen => "range-frozen",
            Self::LocalComputed => "local-computed",
            Self::GloballyReduced => "globally-reduced",
        };
        f.write_str(name)
    }
}

/// Whether a [`HistogramSnapshot`] holds group-wide or rank-local counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    /// Counts summed over every rank.
    Global,
    /// The root's own counts; the reduction has not run yet.
    LocalOnly,
}

/// Range and counts read back from the root rank.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramSnapshot {
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Count per bin.
    pub counts: Vec<u64>,
    /// Whether `counts` covers the whole group.
    pub validity: Validity,
}

/// A fixed-bin histogram of one scalar array whose values are spread over
/// the ranks of a [`Collective`] group.
///
/// Values equal to the global maximum land in the last bin. NaN values and
/// values outside the frozen range are skipped and tallied in
/// [`rejected`](Self::rejected). Entries with a nonzero ghost mask byte are
/// skipped everywhere.
///
/// # Examples
///
/// ```
/// use strata_comm::SelfComm;
/// use strata_histogram::{DistributedHistogram, ReportTarget};
///
/// let comm = SelfComm::new();
/// let values: Vec<f64> = (0..10).map(f64::from).collect();
///
/// let mut hist = DistributedHistogram::new();
/// hist.add_range(&values, None).unwrap();
/// hist.add_range(&[10.0], None).unwrap();
/// hist.pre_compute(&comm, 5).unwrap();
/// hist.compute(&values, None).unwrap();
/// hist.post_compute(&comm, &ReportTarget::Silent, 0, 0.0, "mesh", "data").unwrap();
///
/// let snap = hist.histogram(&comm).unwrap().unwrap();
/// assert_eq!(snap.counts, vec![2, 2, 2, 2, 2]);
/// ```
#[derive(Clone, Debug)]
pub struct DistributedHistogram {
    phase: Phase,
    range: [f64; 2],
    bins: usize,
    // `bins + 1` slots while computing; the extra slot catches `v == max`.
    local: Vec<u64>,
    global: Option<Vec<u64>>,
    rejected: u64,
}

impl Default for DistributedHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributedHistogram {
    /// An idle histogram with an empty range.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            range: [f64::INFINITY, f64::NEG_INFINITY],
            bins: 0,
            local: Vec::new(),
            global: None,
            rejected: 0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current `(min, max)`: local while accumulating, global once frozen.
    /// `(+inf, -inf)` when nothing has contributed.
    pub fn range(&self) -> (f64, f64) {
        (self.range[0], self.range[1])
    }

    /// Frozen bin count, or 0 before [`pre_compute`](Self::pre_compute).
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// This rank's counts, one per bin.
    pub fn local_counts(&self) -> &[u64] {
        &self.local[..self.bins.min(self.local.len())]
    }

    /// Group-wide counts; `Some` only on the root after
    /// [`post_compute`](Self::post_compute).
    pub fn global_counts(&self) -> Option<&[u64]> {
        self.global.as_deref()
    }

    /// Values skipped by [`compute`](Self::compute) since the range was
    /// frozen because they were NaN or outside the range.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Return to [`Phase::Idle`], discarding range, bins and counts.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Widen this rank's range to cover the non-ghost, non-NaN entries of
    /// `values`. An empty array leaves the histogram untouched.
    pub fn add_range<A>(&mut self, values: &A, ghosts: Option<&[u8]>) -> Result<(), HistogramError>
    where
        A: ScalarArray + ?Sized,
    {
        self.expect_phase("add_range", &[Phase::Idle, Phase::RangeAccumulating])?;
        check_mask(values.len(), ghosts)?;
        if values.is_empty() {
            return Ok(());
        }
        for index in 0..values.len() {
            if is_ghost(ghosts, index) {
                continue;
            }
            let v = values.value(index);
            if v.is_nan() {
                continue;
            }
            self.range[0] = self.range[0].min(v);
            self.range[1] = self.range[1].max(v);
        }
        self.phase = Phase::RangeAccumulating;
        Ok(())
    }

    /// Reduce the range over the group and freeze it with `bins` bins.
    ///
    /// Collective. A rank that contributed nothing keeps the empty
    /// sentinel, which is the identity of both reductions.
    pub fn pre_compute<C>(&mut self, comm: &C, bins: usize) -> Result<(), HistogramError>
    where
        C: Collective + ?Sized,
    {
        self.expect_phase("pre_compute", &[Phase::Idle, Phase::RangeAccumulating])?;
        if bins == 0 {
            return Err(HistogramError::InvalidBinCount);
        }
        let min = comm.all_reduce_min(self.range[0])?;
        let max = comm.all_reduce_max(self.range[1])?;

        self.range = [min, max];
        self.bins = bins;
        self.local = vec![0; bins + 1];
        self.global = None;
        self.rejected = 0;
        self.phase = Phase::RangeFrozen;
        debug!(rank = comm.rank(), min, max, bins, "froze histogram range");
        Ok(())
    }

    /// Bin the non-ghost entries of `values` into this rank's counts.
    ///
    /// May be called once per local block. With a degenerate frozen range
    /// (`min >= max`) nothing is counted; the failure surfaces on the root
    /// in [`post_compute`](Self::post_compute).
    pub fn compute<A>(&mut self, values: &A, ghosts: Option<&[u8]>) -> Result<(), HistogramError>
    where
        A: ScalarArray + ?Sized,
    {
        self.expect_phase("compute", &[Phase::RangeFrozen, Phase::LocalComputed])?;
        check_mask(values.len(), ghosts)?;
        self.phase = Phase::LocalComputed;

        let [min, max] = self.range;
        if !(min < max) {
            debug!(min, max, "degenerate histogram range, nothing binned");
            return Ok(());
        }
        let width = (max - min) / self.bins as f64;
        let overflow = self.bins;
        let mut rejected = 0u64;
        for index in 0..values.len() {
            if is_ghost(ghosts, index) {
                continue;
            }
            let v = values.value(index);
            if !(min <= v && v <= max) {
                rejected += 1;
                continue;
            }
            let slot = (((v - min) / width).floor() as usize).min(overflow);
            self.local[slot] += 1;
        }
        let spilled = std::mem::take(&mut self.local[overflow]);
        self.local[overflow - 1] += spilled;

        if rejected > 0 {
            debug!(rejected, min, max, "skipped values outside the histogram range");
            self.rejected += rejected;
        }
        Ok(())
    }

    /// Sum counts onto the root and report them.
    ///
    /// Collective. A degenerate range fails on every rank with
    /// [`HistogramError::DegenerateRange`], and the root also aborts the
    /// group with [`ABORT_DEGENERATE_RANGE`]. An unwritable report aborts
    /// with [`ABORT_OUTPUT_FAILED`]. Errors are returned after aborting for
    /// backends whose abort does not terminate the process.
    pub fn post_compute<C>(
        &mut self,
        comm: &C,
        target: &ReportTarget,
        step: i64,
        time: f64,
        mesh: &str,
        array: &str,
    ) -> Result<(), HistogramError>
    where
        C: Collective + ?Sized,
    {
        self.expect_phase("post_compute", &[Phase::RangeFrozen, Phase::LocalComputed])?;
        let reduced = comm.reduce_sum(self.local_counts(), ROOT_RANK)?;

        // The frozen range is identical on every rank.
        let [min, max] = self.range;
        if !(min < max) {
            if reduced.is_some() {
                error!(min, max, mesh, array, step, "invalid histogram range");
                comm.abort(ABORT_DEGENERATE_RANGE, "invalid histogram range");
            }
            return Err(HistogramError::DegenerateRange { min, max });
        }
        let Some(counts) = reduced else {
            self.phase = Phase::GloballyReduced;
            return Ok(());
        };

        let report = HistogramReport {
            mesh: mesh.to_string(),
            array: array.to_string(),
            step,
            time,
            min,
            max,
            counts,
        };
        match target {
            ReportTarget::Console => {
                let stdout = io::stdout();
                report
                    .write_console_format(&mut stdout.lock())
                    .map_err(|source| HistogramError::Output {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?;
            }
            ReportTarget::File(base) => {
                let path = report.file_name(base);
                if let Err(source) = report.write_to_path(&path) {
                    error!(path = %path.display(), %source, "failed to write histogram");
                    comm.abort(ABORT_OUTPUT_FAILED, "failed to open histogram output file");
                    return Err(HistogramError::Output { path, source });
                }
                info!(path = %path.display(), step, "wrote histogram");
            }
            ReportTarget::Silent => {}
        }

        self.global = Some(report.counts);
        self.phase = Phase::GloballyReduced;
        Ok(())
    }

    /// Range and counts as seen from the root.
    ///
    /// Returns `Ok(None)` on every other rank. Before
    /// [`post_compute`](Self::post_compute) the root sees its own counts,
    /// flagged [`Validity::LocalOnly`].
    pub fn histogram<C>(&self, comm: &C) -> Result<Option<HistogramSnapshot>, HistogramError>
    where
        C: Collective + ?Sized,
    {
        if matches!(self.phase, Phase::Idle | Phase::RangeAccumulating) {
            return Err(HistogramError::NotComputed);
        }
        if !comm.is_root() {
            return Ok(None);
        }
        let (counts, validity) = match &self.global {
            Some(global) => (global.clone(), Validity::Global),
            None => (self.local_counts().to_vec(), Validity::LocalOnly),
        };
        Ok(Some(HistogramSnapshot {
            min: self.range[0],
            max: self.range[1],
            counts,
            validity,
        }))
    }

    fn expect_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), HistogramError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(HistogramError::OutOfOrder {
                operation,
                phase: self.phase,
            })
        }
    }
}

fn check_mask(values: usize, ghosts: Option<&[u8]>) -> Result<(), HistogramError> {
    match ghosts {
        Some(mask) if mask.len() != values => Err(HistogramError::MaskLengthMismatch {
            values,
            mask: mask.len(),
        }),
        _ => Ok(()),
    }
}

fn is_ghost(ghosts: Option<&[u8]>, index: usize) -> bool {
    ghosts.is_some_and(|mask| mask[index] != 0)
}

// Compile-time assertion: a histogram can move to a worker thread.
const _: fn() = || {
    fn assert_send<T: Send>() {}
    assert_send::<DistributedHistogram>();
};
