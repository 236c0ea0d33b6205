//! Per-step driver that runs the full histogram lifecycle over a rank's
//! local data blocks.

use strata_core::{Collective, ScalarArray};
use tracing::{debug, error};

use crate::config::HistogramConfig;
use crate::error::{ConfigError, HistogramError};
use crate::histogram::{DistributedHistogram, HistogramSnapshot, ABORT_INVALID_INPUT};

/// One local block of the analyzed array, with its optional ghost mask.
#[derive(Clone, Copy)]
pub struct DataBlock<'a> {
    values: &'a dyn ScalarArray,
    ghosts: Option<&'a [u8]>,
}

impl<'a> DataBlock<'a> {
    /// A block with no ghost entries.
    pub fn new(values: &'a dyn ScalarArray) -> Self {
        Self {
            values,
            ghosts: None,
        }
    }

    /// Mark entries with a nonzero mask byte as ghosts.
    pub fn with_ghosts(mut self, ghosts: &'a [u8]) -> Self {
        self.ghosts = Some(ghosts);
        self
    }

    /// The block's values.
    pub fn values(&self) -> &'a dyn ScalarArray {
        self.values
    }

    /// The block's ghost mask, if any.
    pub fn ghosts(&self) -> Option<&'a [u8]> {
        self.ghosts
    }
}

impl std::fmt::Debug for DataBlock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBlock")
            .field("len", &self.values.len())
            .field("ghosts", &self.ghosts.is_some())
            .finish()
    }
}

/// Histograms one configured array at every step it is executed.
///
/// Every rank of the group must call [`execute`](Self::execute) for the
/// same steps, passing its own blocks (possibly none).
///
/// # Examples
///
/// ```
/// use strata_comm::SelfComm;
/// use strata_histogram::{DataBlock, HistogramAnalysis, HistogramConfig, ReportTarget};
///
/// let config = HistogramConfig::builder()
///     .mesh_name("mesh")
///     .array_name("data")
///     .bins(2)
///     .output(ReportTarget::Silent)
///     .build()
///     .unwrap();
/// let mut analysis = HistogramAnalysis::new(config).unwrap();
///
/// let comm = SelfComm::new();
/// let values = vec![1.0f64, 2.0, 3.0, 4.0];
/// analysis.execute(&comm, &[DataBlock::new(&values)], 0, 0.0).unwrap();
/// let snap = analysis.histogram(&comm).unwrap().unwrap();
/// assert_eq!(snap.counts, vec![2, 2]);
/// ```
#[derive(Debug)]
pub struct HistogramAnalysis {
    config: HistogramConfig,
    histogram: DistributedHistogram,
    executions: u64,
}

impl HistogramAnalysis {
    /// Validate `config` and create an idle analysis.
    pub fn new(config: HistogramConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            histogram: DistributedHistogram::new(),
            executions: 0,
        })
    }

    /// The configuration this analysis runs with.
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Number of completed [`execute`](Self::execute) calls.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// The underlying histogram, in whatever phase the last step left it.
    pub fn histogram_state(&self) -> &DistributedHistogram {
        &self.histogram
    }

    /// Run one step: accumulate ranges, freeze them over the group, bin,
    /// reduce onto the root and report.
    ///
    /// Collective. Input errors on one rank (a ghost mask of the wrong
    /// length) abort the group with [`ABORT_INVALID_INPUT`] so the other
    /// ranks do not wait forever.
    pub fn execute<C>(
        &mut self,
        comm: &C,
        blocks: &[DataBlock<'_>],
        step: i64,
        time: f64,
    ) -> Result<(), HistogramError>
    where
        C: Collective + ?Sized,
    {
        self.histogram.reset();
        for block in blocks {
            let result = self.histogram.add_range(block.values, block.ghosts);
            abort_on_input_error(comm, result)?;
        }
        self.histogram.pre_compute(comm, self.config.bins)?;
        for block in blocks {
            let result = self.histogram.compute(block.values, block.ghosts);
            abort_on_input_error(comm, result)?;
        }
        self.histogram.post_compute(
            comm,
            &self.config.output,
            step,
            time,
            &self.config.mesh_name,
            &self.config.array_name,
        )?;
        self.executions += 1;
        debug!(
            rank = comm.rank(),
            step,
            blocks = blocks.len(),
            mesh = %self.config.mesh_name,
            array = %self.config.array_name,
            association = %self.config.association,
            "histogram step complete"
        );
        Ok(())
    }

    /// The latest result as seen from the root; `Ok(None)` elsewhere.
    pub fn histogram<C>(&self, comm: &C) -> Result<Option<HistogramSnapshot>, HistogramError>
    where
        C: Collective + ?Sized,
    {
        self.histogram.histogram(comm)
    }
}

fn abort_on_input_error<C>(comm: &C, result: Result<(), HistogramError>) -> Result<(), HistogramError>
where
    C: Collective + ?Sized,
{
    if let Err(e) = &result {
        error!(rank = comm.rank(), error = %e, "rejected histogram input");
        comm.abort(ABORT_INVALID_INPUT, "rejected histogram input");
    }
    result
}
