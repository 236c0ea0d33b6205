//! Configuration for a per-step histogram analysis.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::report::ReportTarget;

/// Bin count used when the builder is not given one.
pub const DEFAULT_BINS: usize = 10;

/// Mesh entity a data array is attached to.
///
/// A label only: callers use it to pick the matching array and ghost mask
/// for each [`DataBlock`](crate::DataBlock). Binning never reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Association {
    /// One value per grid node.
    #[default]
    Point,
    /// One value per grid cell.
    Cell,
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Point => "point",
            Self::Cell => "cell",
        })
    }
}

/// Validated settings for a [`HistogramAnalysis`](crate::HistogramAnalysis).
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramConfig {
    /// Mesh the array is read from.
    pub mesh_name: String,
    /// Array to histogram.
    pub array_name: String,
    /// Whether the array holds point or cell data. Logged with each step;
    /// does not affect binning.
    pub association: Association,
    /// Number of bins. Must be at least 1.
    pub bins: usize,
    /// Where the root sends each step's report.
    pub output: ReportTarget,
}

impl HistogramConfig {
    /// Start building a configuration.
    pub fn builder() -> HistogramConfigBuilder {
        HistogramConfigBuilder {
            mesh_name: None,
            array_name: None,
            association: Association::Point,
            bins: DEFAULT_BINS,
            output: ReportTarget::Console,
        }
    }

    /// Check the structural invariants of a hand-assembled configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_name("mesh name", &self.mesh_name)?;
        check_name("array name", &self.array_name)?;
        if self.bins == 0 {
            return Err(ConfigError::InvalidBinCount);
        }
        if let ReportTarget::File(base) = &self.output {
            if base.as_os_str().is_empty() {
                return Err(ConfigError::EmptyOutputPath);
            }
        }
        Ok(())
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.contains(['/', '\\']) {
        return Err(ConfigError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Builder for [`HistogramConfig`].
#[derive(Clone, Debug)]
pub struct HistogramConfigBuilder {
    mesh_name: Option<String>,
    array_name: Option<String>,
    association: Association,
    bins: usize,
    output: ReportTarget,
}

impl HistogramConfigBuilder {
    /// Set the mesh name (required).
    pub fn mesh_name(mut self, name: impl Into<String>) -> Self {
        self.mesh_name = Some(name.into());
        self
    }

    /// Set the array name (required).
    pub fn array_name(mut self, name: impl Into<String>) -> Self {
        self.array_name = Some(name.into());
        self
    }

    /// Set the array association. Default: [`Association::Point`].
    pub fn association(mut self, association: Association) -> Self {
        self.association = association;
        self
    }

    /// Set the bin count. Default: [`DEFAULT_BINS`].
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Write one file per step under `base`.
    pub fn output_file(mut self, base: impl Into<PathBuf>) -> Self {
        self.output = ReportTarget::File(base.into());
        self
    }

    /// Set the report target. Default: [`ReportTarget::Console`].
    pub fn output(mut self, output: ReportTarget) -> Self {
        self.output = output;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<HistogramConfig, ConfigError> {
        let config = HistogramConfig {
            mesh_name: self
                .mesh_name
                .ok_or(ConfigError::MissingField { field: "mesh_name" })?,
            array_name: self
                .array_name
                .ok_or(ConfigError::MissingField { field: "array_name" })?,
            association: self.association,
            bins: self.bins,
            output: self.output,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_minimal() {
        let config = HistogramConfig::builder()
            .mesh_name("mesh")
            .array_name("pressure")
            .build()
            .unwrap();
        assert_eq!(config.bins, DEFAULT_BINS);
        assert_eq!(config.association, Association::Point);
        assert_eq!(config.output, ReportTarget::Console);
    }

    #[test]
    fn builder_full() {
        let config = HistogramConfig::builder()
            .mesh_name("mesh")
            .array_name("rho")
            .association(Association::Cell)
            .bins(32)
            .output_file("/tmp/out")
            .build()
            .unwrap();
        assert_eq!(config.bins, 32);
        assert_eq!(config.output, ReportTarget::File(PathBuf::from("/tmp/out")));
        assert_eq!(config.association.to_string(), "cell");
    }

    #[test]
    fn builder_rejects_missing_names() {
        let err = HistogramConfig::builder().array_name("a").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingField { field: "mesh_name" });
        let err = HistogramConfig::builder().mesh_name("m").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingField { field: "array_name" });
    }

    #[test]
    fn builder_rejects_zero_bins() {
        let err = HistogramConfig::builder()
            .mesh_name("m")
            .array_name("a")
            .bins(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBinCount);
    }

    #[test]
    fn builder_rejects_separator_in_name() {
        let err = HistogramConfig::builder()
            .mesh_name("a/b")
            .array_name("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { field: "mesh name", .. }));
    }

    #[test]
    fn builder_rejects_empty_output_path() {
        let err = HistogramConfig::builder()
            .mesh_name("m")
            .array_name("a")
            .output_file("")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyOutputPath);
    }
}
