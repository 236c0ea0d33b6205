//! Rendering of reduced histograms to files or the console.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::format::{format_e, format_g};

/// Where the root rank sends a reduced histogram.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportTarget {
    /// Human-readable listing on standard output.
    #[default]
    Console,
    /// One text file per step, named from this base path (see
    /// [`HistogramReport::file_name`]).
    File(PathBuf),
    /// Keep the result in memory only.
    Silent,
}

/// A globally reduced histogram together with the labels it is reported
/// under.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramReport {
    /// Mesh the array belongs to.
    pub mesh: String,
    /// Array name.
    pub array: String,
    /// Simulation step.
    pub step: i64,
    /// Simulation time.
    pub time: f64,
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Count per bin.
    pub counts: Vec<u64>,
}

impl HistogramReport {
    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Width of every bin.
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins() as f64
    }

    /// The `bins + 1` bin edges, `min + i * width`.
    pub fn edges(&self) -> Vec<f64> {
        let width = self.bin_width();
        (0..=self.bins())
            .map(|i| self.min + i as f64 * width)
            .collect()
    }

    /// Output file for this report: `<base>_<mesh>_<array>_<step>.txt`.
    ///
    /// ```
    /// use std::path::Path;
    /// use strata_histogram::HistogramReport;
    ///
    /// let report = HistogramReport {
    ///     mesh: "mesh".into(),
    ///     array: "data".into(),
    ///     step: 7,
    ///     time: 0.0,
    ///     min: 0.0,
    ///     max: 1.0,
    ///     counts: vec![1],
    /// };
    /// assert_eq!(report.file_name(Path::new("out/h")), Path::new("out/h_mesh_data_7.txt"));
    /// ```
    pub fn file_name(&self, base: &Path) -> PathBuf {
        let mut name = OsString::from(base.as_os_str());
        name.push(format!("_{}_{}_{}.txt", self.mesh, self.array, self.step));
        PathBuf::from(name)
    }

    /// Write the file layout:
    ///
    /// ```text
    /// step : <step>
    /// time : <time %g>
    /// num bins : <bins>
    /// range : <min %g> <max %g>
    /// bin edges : <e0> <e1> ... <eN>
    /// counts : <c0> ... <cN-1>
    /// ```
    ///
    /// Edge and count lines keep a space after every value.
    pub fn write_file_format<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "step : {}", self.step)?;
        writeln!(out, "time : {}", format_g(self.time, 6))?;
        writeln!(out, "num bins : {}", self.bins())?;
        writeln!(
            out,
            "range : {} {}",
            format_g(self.min, 6),
            format_g(self.max, 6)
        )?;
        write!(out, "bin edges : ")?;
        for edge in self.edges() {
            write!(out, "{} ", format_g(edge, 6))?;
        }
        writeln!(out)?;
        write!(out, "counts : ")?;
        for count in &self.counts {
            write!(out, "{count} ")?;
        }
        writeln!(out)
    }

    /// Write the console layout: a header line, then one
    /// `<lower> - <upper>: <count>` line per bin in scientific notation.
    pub fn write_console_format<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Histogram mesh \"{}\" data array \"{}\" step {} time {}",
            self.mesh,
            self.array,
            self.step,
            format_g(self.time, 6)
        )?;
        let edges = self.edges();
        for (count, pair) in self.counts.iter().zip(edges.windows(2)) {
            writeln!(
                out,
                "{} - {}: {count}",
                format_e(pair[0], 6),
                format_e(pair[1], 6)
            )?;
        }
        Ok(())
    }

    /// Create (or truncate) `path` and write the file layout into it.
    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_file_format(&mut out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HistogramReport {
        HistogramReport {
            mesh: "mesh".into(),
            array: "data".into(),
            step: 3,
            time: 0.25,
            min: 0.0,
            max: 10.0,
            counts: vec![2, 2, 2, 2, 2],
        }
    }

    #[test]
    fn edges_span_range() {
        assert_eq!(sample().edges(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(sample().bin_width(), 2.0);
    }

    #[test]
    fn file_format_is_exact() {
        let mut buf = Vec::new();
        sample().write_file_format(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "step : 3\n\
             time : 0.25\n\
             num bins : 5\n\
             range : 0 10\n\
             bin edges : 0 2 4 6 8 10 \n\
             counts : 2 2 2 2 2 \n"
        );
    }

    #[test]
    fn console_format_lists_bins() {
        let mut report = sample();
        report.counts = vec![4, 6];
        let mut buf = Vec::new();
        report.write_console_format(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Histogram mesh \"mesh\" data array \"data\" step 3 time 0.25",
                "0.000000e+00 - 5.000000e+00: 4",
                "5.000000e+00 - 1.000000e+01: 6",
            ]
        );
    }

    #[test]
    fn file_name_appends_labels() {
        let report = sample();
        assert_eq!(
            report.file_name(Path::new("/tmp/hist")),
            PathBuf::from("/tmp/hist_mesh_data_3.txt")
        );
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = std::env::temp_dir().join("strata-report-missing-dir-does-not-exist");
        let path = dir.join("h.txt");
        assert!(sample().write_to_path(&path).is_err());
    }
}
