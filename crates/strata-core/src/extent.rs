//! Inclusive integer index extents and their data descriptions.

use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::ops::Index;

/// One of the three structured index axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The fastest-varying axis (x).
    I,
    /// The middle axis (y).
    J,
    /// The slowest-varying axis (z).
    K,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::I, Axis::J, Axis::K];

    /// Zero-based position of the axis (`I = 0`, `J = 1`, `K = 2`).
    pub fn index(self) -> usize {
        match self {
            Self::I => 0,
            Self::J => 1,
            Self::K => 2,
        }
    }

    /// Slots of the axis' `(min, max)` pair in the 6-value extent layout.
    fn slots(self) -> (usize, usize) {
        let i = self.index();
        (2 * i, 2 * i + 1)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I => write!(f, "i"),
            Self::J => write!(f, "j"),
            Self::K => write!(f, "k"),
        }
    }
}

/// Shape class of an extent, derived from which axes span more than one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataDescription {
    /// At least one axis has `min > max`.
    Empty,
    /// Every axis has `min == max`.
    SinglePoint,
    /// Only the I axis is active.
    XLine,
    /// Only the J axis is active.
    YLine,
    /// Only the K axis is active.
    ZLine,
    /// The I and J axes are active.
    XYPlane,
    /// The J and K axes are active.
    YZPlane,
    /// The I and K axes are active.
    XZPlane,
    /// All three axes are active.
    XYZGrid,
}

impl DataDescription {
    /// Classify an extent.
    pub fn of(extent: &Extent) -> Self {
        if Axis::ALL.iter().any(|&a| extent.cells_along(a) < 0) {
            return Self::Empty;
        }
        let active = Axis::ALL.map(|a| extent.cells_along(a) > 0);
        match active {
            [false, false, false] => Self::SinglePoint,
            [true, false, false] => Self::XLine,
            [false, true, false] => Self::YLine,
            [false, false, true] => Self::ZLine,
            [true, true, false] => Self::XYPlane,
            [false, true, true] => Self::YZPlane,
            [true, false, true] => Self::XZPlane,
            [true, true, true] => Self::XYZGrid,
        }
    }

    /// Axes along which an extent of this description spans more than one node.
    pub fn active_axes(self) -> SmallVec<[Axis; 3]> {
        match self {
            Self::Empty | Self::SinglePoint => SmallVec::new(),
            Self::XLine => smallvec![Axis::I],
            Self::YLine => smallvec![Axis::J],
            Self::ZLine => smallvec![Axis::K],
            Self::XYPlane => smallvec![Axis::I, Axis::J],
            Self::YZPlane => smallvec![Axis::J, Axis::K],
            Self::XZPlane => smallvec![Axis::I, Axis::K],
            Self::XYZGrid => smallvec![Axis::I, Axis::J, Axis::K],
        }
    }

    /// Topological dimension: 0 for empty and single-point, else the active axis count.
    pub fn dimension(self) -> usize {
        self.active_axes().len()
    }
}

/// An inclusive axis-aligned box of structured grid indices.
///
/// Stored as `[i_min, i_max, j_min, j_max, k_min, k_max]`.
///
/// # Examples
///
/// ```
/// use strata_core::{Axis, DataDescription, Extent};
///
/// let ext = Extent::new([0, 9, 0, 4, 0, 0]);
/// assert_eq!(ext.description(), DataDescription::XYPlane);
/// assert_eq!(ext.num_nodes(), 50);
/// assert_eq!(ext.num_cells(), 36);
/// assert_eq!(ext.longest_axis(), Axis::I);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent([i32; 6]);

impl Extent {
    /// Build from the 6-value layout.
    pub const fn new(bounds: [i32; 6]) -> Self {
        Self(bounds)
    }

    /// Build from per-axis `(min, max)` pairs.
    pub const fn from_bounds(i: (i32, i32), j: (i32, i32), k: (i32, i32)) -> Self {
        Self([i.0, i.1, j.0, j.1, k.0, k.1])
    }

    /// The 6-value layout.
    pub const fn as_array(&self) -> [i32; 6] {
        self.0
    }

    /// `(min, max)` along an axis.
    pub fn range(&self, axis: Axis) -> (i32, i32) {
        let (lo, hi) = axis.slots();
        (self.0[lo], self.0[hi])
    }

    /// Replace the `(min, max)` pair along an axis.
    pub fn set_range(&mut self, axis: Axis, min: i32, max: i32) {
        let (lo, hi) = axis.slots();
        self.0[lo] = min;
        self.0[hi] = max;
    }

    /// Node count along an axis: `(max - min) + 1`. Negative for inverted ranges.
    pub fn nodes_along(&self, axis: Axis) -> i64 {
        self.cells_along(axis) + 1
    }

    /// Cell count along an axis: `max - min`.
    pub fn cells_along(&self, axis: Axis) -> i64 {
        let (min, max) = self.range(axis);
        i64::from(max) - i64::from(min)
    }

    /// Classify this extent.
    pub fn description(&self) -> DataDescription {
        DataDescription::of(self)
    }

    /// True when some axis has `min > max`.
    pub fn is_empty(&self) -> bool {
        self.description() == DataDescription::Empty
    }

    /// Total nodes: the product of node counts along the active axes.
    ///
    /// Saturates at `u64::MAX` for extents spanning most of the `i32` range.
    pub fn num_nodes(&self) -> u64 {
        match self.description() {
            DataDescription::Empty => 0,
            desc => saturating_product(desc.active_axes().iter().map(|&a| self.nodes_along(a))),
        }
    }

    /// Total cells: the product of cell counts along the active axes.
    ///
    /// A single point counts as one vertex cell. Saturates like
    /// [`num_nodes`](Self::num_nodes).
    pub fn num_cells(&self) -> u64 {
        match self.description() {
            DataDescription::Empty => 0,
            DataDescription::SinglePoint => 1,
            desc => saturating_product(desc.active_axes().iter().map(|&a| self.cells_along(a))),
        }
    }

    /// Axis with the most nodes.
    ///
    /// Ties go to the first of I, J, K whose node count is at least both others.
    pub fn longest_axis(&self) -> Axis {
        let ni = self.nodes_along(Axis::I);
        let nj = self.nodes_along(Axis::J);
        let nk = self.nodes_along(Axis::K);
        if ni >= nj && ni >= nk {
            Axis::I
        } else if nj >= ni && nj >= nk {
            Axis::J
        } else {
            Axis::K
        }
    }

    /// Node count along [`longest_axis`](Self::longest_axis).
    pub fn longest_axis_length(&self) -> i64 {
        self.nodes_along(self.longest_axis())
    }

    /// Move `min` down and `max` up by `layers` along each listed axis.
    ///
    /// The result is not clamped to any enclosing extent.
    pub fn grow(&self, axes: &[Axis], layers: i32) -> Extent {
        let mut out = *self;
        for &axis in axes {
            let (min, max) = self.range(axis);
            out.set_range(
                axis,
                min.saturating_sub(layers),
                max.saturating_add(layers),
            );
        }
        out
    }

    /// Restrict every axis to the corresponding range of `bounds`.
    pub fn clamp_to(&self, bounds: &Extent) -> Extent {
        let mut out = *self;
        for axis in Axis::ALL {
            let (min, max) = self.range(axis);
            let (bmin, bmax) = bounds.range(axis);
            out.set_range(axis, min.max(bmin), max.min(bmax));
        }
        out
    }

    /// Overlap with another extent, or `None` if they are disjoint.
    pub fn intersect(&self, other: &Extent) -> Option<Extent> {
        let out = self.clamp_to(other);
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// True when the index triple lies inside this extent.
    pub fn contains(&self, i: i32, j: i32, k: i32) -> bool {
        [(Axis::I, i), (Axis::J, j), (Axis::K, k)]
            .iter()
            .all(|&(axis, v)| {
                let (min, max) = self.range(axis);
                min <= v && v <= max
            })
    }
}

// Per-axis counts are non-negative and below 2^33 here.
fn saturating_product(counts: impl Iterator<Item = i64>) -> u64 {
    counts.fold(1u64, |acc, n| acc.saturating_mul(n as u64))
}

impl From<[i32; 6]> for Extent {
    fn from(bounds: [i32; 6]) -> Self {
        Self(bounds)
    }
}

impl Index<usize> for Extent {
    type Output = i32;

    fn index(&self, idx: usize) -> &i32 {
        &self.0[idx]
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "[{a}, {b}, {c}, {d}, {e}, {g}]")
    }
}
