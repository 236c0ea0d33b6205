//! Decomposition of a uniform (image) grid into ghosted blocks.

use strata_core::{Axis, Extent};
use tracing::debug;

use crate::error::PartitionError;
use crate::rcb::ExtentPartitioner;

/// An axis-aligned grid with uniform spacing.
///
/// Node `(i, j, k)` sits at `origin + (i, j, k) * spacing`.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformGrid {
    origin: [f64; 3],
    spacing: [f64; 3],
    extent: Extent,
}

impl UniformGrid {
    /// Create a grid, rejecting empty extents and non-positive or
    /// non-finite spacing.
    pub fn new(origin: [f64; 3], spacing: [f64; 3], extent: Extent) -> Result<Self, PartitionError> {
        if extent.is_empty() {
            return Err(PartitionError::InvalidGrid {
                reason: format!("extent {extent} is empty"),
            });
        }
        if let Some(bad) = spacing.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(PartitionError::InvalidGrid {
                reason: format!("spacing must be finite and positive, got {bad}"),
            });
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(PartitionError::InvalidGrid {
                reason: format!("origin must be finite, got {origin:?}"),
            });
        }
        Ok(Self {
            origin,
            spacing,
            extent,
        })
    }

    /// Physical position of node `(i, j, k)`.
    pub fn point(&self, i: i32, j: i32, k: i32) -> [f64; 3] {
        node_position(&self.origin, &self.spacing, [i, j, k])
    }

    /// Grid origin.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Grid spacing.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Whole index extent.
    pub fn extent(&self) -> Extent {
        self.extent
    }
}

fn node_position(origin: &[f64; 3], spacing: &[f64; 3], ijk: [i32; 3]) -> [f64; 3] {
    [0, 1, 2].map(|a| origin[a] + f64::from(ijk[a]) * spacing[a])
}

/// One block of a partitioned [`UniformGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct GridBlock {
    id: usize,
    owned: Extent,
    extent: Extent,
    origin: [f64; 3],
    spacing: [f64; 3],
    ghost_mask: Vec<u8>,
}

impl GridBlock {
    /// Block index in partition order.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Extent the block owns, before ghost growth.
    pub fn owned(&self) -> Extent {
        self.owned
    }

    /// Ghosted extent, clamped to the grid.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Physical position of the block's first node.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Grid spacing.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Number of nodes in the ghosted extent.
    pub fn num_points(&self) -> usize {
        self.extent.num_nodes() as usize
    }

    /// Flat index of node `(i, j, k)` within the block (I fastest), or
    /// `None` if the node lies outside the ghosted extent.
    pub fn point_index(&self, i: i32, j: i32, k: i32) -> Option<usize> {
        if !self.extent.contains(i, j, k) {
            return None;
        }
        let ni = self.extent.nodes_along(Axis::I);
        let nj = self.extent.nodes_along(Axis::J);
        let di = i64::from(i - self.extent[0]);
        let dj = i64::from(j - self.extent[2]);
        let dk = i64::from(k - self.extent[4]);
        Some((di + ni * (dj + nj * dk)) as usize)
    }

    /// Physical position of node `(i, j, k)`.
    pub fn point(&self, i: i32, j: i32, k: i32) -> [f64; 3] {
        let first = [self.extent[0], self.extent[2], self.extent[4]];
        let local = [i - first[0], j - first[1], k - first[2]];
        node_position(&self.origin, &self.spacing, local)
    }

    /// One byte per node (I fastest): `1` for ghost nodes, `0` for nodes this
    /// block is responsible for.
    ///
    /// Ghost nodes are those outside [`owned`](Self::owned), plus nodes
    /// already owned by a lower-numbered block when boundaries are shared,
    /// so every grid node is unmasked on exactly one block.
    pub fn ghost_mask(&self) -> &[u8] {
        &self.ghost_mask
    }

    /// Number of unmasked nodes.
    pub fn owned_points(&self) -> usize {
        self.ghost_mask.iter().filter(|&&g| g == 0).count()
    }
}

/// Partitions a [`UniformGrid`] into [`GridBlock`]s using [`ExtentPartitioner`].
///
/// # Examples
///
/// ```
/// use strata_core::Extent;
/// use strata_partition::{GridPartitioner, UniformGrid};
///
/// let grid = UniformGrid::new([0.0; 3], [0.5; 3], Extent::new([0, 9, 0, 9, 0, 0])).unwrap();
/// let blocks = GridPartitioner::new(4).with_ghost_layers(1).partition(&grid).unwrap();
/// assert_eq!(blocks.len(), 4);
///
/// let owned: usize = blocks.iter().map(|b| b.owned_points()).sum();
/// assert_eq!(owned, 100);
/// ```
#[derive(Clone, Debug)]
pub struct GridPartitioner {
    partitions: usize,
    ghost_layers: u32,
    duplicate_nodes: bool,
}

impl GridPartitioner {
    /// Partition into `partitions` blocks, no ghosts, shared boundaries.
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions,
            ghost_layers: 0,
            duplicate_nodes: true,
        }
    }

    /// Ghost layers added around every block (clamped to the grid).
    pub fn with_ghost_layers(mut self, layers: u32) -> Self {
        self.ghost_layers = layers;
        self
    }

    /// Shared (`true`) or exclusive (`false`) block boundaries.
    pub fn with_duplicate_nodes(mut self, duplicate: bool) -> Self {
        self.duplicate_nodes = duplicate;
        self
    }

    /// Split the grid.
    ///
    /// Unlike [`ExtentPartitioner`], ghosted block extents are clamped to the
    /// grid extent, and a single-node grid asked for more than one block is
    /// rejected with [`PartitionError::TooManyPartitions`] instead of
    /// panicking.
    pub fn partition(&self, grid: &UniformGrid) -> Result<Vec<GridBlock>, PartitionError> {
        let nodes = grid.extent.num_nodes();
        if nodes == 1 && self.partitions > 1 {
            return Err(PartitionError::TooManyPartitions {
                requested: self.partitions,
                nodes,
            });
        }
        let mut rcb = ExtentPartitioner::new(grid.extent, self.partitions)
            .with_duplicate_nodes(self.duplicate_nodes);
        rcb.partition()?;

        let axes = grid.extent.description().active_axes();
        let layers = i32::try_from(self.ghost_layers).unwrap_or(i32::MAX);
        let owned = rcb.extents();

        let blocks: Vec<GridBlock> = owned
            .iter()
            .enumerate()
            .map(|(id, &own)| {
                let extent = own.grow(&axes, layers).clamp_to(&grid.extent);
                GridBlock {
                    id,
                    owned: own,
                    extent,
                    origin: grid.point(extent[0], extent[2], extent[4]),
                    spacing: grid.spacing,
                    ghost_mask: build_ghost_mask(&extent, &own, &owned[..id]),
                }
            })
            .collect();
        debug!(
            grid = %grid.extent,
            blocks = blocks.len(),
            ghost_layers = self.ghost_layers,
            "partitioned uniform grid"
        );
        Ok(blocks)
    }
}

fn build_ghost_mask(extent: &Extent, owned: &Extent, earlier: &[Extent]) -> Vec<u8> {
    let mut mask = vec![1u8; extent.num_nodes() as usize];
    let Some(own) = owned.intersect(extent) else {
        return mask;
    };
    fill_box(&mut mask, extent, &own, 0);
    // Only blocks whose owned extent touches ours can claim shared nodes.
    for shared in earlier.iter().filter_map(|e| e.intersect(&own)) {
        fill_box(&mut mask, extent, &shared, 1);
    }
    mask
}

/// Set every byte of `mask` (laid out over `extent`, I fastest) inside
/// `region` to `value`. `region` must lie within `extent`.
fn fill_box(mask: &mut [u8], extent: &Extent, region: &Extent, value: u8) {
    let ni = extent.nodes_along(Axis::I) as usize;
    let nj = extent.nodes_along(Axis::J) as usize;
    let row = region.nodes_along(Axis::I) as usize;
    let di = (region[0] - extent[0]) as usize;
    for k in region[4]..=region[5] {
        let dk = (k - extent[4]) as usize;
        for j in region[2]..=region[3] {
            let dj = (j - extent[2]) as usize;
            let start = di + ni * (dj + nj * dk);
            mask[start..start + row].fill(value);
        }
    }
}
