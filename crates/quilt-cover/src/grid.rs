//! N-dimensional block grids.
//!
//! A [`BlockGrid`] is the Cartesian product of one-dimensional coverings,
//! one per spatial axis. Non-spatial axes (channels, time) are carried at
//! full extent by every tile.
//!
//! # Canonical ordering
//!
//! Tiles are enumerated lexicographically over their multi-index with the
//! rightmost spatial axis varying fastest. A tile's flat index is its
//! position in that order.

use crate::axis_block::{cover_axis, AxisBlock};
use crate::error::{CoverError, TileError};
use log::debug;
use ndarray::{ArrayViewD, ArrayViewMutD, Axis as NdAxis, Slice};
use quilt_core::{Axes, Point, Region, TilingParams};
use smallvec::SmallVec;
use std::ops::Range;

// ── Tile ───────────────────────────────────────────────────────────

/// One tile of a [`BlockGrid`]: an [`AxisBlock`] per spatial axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    index: Point,
    flat_index: usize,
    axes: Axes,
    shape: SmallVec<[usize; 4]>,
    blocks: SmallVec<[AxisBlock; 4]>,
}

/// Which interval of a block an operation addresses, and which extent
/// the array must have along that axis.
#[derive(Clone, Copy)]
enum Part {
    /// Read interval of a full-size array.
    Read,
    /// Core of a full-size array.
    Write,
    /// Core of a read-sized array.
    Crop,
}

impl Part {
    fn range(self, b: &AxisBlock) -> Range<usize> {
        match self {
            Self::Read => b.read(),
            Self::Write => b.write(),
            Self::Crop => b.crop(),
        }
    }

    fn extent(self, b: &AxisBlock) -> usize {
        match self {
            Self::Read | Self::Write => b.axis_size(),
            Self::Crop => b.read_len(),
        }
    }
}

impl Tile {
    /// Multi-index over the spatial axes.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Position in canonical order.
    pub fn flat_index(&self) -> usize {
        self.flat_index
    }

    /// Per-spatial-axis blocks, in layout order.
    pub fn blocks(&self) -> &[AxisBlock] {
        &self.blocks
    }

    /// Layout of the covered array.
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// Read region over the spatial axes.
    pub fn read_region(&self) -> Region {
        Region::new(self.blocks.iter().map(AxisBlock::read))
    }

    /// Core over the spatial axes.
    pub fn write_region(&self) -> Region {
        Region::new(self.blocks.iter().map(AxisBlock::write))
    }

    /// Spatial position of the read region's lower corner.
    pub fn read_origin(&self) -> Point {
        self.blocks.iter().map(|b| b.read().start).collect()
    }

    /// Spatial extent of the read region.
    pub fn read_shape(&self) -> Point {
        self.blocks.iter().map(AxisBlock::read_len).collect()
    }

    /// Spatial extent of the core.
    pub fn write_shape(&self) -> Point {
        self.blocks.iter().map(AxisBlock::write_len).collect()
    }

    /// Whether a spatial point lies in this tile's core.
    pub fn write_contains(&self, point: &[usize]) -> bool {
        point.len() == self.blocks.len()
            && self
                .blocks
                .iter()
                .zip(point)
                .all(|(b, &p)| b.contains_write(p))
    }

    /// Read interval per axis of the covered array.
    pub fn read_slice(&self) -> Vec<Range<usize>> {
        self.full_slice(Part::Read)
    }

    /// Write interval per axis of the covered array.
    pub fn write_slice(&self) -> Vec<Range<usize>> {
        self.full_slice(Part::Write)
    }

    /// Core within the read-sized array, per axis of the covered array.
    pub fn crop_slice(&self) -> Vec<Range<usize>> {
        let mut out = self.full_slice(Part::Crop);
        // Non-spatial axes of a read-sized array keep their full extent.
        for (k, axis) in self.axes.iter().enumerate() {
            if !axis.is_spatial() {
                out[k] = 0..self.shape[k];
            }
        }
        out
    }

    fn full_slice(&self, part: Part) -> Vec<Range<usize>> {
        let mut blocks = self.blocks.iter();
        self.shape
            .iter()
            .zip(self.axes.iter())
            .map(|(&n, axis)| {
                if axis.is_spatial() {
                    blocks.next().map_or(0..n, |b| part.range(b))
                } else {
                    0..n
                }
            })
            .collect()
    }

    /// Block for a spatial axis of the covered array, by tag.
    fn block_for(&self, axis: quilt_core::Axis) -> Result<&AxisBlock, TileError> {
        self.axes
            .spatial()
            .position(axis)
            .and_then(|k| self.blocks.get(k))
            .ok_or(TileError::UncoveredAxis {
                axis: axis.as_char(),
            })
    }

    /// Per-axis ranges addressing `part` of an array with layout `axes`.
    fn ranges(
        &self,
        axes: &Axes,
        dims: &[usize],
        part: Part,
    ) -> Result<SmallVec<[(usize, Range<usize>); 4]>, TileError> {
        if dims.len() != axes.len() {
            return Err(TileError::DimensionMismatch {
                expected: axes.len(),
                got: dims.len(),
            });
        }
        let mut out = SmallVec::new();
        for (k, axis) in axes.iter().enumerate() {
            if !axis.is_spatial() {
                continue;
            }
            let b = self.block_for(axis)?;
            if dims[k] != part.extent(b) {
                return Err(TileError::ExtentMismatch {
                    axis: k,
                    expected: part.extent(b),
                    got: dims[k],
                });
            }
            out.push((k, part.range(b)));
        }
        Ok(out)
    }

    /// View of this tile's read region of a full-size array.
    pub fn read<'a, A>(&self, x: ArrayViewD<'a, A>) -> Result<ArrayViewD<'a, A>, TileError> {
        self.read_axes(x, &self.axes)
    }

    /// [`read`](Self::read) for an array with a different layout.
    ///
    /// Spatial axes are matched by tag; all other axes keep their extent.
    pub fn read_axes<'a, A>(
        &self,
        mut x: ArrayViewD<'a, A>,
        axes: &Axes,
    ) -> Result<ArrayViewD<'a, A>, TileError> {
        for (k, r) in self.ranges(axes, x.shape(), Part::Read)? {
            x.slice_axis_inplace(NdAxis(k), Slice::from(r));
        }
        Ok(x)
    }

    /// View of the core of a read-sized array.
    pub fn crop_context<'a, A>(
        &self,
        x: ArrayViewD<'a, A>,
    ) -> Result<ArrayViewD<'a, A>, TileError> {
        self.crop_context_axes(x, &self.axes)
    }

    /// [`crop_context`](Self::crop_context) for an array with a different layout.
    pub fn crop_context_axes<'a, A>(
        &self,
        mut x: ArrayViewD<'a, A>,
        axes: &Axes,
    ) -> Result<ArrayViewD<'a, A>, TileError> {
        for (k, r) in self.ranges(axes, x.shape(), Part::Crop)? {
            x.slice_axis_inplace(NdAxis(k), Slice::from(r));
        }
        Ok(x)
    }

    /// Assign a core-sized array into this tile's core of `result`.
    pub fn write<A: Clone>(
        &self,
        result: ArrayViewMutD<'_, A>,
        x: ArrayViewD<'_, A>,
    ) -> Result<(), TileError> {
        self.write_axes(result, x, &self.axes)
    }

    /// [`write`](Self::write) for arrays with a different layout.
    pub fn write_axes<A: Clone>(
        &self,
        mut result: ArrayViewMutD<'_, A>,
        x: ArrayViewD<'_, A>,
        axes: &Axes,
    ) -> Result<(), TileError> {
        for (k, r) in self.ranges(axes, result.shape(), Part::Write)? {
            result.slice_axis_inplace(NdAxis(k), Slice::from(r));
        }
        if x.ndim() != result.ndim() {
            return Err(TileError::DimensionMismatch {
                expected: result.ndim(),
                got: x.ndim(),
            });
        }
        if let Some(k) = (0..x.ndim()).find(|&k| x.shape()[k] != result.shape()[k]) {
            return Err(TileError::ExtentMismatch {
                axis: k,
                expected: result.shape()[k],
                got: x.shape()[k],
            });
        }
        result.assign(&x);
        Ok(())
    }
}

// ── BlockGrid ──────────────────────────────────────────────────────

/// Cartesian product of per-axis coverings of an N-dimensional array.
#[derive(Clone, Debug)]
pub struct BlockGrid {
    axes: Axes,
    shape: SmallVec<[usize; 4]>,
    per_axis: Vec<Vec<AxisBlock>>,
    strides: SmallVec<[usize; 4]>,
    tiles: Vec<Tile>,
}

impl BlockGrid {
    /// Cover an array of `shape` laid out as `axes`.
    ///
    /// Scalar parameters apply to every spatial axis; per-axis parameters
    /// list the spatial axes in layout order.
    ///
    /// # Examples
    ///
    /// ```
    /// use quilt_core::{Axes, TilingParams};
    /// use quilt_cover::BlockGrid;
    ///
    /// let axes = Axes::parse("YXC").unwrap();
    /// let grid = BlockGrid::cover(&[300, 200, 3], &axes, &TilingParams::new(128, 16, 8)).unwrap();
    /// assert_eq!(grid.grid_shape().iter().product::<usize>(), grid.len());
    /// assert_eq!(grid.tiles()[0].read_slice()[2], 0..3);
    /// ```
    pub fn cover(shape: &[usize], axes: &Axes, params: &TilingParams) -> Result<Self, CoverError> {
        axes.check_shape(shape)?;
        let tilings = params.resolve(axes.n_spatial())?;
        let spatial = axes.spatial_shape(shape);
        let per_axis = spatial
            .iter()
            .zip(&tilings)
            .enumerate()
            .map(|(k, (&n, t))| cover_axis(n, t).map_err(|e| e.on_axis(k)))
            .collect::<Result<Vec<_>, _>>()?;

        // strides[k] = product(len of axes after k); rightmost is fastest.
        let n = per_axis.len();
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, n);
        for k in (0..n.saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * per_axis[k + 1].len();
        }
        let total: usize = per_axis.iter().map(Vec::len).product();

        let mut tiles = Vec::with_capacity(total);
        let mut index: Point = SmallVec::from_elem(0, n);
        loop {
            tiles.push(Tile {
                index: index.clone(),
                flat_index: tiles.len(),
                axes: axes.clone(),
                shape: SmallVec::from_slice(shape),
                blocks: index
                    .iter()
                    .enumerate()
                    .map(|(k, &i)| per_axis[k][i].clone())
                    .collect(),
            });

            // Advance odometer (rightmost = fastest).
            let mut carry = true;
            for k in (0..n).rev() {
                if carry {
                    index[k] += 1;
                    if index[k] < per_axis[k].len() {
                        carry = false;
                    } else {
                        index[k] = 0;
                    }
                }
            }
            if carry {
                break;
            }
        }

        debug!(
            "covered {:?} ({axes}) with {} tiles, grid {:?}",
            shape,
            tiles.len(),
            per_axis.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(Self {
            axes: axes.clone(),
            shape: SmallVec::from_slice(shape),
            per_axis,
            strides,
            tiles,
        })
    }

    /// All tiles in canonical order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always `false` for a successfully built grid.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Layout of the covered array.
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// Full shape of the covered array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Extents of the spatial axes.
    pub fn spatial_shape(&self) -> Point {
        self.axes.spatial_shape(&self.shape)
    }

    /// Number of blocks along each spatial axis.
    pub fn grid_shape(&self) -> Point {
        self.per_axis.iter().map(Vec::len).collect()
    }

    /// The one-dimensional covering of spatial axis `k`.
    pub fn axis_blocks(&self, k: usize) -> &[AxisBlock] {
        &self.per_axis[k]
    }

    /// Tile by flat index.
    pub fn tile(&self, flat: usize) -> Option<&Tile> {
        self.tiles.get(flat)
    }

    /// Tile by multi-index.
    pub fn tile_at(&self, index: &[usize]) -> Option<&Tile> {
        if index.len() != self.per_axis.len()
            || index.iter().zip(&self.per_axis).any(|(&i, b)| i >= b.len())
        {
            return None;
        }
        let flat: usize = index.iter().zip(&self.strides).map(|(i, s)| i * s).sum();
        self.tiles.get(flat)
    }

    /// The tile whose core contains a spatial point.
    pub fn locate(&self, point: &[usize]) -> Option<&Tile> {
        if point.len() != self.per_axis.len() {
            return None;
        }
        let index: Point = point
            .iter()
            .zip(&self.per_axis)
            .map(|(&p, blocks)| blocks.partition_point(|b| b.write().end <= p))
            .collect();
        self.tile_at(&index)
    }
}
