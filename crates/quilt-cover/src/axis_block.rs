//! One-dimensional covering of an axis by overlapping, padded blocks.
//!
//! The axis `[0, axis_size)` is split into disjoint *cores* (write
//! regions) whose interior boundaries are multiples of `grid`. Each core
//! is padded by a *margin* on both sides and clipped to the axis to form
//! its *read* region. The margin is the context rounded up to `grid`,
//! widened when that alone cannot give adjacent reads `min_overlap`
//! common elements; the widening is the *object band*.
//!
//! # Construction
//!
//! 1. If the axis fits in one block, the covering is a single block with
//!    no padding.
//! 2. The margin is reserved on both sides of the block, giving the
//!    widest admissible core `block_size - 2 * margin`.
//! 3. The axis is measured in grid units (`ceil(axis_size / grid)`) and
//!    the units are dealt out as evenly as possible over the smallest
//!    number of cores that respects the core limit. Only the last core
//!    may be shorter than a whole number of units.
//! 4. The candidate is checked with [`check_chain`]; on failure the core
//!    count is increased until no split with more cores could pass.
//!
//! Reads of non-adjacent blocks may share context. What never happens is
//! an object band reaching past its neighbour's core: every interior
//! core is at least twice the band wide.

use crate::error::CoverError;
use log::{debug, trace, warn};
use quilt_core::{AxisTiling, ConfigError};
use std::ops::Range;

/// One block of a one-dimensional covering.
///
/// `read ⊇ write`, and both lie inside `[0, axis_size)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AxisBlock {
    axis_size: usize,
    read: Range<usize>,
    write: Range<usize>,
}

impl AxisBlock {
    /// Cover `[0, axis_size)` with blocks.
    ///
    /// Shorthand for [`cover_axis`] with freshly validated parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use quilt_cover::AxisBlock;
    ///
    /// let blocks = AxisBlock::cover(100, 40, 8, 4, 1).unwrap();
    /// assert_eq!(blocks.first().unwrap().write().start, 0);
    /// assert_eq!(blocks.last().unwrap().write().end, 100);
    /// ```
    pub fn cover(
        axis_size: usize,
        block_size: usize,
        min_overlap: usize,
        context: usize,
        grid: usize,
    ) -> Result<Vec<AxisBlock>, CoverError> {
        let tiling = AxisTiling::new(block_size, min_overlap, context, grid)?;
        cover_axis(axis_size, &tiling)
    }

    /// A block spanning the whole axis with no context.
    pub fn whole(axis_size: usize) -> Self {
        Self {
            axis_size,
            read: 0..axis_size,
            write: 0..axis_size,
        }
    }

    /// Extent of the covered axis.
    pub fn axis_size(&self) -> usize {
        self.axis_size
    }

    /// Read interval `[read_lo, read_hi)`.
    pub fn read(&self) -> Range<usize> {
        self.read.clone()
    }

    /// Write (core) interval `[write_lo, write_hi)`.
    pub fn write(&self) -> Range<usize> {
        self.write.clone()
    }

    /// Length of the read interval.
    pub fn read_len(&self) -> usize {
        self.read.end - self.read.start
    }

    /// Length of the core.
    pub fn write_len(&self) -> usize {
        self.write.end - self.write.start
    }

    /// Padding actually present before the core.
    pub fn context_pre(&self) -> usize {
        self.write.start - self.read.start
    }

    /// Padding actually present after the core.
    pub fn context_post(&self) -> usize {
        self.read.end - self.write.end
    }

    /// The core, relative to the start of the read interval.
    pub fn crop(&self) -> Range<usize> {
        let pre = self.context_pre();
        pre..pre + self.write_len()
    }

    /// Length of the intersection of two read intervals.
    pub fn overlap(&self, other: &AxisBlock) -> usize {
        let lo = self.read.start.max(other.read.start);
        let hi = self.read.end.min(other.read.end);
        hi.saturating_sub(lo)
    }

    /// Whether `pos` lies in the core.
    pub fn contains_write(&self, pos: usize) -> bool {
        self.write.contains(&pos)
    }
}

/// Cover `[0, axis_size)` according to validated per-axis parameters.
///
/// Interior cores are padded by [`AxisTiling::margin`], which is at
/// least the context rounded up to a multiple of `grid` and may exceed
/// the requested context: it grows to `ceil(min_overlap / 2)` (again
/// grid-rounded) when the context alone would leave adjacent reads
/// overlapping by less than `min_overlap`. Padding is clipped at the
/// ends of the axis.
///
/// Returns `Err(CoverError::Infeasible)` when no grid-aligned partition
/// meets every constraint. Never returns a chain that fails
/// [`check_chain`].
pub fn cover_axis(axis_size: usize, tiling: &AxisTiling) -> Result<Vec<AxisBlock>, CoverError> {
    tiling.validate()?;
    if axis_size == 0 {
        return Err(ConfigError::EmptyAxis { axis: 0 }.into());
    }
    if axis_size <= tiling.block_size {
        trace!(
            "axis of size {axis_size} fits in one block of {}",
            tiling.block_size
        );
        return Ok(vec![AxisBlock::whole(axis_size)]);
    }

    let grid = tiling.grid;
    let context = tiling.effective_context();
    if context != tiling.context {
        warn!(
            "context {} is not a multiple of grid {grid}, using {context}",
            tiling.context
        );
    }
    let margin = tiling.margin();
    let band = tiling.object_band();
    if band > 0 {
        debug!(
            "min_overlap {} widens the margin from {context} to {margin}",
            tiling.min_overlap
        );
    }
    let core_limit = tiling.core_limit();
    if core_limit < grid {
        return Err(CoverError::infeasible(
            axis_size,
            format!("core width limit {core_limit} is below grid {grid}"),
        ));
    }

    let units = axis_size.div_ceil(grid);
    let max_units = core_limit / grid;
    let first = units.div_ceil(max_units).max(2);
    for n in first..=units {
        let bounds = even_bounds(axis_size, grid, units, n);
        let blocks = blocks_from_bounds(axis_size, &bounds, margin);
        match check_chain(&blocks, tiling) {
            Ok(()) => {
                debug!(
                    "covered axis of size {axis_size} with {n} blocks \
                     (block {}, margin {margin}, grid {grid})",
                    tiling.block_size
                );
                return Ok(blocks);
            }
            Err(e) => trace!("{n} blocks rejected: {e}"),
        }
        // Cores only shrink from here on.
        let base = (units / n) * grid;
        if base + margin < tiling.min_overlap || (n > 2 && base < 2 * band) {
            break;
        }
    }
    Err(CoverError::infeasible(
        axis_size,
        format!(
            "no grid-aligned partition keeps cores within {core_limit}, \
             interior cores at least {} wide and overlaps at least {}",
            2 * band,
            tiling.min_overlap
        ),
    ))
}

/// Core boundaries for `n` cores dealing `units` grid units evenly.
///
/// Larger cores come first; the final boundary is clipped to the axis.
fn even_bounds(axis_size: usize, grid: usize, units: usize, n: usize) -> Vec<usize> {
    let base = units / n;
    let extra = units % n;
    let mut bounds = Vec::with_capacity(n + 1);
    bounds.push(0);
    let mut acc = 0;
    for i in 0..n {
        acc += base + usize::from(i < extra);
        bounds.push((acc * grid).min(axis_size));
    }
    bounds
}

fn blocks_from_bounds(axis_size: usize, bounds: &[usize], margin: usize) -> Vec<AxisBlock> {
    bounds
        .windows(2)
        .map(|w| AxisBlock {
            axis_size,
            read: w[0].saturating_sub(margin)..(w[1] + margin).min(axis_size),
            write: w[0]..w[1],
        })
        .collect()
}

/// Verify every covering invariant of a chain of blocks.
///
/// - the cores are non-empty, ordered, contiguous and cover the axis;
/// - every read interval contains its core, padded by at most the
///   margin and clipped to the axis;
/// - a single block spans the whole axis; otherwise every interior
///   boundary is a multiple of `grid`, every read interval fits in
///   `block_size`, adjacent reads overlap by at least `min_overlap`, and
///   the object bands of non-adjacent cores never meet.
pub fn check_chain(blocks: &[AxisBlock], tiling: &AxisTiling) -> Result<(), CoverError> {
    let fail = |reason: String| Err(CoverError::InvalidChain { reason });
    let Some(first) = blocks.first() else {
        return fail("empty chain".to_string());
    };
    let axis_size = first.axis_size;
    let margin = tiling.margin();
    let band = tiling.object_band();

    let mut expected_start = 0;
    for (i, b) in blocks.iter().enumerate() {
        if b.axis_size != axis_size {
            return fail(format!("block {i} covers an axis of size {}", b.axis_size));
        }
        if b.write.start != expected_start {
            return fail(format!(
                "block {i} core starts at {}, expected {expected_start}",
                b.write.start
            ));
        }
        if b.write.start >= b.write.end {
            return fail(format!("block {i} has an empty core"));
        }
        if b.read.start > b.write.start || b.read.end < b.write.end || b.read.end > axis_size {
            return fail(format!(
                "block {i} read {:?} does not contain core {:?} inside the axis",
                b.read, b.write
            ));
        }
        if b.context_pre() > margin || b.context_post() > margin {
            return fail(format!(
                "block {i} padding ({}, {}) exceeds margin {margin}",
                b.context_pre(),
                b.context_post()
            ));
        }
        expected_start = b.write.end;
    }
    if expected_start != axis_size {
        return fail(format!("cores end at {expected_start}, not {axis_size}"));
    }

    if blocks.len() == 1 {
        return Ok(());
    }
    for (i, b) in blocks.iter().enumerate() {
        if b.read_len() > tiling.block_size {
            return fail(format!(
                "block {i} reads {} > block_size {}",
                b.read_len(),
                tiling.block_size
            ));
        }
        if i > 0 && b.write.start % tiling.grid != 0 {
            return fail(format!(
                "boundary {} is not a multiple of grid {}",
                b.write.start, tiling.grid
            ));
        }
    }
    for (i, pair) in blocks.windows(2).enumerate() {
        let overlap = pair[0].overlap(&pair[1]);
        if overlap < tiling.min_overlap {
            return fail(format!(
                "blocks {i} and {} overlap by {overlap} < {}",
                i + 1,
                tiling.min_overlap
            ));
        }
    }
    for (i, triple) in blocks.windows(3).enumerate() {
        if triple[0].write.end + 2 * band > triple[2].write.start {
            return fail(format!(
                "object bands of non-adjacent blocks {i} and {} meet across a core of {}",
                i + 2,
                triple[1].write_len()
            ));
        }
    }
    Ok(())
}
