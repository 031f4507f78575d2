//! Tiling parameters and the scalar-or-per-axis broadcast rule.
//!
//! Callers describe tiling with [`TilingParams`], whose fields accept
//! either one value for every spatial axis or one value per spatial axis.
//! [`TilingParams::resolve`] applies the broadcast once and validates the
//! result, so covering code only ever sees per-axis [`AxisTiling`] values.

use crate::error::ConfigError;
use smallvec::SmallVec;

// ── AxisParam ──────────────────────────────────────────────────────

/// A tiling parameter given once for all spatial axes or once per axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxisParam {
    /// The same value on every spatial axis.
    Scalar(usize),
    /// One value per spatial axis, in layout order.
    PerAxis(SmallVec<[usize; 4]>),
}

impl AxisParam {
    /// Expand to exactly `n` values.
    ///
    /// Returns `Err(ConfigError::LengthMismatch)` if a per-axis sequence
    /// does not have length `n`.
    pub fn broadcast(
        &self,
        name: &'static str,
        n: usize,
    ) -> Result<SmallVec<[usize; 4]>, ConfigError> {
        match self {
            Self::Scalar(v) => Ok(SmallVec::from_elem(*v, n)),
            Self::PerAxis(vs) if vs.len() == n => Ok(vs.clone()),
            Self::PerAxis(vs) => Err(ConfigError::LengthMismatch {
                name,
                expected: n,
                got: vs.len(),
            }),
        }
    }
}

impl From<usize> for AxisParam {
    fn from(v: usize) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<usize>> for AxisParam {
    fn from(v: Vec<usize>) -> Self {
        Self::PerAxis(v.into_iter().collect())
    }
}

impl From<&[usize]> for AxisParam {
    fn from(v: &[usize]) -> Self {
        Self::PerAxis(SmallVec::from_slice(v))
    }
}

impl<const N: usize> From<[usize; N]> for AxisParam {
    fn from(v: [usize; N]) -> Self {
        Self::PerAxis(v.into_iter().collect())
    }
}

// ── AxisTiling ─────────────────────────────────────────────────────

/// Fully resolved tiling parameters for one spatial axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisTiling {
    /// Maximum read-region length.
    pub block_size: usize,
    /// Minimum overlap between the read regions of adjacent tiles.
    ///
    /// Set it above the largest object extent so that an object crossing
    /// a core boundary fits inside one read region.
    pub min_overlap: usize,
    /// Requested padding on each side of a core.
    pub context: usize,
    /// Alignment unit for interior tile boundaries.
    pub grid: usize,
}

impl AxisTiling {
    /// Build and validate per-axis parameters.
    pub fn new(
        block_size: usize,
        min_overlap: usize,
        context: usize,
        grid: usize,
    ) -> Result<Self, ConfigError> {
        let t = Self {
            block_size,
            min_overlap,
            context,
            grid,
        };
        t.validate()?;
        Ok(t)
    }

    /// Check `block_size >= 1`, `grid >= 1` and `block_size > 2 * context`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.grid == 0 {
            return Err(ConfigError::ZeroGrid);
        }
        if self.block_size <= self.context.saturating_mul(2) {
            return Err(ConfigError::BlockTooSmall {
                block_size: self.block_size,
                context: self.context,
            });
        }
        Ok(())
    }

    /// Context rounded up to a multiple of `grid`.
    pub fn effective_context(&self) -> usize {
        self.context.div_ceil(self.grid.max(1)) * self.grid.max(1)
    }

    /// Padding on each side of an interior core.
    ///
    /// The effective context, widened when needed so that two adjacent
    /// reads overlap by at least `min_overlap`: the larger of the
    /// effective context and `ceil(min_overlap / 2)` rounded up to `grid`.
    pub fn margin(&self) -> usize {
        let g = self.grid.max(1);
        let half = self.min_overlap.div_ceil(2).div_ceil(g) * g;
        self.effective_context().max(half)
    }

    /// Part of the margin that is not context.
    ///
    /// Objects straddling a core boundary may reach this far into the
    /// neighbouring core; the bands of non-adjacent tiles never meet.
    pub fn object_band(&self) -> usize {
        self.margin() - self.effective_context()
    }

    /// Widest core a block can hold once the margin is reserved on both
    /// sides. Zero if the margin consumes the block.
    pub fn core_limit(&self) -> usize {
        self.block_size
            .saturating_sub(self.margin().saturating_mul(2))
    }
}

// ── TilingParams ───────────────────────────────────────────────────

/// User-facing tiling parameters for an N-dimensional array.
///
/// # Examples
///
/// ```
/// use quilt_core::TilingParams;
///
/// let params = TilingParams::new(256, 32, 16).with_grid([1usize, 4, 4]);
/// let per_axis = params.resolve(3).unwrap();
/// assert_eq!(per_axis[1].grid, 4);
/// assert_eq!(per_axis[0].block_size, 256);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilingParams {
    /// Maximum read-region length per spatial axis.
    pub block_size: AxisParam,
    /// Minimum read overlap between adjacent tiles per spatial axis.
    pub min_overlap: AxisParam,
    /// Context padding per spatial axis.
    pub context: AxisParam,
    /// Boundary alignment per spatial axis. Default: 1.
    pub grid: AxisParam,
}

impl TilingParams {
    /// The same parameters on every spatial axis, with `grid = 1`.
    pub fn new(block_size: usize, min_overlap: usize, context: usize) -> Self {
        Self {
            block_size: AxisParam::Scalar(block_size),
            min_overlap: AxisParam::Scalar(min_overlap),
            context: AxisParam::Scalar(context),
            grid: AxisParam::Scalar(1),
        }
    }

    /// Replace the block size.
    pub fn with_block_size(mut self, block_size: impl Into<AxisParam>) -> Self {
        self.block_size = block_size.into();
        self
    }

    /// Replace the minimum overlap.
    pub fn with_min_overlap(mut self, min_overlap: impl Into<AxisParam>) -> Self {
        self.min_overlap = min_overlap.into();
        self
    }

    /// Replace the context.
    pub fn with_context(mut self, context: impl Into<AxisParam>) -> Self {
        self.context = context.into();
        self
    }

    /// Replace the grid alignment.
    pub fn with_grid(mut self, grid: impl Into<AxisParam>) -> Self {
        self.grid = grid.into();
        self
    }

    /// Broadcast to `n_spatial` axes and validate each.
    pub fn resolve(&self, n_spatial: usize) -> Result<Vec<AxisTiling>, ConfigError> {
        let block_size = self.block_size.broadcast("block_size", n_spatial)?;
        let min_overlap = self.min_overlap.broadcast("min_overlap", n_spatial)?;
        let context = self.context.broadcast("context", n_spatial)?;
        let grid = self.grid.broadcast("grid", n_spatial)?;
        (0..n_spatial)
            .map(|k| AxisTiling::new(block_size[k], min_overlap[k], context[k], grid[k]))
            .collect()
    }
}
