//! Configuration errors.
//!
//! Every variant is raised before any tiling work starts. Downstream
//! crates wrap [`ConfigError`] in their own error enums via `From`.

use std::error::Error;
use std::fmt;

/// Errors detected while validating axes or tiling parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An axes string could not be parsed.
    InvalidAxes {
        /// The offending axes string.
        axes: String,
        /// What went wrong.
        reason: String,
    },
    /// A per-axis parameter sequence has the wrong length.
    LengthMismatch {
        /// Parameter name (`block_size`, `context`, ...).
        name: &'static str,
        /// Number of spatial axes.
        expected: usize,
        /// Length of the supplied sequence.
        got: usize,
    },
    /// The array's dimensionality does not match its axes.
    ShapeMismatch {
        /// Number of axes.
        expected: usize,
        /// Number of array dimensions.
        got: usize,
    },
    /// An axis has zero extent.
    EmptyAxis {
        /// Index of the empty axis.
        axis: usize,
    },
    /// `block_size` is zero.
    ZeroBlockSize,
    /// `grid` is zero.
    ZeroGrid,
    /// `block_size <= 2 * context`: a block would have no core.
    BlockTooSmall {
        /// The configured block size.
        block_size: usize,
        /// The configured context.
        context: usize,
    },
    /// `max_objects_per_tile` is zero.
    ZeroObjectsPerTile,
    /// The largest object id does not fit into `u32`.
    IdSpaceOverflow {
        /// Number of tiles in the grid.
        tiles: usize,
        /// Configured per-tile id budget.
        max_per_tile: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAxes { axes, reason } => {
                write!(f, "invalid axes '{axes}': {reason}")
            }
            Self::LengthMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "{name} has {got} entries but there are {expected} spatial axes"
            ),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "array has {got} dimensions but {expected} axes")
            }
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has zero extent"),
            Self::ZeroBlockSize => write!(f, "block_size must be at least 1"),
            Self::ZeroGrid => write!(f, "grid must be at least 1"),
            Self::BlockTooSmall {
                block_size,
                context,
            } => write!(
                f,
                "block_size {block_size} must exceed twice the context {context}"
            ),
            Self::ZeroObjectsPerTile => write!(f, "max_objects_per_tile must be at least 1"),
            Self::IdSpaceOverflow {
                tiles,
                max_per_tile,
            } => write!(
                f,
                "{tiles} tiles x {max_per_tile} objects per tile overflows u32 ids"
            ),
        }
    }
}

impl Error for ConfigError {}
