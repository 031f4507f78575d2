//! Error types for covering and tile I/O.

use quilt_core::ConfigError;
use std::error::Error;
use std::fmt;

/// Errors arising while computing a covering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverError {
    /// The tiling parameters are invalid.
    Config(ConfigError),
    /// No admissible grid-aligned partition exists for an axis.
    Infeasible {
        /// Spatial axis index (0 for single-axis covers).
        axis: usize,
        /// Extent of the axis.
        axis_size: usize,
        /// Which constraint could not be met.
        reason: String,
    },
    /// A chain of blocks violates a covering invariant.
    InvalidChain {
        /// The violated invariant.
        reason: String,
    },
}

impl CoverError {
    pub(crate) fn infeasible(axis_size: usize, reason: impl Into<String>) -> Self {
        Self::Infeasible {
            axis: 0,
            axis_size,
            reason: reason.into(),
        }
    }

    pub(crate) fn on_axis(self, k: usize) -> Self {
        match self {
            Self::Infeasible {
                axis_size, reason, ..
            } => Self::Infeasible {
                axis: k,
                axis_size,
                reason,
            },
            other => other,
        }
    }
}

impl fmt::Display for CoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid tiling configuration: {e}"),
            Self::Infeasible {
                axis,
                axis_size,
                reason,
            } => write!(
                f,
                "cannot cover axis {axis} of size {axis_size}: {reason}"
            ),
            Self::InvalidChain { reason } => write!(f, "invalid block chain: {reason}"),
        }
    }
}

impl Error for CoverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CoverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors arising when an array does not fit a tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileError {
    /// The array's dimensionality differs from its axes.
    DimensionMismatch {
        /// Number of axes.
        expected: usize,
        /// Number of array dimensions.
        got: usize,
    },
    /// An axis has the wrong extent for the requested operation.
    ExtentMismatch {
        /// Array axis index.
        axis: usize,
        /// Required extent.
        expected: usize,
        /// Actual extent.
        got: usize,
    },
    /// A spatial axis of the array is not covered by the grid.
    UncoveredAxis {
        /// The axis tag.
        axis: char,
    },
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "array has {got} dimensions but {expected} axes")
            }
            Self::ExtentMismatch {
                axis,
                expected,
                got,
            } => write!(f, "axis {axis} has extent {got}, expected {expected}"),
            Self::UncoveredAxis { axis } => {
                write!(f, "spatial axis '{axis}' is not covered by the grid")
            }
        }
    }
}

impl Error for TileError {}
