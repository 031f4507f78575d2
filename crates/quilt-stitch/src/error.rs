//! Error types for stitching and the tiled pipeline.

use crate::detector::DetectError;
use quilt_core::{ConfigError, ObjectId, Region};
use quilt_cover::{CoverError, TileError};
use quilt_shape::ShapeError;
use smallvec::SmallVec;
use std::error::Error;
use std::fmt;

// ── StitchError ────────────────────────────────────────────────────

/// Errors raised while deciding which tile keeps which object.
#[derive(Clone, Debug, PartialEq)]
pub enum StitchError {
    /// The object has no representative point inside the array.
    Unresolved {
        /// Flat index of the tile that reported the object.
        tile: usize,
        /// Centre of the object in full-array coordinates.
        center: SmallVec<[f64; 3]>,
    },
    /// An owned object extends past its owner's read region.
    ///
    /// The context is too small for the objects in the image.
    NotFullyVisible {
        /// Flat index of the owning tile.
        tile: usize,
        /// Bounding region of the object.
        bounds: Region,
        /// Read region of the tile.
        read: Region,
    },
    /// A tile owns more objects than the id scheme allows.
    TooManyObjects {
        /// Flat index of the tile.
        tile: usize,
        /// Per-tile id budget.
        max: u32,
    },
    /// Two accepted objects carry the same id.
    DuplicateId {
        /// The repeated id.
        id: ObjectId,
    },
    /// A shape's dimensionality differs from the grid's.
    DimensionMismatch {
        /// Number of spatial axes of the grid.
        expected: usize,
        /// Dimensionality of the shape.
        got: usize,
    },
    /// A label patch does not have the tile's core extent.
    LabelShape {
        /// Flat index of the tile.
        tile: usize,
        /// Core extent.
        expected: Vec<usize>,
        /// Extent of the supplied patch.
        got: Vec<usize>,
    },
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { tile, center } => write!(
                f,
                "tile {tile}: object centred at {center:?} has no point inside the array"
            ),
            Self::NotFullyVisible { tile, bounds, read } => write!(
                f,
                "tile {tile}: object bounds {:?} exceed read region {:?}; increase context",
                bounds.ranges(),
                read.ranges()
            ),
            Self::TooManyObjects { tile, max } => {
                write!(f, "tile {tile} owns more than {max} objects")
            }
            Self::DuplicateId { id } => write!(f, "object id {id} accepted twice"),
            Self::DimensionMismatch { expected, got } => {
                write!(f, "{got}-dimensional shape on a {expected}-dimensional grid")
            }
            Self::LabelShape {
                tile,
                expected,
                got,
            } => write!(
                f,
                "tile {tile}: label patch has extent {got:?}, core is {expected:?}"
            ),
        }
    }
}

impl Error for StitchError {}

// ── TileStage ──────────────────────────────────────────────────────

/// Progress of a tile through the pipeline.
///
/// Stages are strictly linear; a tile never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileStage {
    /// Not started.
    Pending,
    /// Read region extracted.
    Read,
    /// Detector returned.
    Detected,
    /// Label patch cropped to the core.
    Cropped,
    /// Ownership applied and ids assigned.
    Filtered,
    /// Core written into the result.
    Written,
}

impl fmt::Display for TileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Read => "read",
            Self::Detected => "detected",
            Self::Cropped => "cropped",
            Self::Filtered => "filtered",
            Self::Written => "written",
        };
        f.write_str(name)
    }
}

// ── TileFailure ────────────────────────────────────────────────────

/// What went wrong inside one tile.
#[derive(Clone, Debug, PartialEq)]
pub enum TileFailure {
    /// An array did not fit the tile.
    Io(TileError),
    /// The detector failed.
    Detect(DetectError),
    /// A detection could not be turned into a shape.
    Shape(ShapeError),
    /// Ownership filtering failed.
    Stitch(StitchError),
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Detect(e) => write!(f, "{e}"),
            Self::Shape(e) => write!(f, "{e}"),
            Self::Stitch(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TileFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Detect(e) => Some(e),
            Self::Shape(e) => Some(e),
            Self::Stitch(e) => Some(e),
        }
    }
}

impl From<TileError> for TileFailure {
    fn from(e: TileError) -> Self {
        Self::Io(e)
    }
}

impl From<DetectError> for TileFailure {
    fn from(e: DetectError) -> Self {
        Self::Detect(e)
    }
}

impl From<ShapeError> for TileFailure {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}

impl From<StitchError> for TileFailure {
    fn from(e: StitchError) -> Self {
        Self::Stitch(e)
    }
}

// ── PipelineError ──────────────────────────────────────────────────

/// Errors from a tiled or whole-image run.
///
/// Any error aborts the run; no partial result is returned.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineError {
    /// Invalid axes, parameters or pipeline configuration.
    Config(ConfigError),
    /// The image could not be covered.
    Cover(CoverError),
    /// The detector's rays do not match the image's spatial axes.
    RayDimension {
        /// Dimensionality of the ray template.
        rays: usize,
        /// Number of spatial axes in the image.
        spatial: usize,
    },
    /// A tile failed.
    Tile {
        /// Flat index of the failing tile.
        tile: usize,
        /// Stage the tile was trying to reach.
        stage: TileStage,
        /// The underlying failure.
        source: TileFailure,
    },
    /// Merging accepted objects failed.
    Stitch(StitchError),
}

impl PipelineError {
    pub(crate) fn tile(tile: usize, stage: TileStage, source: impl Into<TileFailure>) -> Self {
        Self::Tile {
            tile,
            stage,
            source: source.into(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Cover(e) => write!(f, "covering failed: {e}"),
            Self::RayDimension { rays, spatial } => write!(
                f,
                "detector produces {rays}-dimensional shapes for an image with {spatial} spatial axes"
            ),
            Self::Tile {
                tile,
                stage,
                source,
            } => write!(f, "tile {tile} failed before stage '{stage}': {source}"),
            Self::Stitch(e) => write!(f, "stitching failed: {e}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Cover(e) => Some(e),
            Self::Tile { source, .. } => Some(source),
            Self::Stitch(e) => Some(e),
            Self::RayDimension { .. } => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CoverError> for PipelineError {
    fn from(e: CoverError) -> Self {
        Self::Cover(e)
    }
}

impl From<StitchError> for PipelineError {
    fn from(e: StitchError) -> Self {
        Self::Stitch(e)
    }
}
