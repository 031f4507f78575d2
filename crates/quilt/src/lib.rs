//! Quilt: tiled prediction and stitching of N-dimensional instance label
//! images.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Quilt sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use ndarray::{ArrayD, ArrayViewD};
//! use quilt::prelude::*;
//!
//! // A toy detector: one small disk on every bright pixel.
//! struct Bright {
//!     rays: Arc<RayTemplate>,
//! }
//!
//! impl Detector for Bright {
//!     fn rays(&self) -> &Arc<RayTemplate> {
//!         &self.rays
//!     }
//!
//!     fn predict(
//!         &self,
//!         patch: ArrayViewD<'_, f32>,
//!         axes: &Axes,
//!     ) -> Result<Prediction, DetectError> {
//!         let detections = patch
//!             .indexed_iter()
//!             .filter(|(_, &v)| v > 0.5)
//!             .map(|(ix, &v)| Detection::new(&[ix[0] as f64, ix[1] as f64], vec![1.5; 16], v))
//!             .collect();
//!         let labels = ArrayD::zeros(axes.spatial_shape(patch.shape()).as_slice());
//!         Ok(Prediction { labels, detections })
//!     }
//! }
//!
//! let mut image = ArrayD::<f32>::zeros(vec![200, 200]);
//! image[[20, 30].as_slice()] = 1.0;
//! image[[150, 120].as_slice()] = 0.9;
//!
//! let axes = Axes::parse("YX").unwrap();
//! let detector = Bright { rays: Arc::new(RayTemplate::polygon(16).unwrap()) };
//! let params = TilingParams::new(100, 16, 16);
//! let out = predict_tiled(image.view(), &axes, &params, &detector, &PipelineConfig::default())
//!     .unwrap();
//! assert_eq!(out.objects.len(), 2);
//! assert_ne!(out.labels[[20, 30].as_slice()], 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `quilt-core` | Axes, regions, ids, tiling parameters |
//! | [`cover`] | `quilt-cover` | 1-D coverings and N-D block grids |
//! | [`shape`] | `quilt-shape` | Star-convex polygons and polyhedra |
//! | [`stitch`] | `quilt-stitch` | Ownership rule, ids, tiled pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Axes, regions, ids and tiling parameters (`quilt-core`).
pub use quilt_core as types;

/// One-dimensional coverings and their N-dimensional products
/// (`quilt-cover`).
///
/// [`cover::BlockGrid`] is the entry point; every [`cover::Tile`] reads,
/// crops and writes arrays.
pub use quilt_cover as cover;

/// Star-convex shapes (`quilt-shape`).
pub use quilt_shape as shape;

/// Stitching and the tiled pipeline (`quilt-stitch`).
///
/// Implement [`stitch::Detector`] and call [`stitch::predict_tiled`].
pub use quilt_stitch as stitch;

/// Common imports for typical Quilt usage.
///
/// ```rust
/// use quilt::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use quilt_core::{Axes, Axis, AxisParam, ConfigError, ObjectId, Region, TilingParams};

    // Covering
    pub use quilt_cover::{AxisBlock, BlockGrid, CoverError, Tile, TileError};

    // Shapes
    pub use quilt_shape::{render_labels, RayTemplate, ShapeError, StarShape};

    // Stitching
    pub use quilt_stitch::{
        predict_tiled, predict_whole, reassemble, DetectError, Detection, Detector,
        PipelineConfig, PipelineError, Prediction, StitchError, StitchOutcome, StitchedObjects,
        Stitcher,
    };
}
