//! Stitching per-tile detections into one label image.
//!
//! A [`Detector`] is run on every tile of a
//! [`BlockGrid`](quilt_cover::BlockGrid). Each tile keeps only the objects
//! it owns (see [`Stitcher`]), ids are made globally unique with an
//! offset per tile (see [`IdScheme`]), and the kept objects are rendered
//! back tile by tile. [`predict_tiled`] drives the whole run on a worker
//! pool; [`predict_whole`] is the single-call reference.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod detector;
pub mod error;
pub mod ids;
pub mod pipeline;
mod pool;
pub mod stitcher;

pub use config::PipelineConfig;
pub use detector::{DetectError, Detection, Detector, Prediction};
pub use error::{PipelineError, StitchError, TileFailure, TileStage};
pub use ids::IdScheme;
pub use pipeline::{predict_tiled, predict_whole, reassemble, StitchOutcome, TileReport};
pub use stitcher::{Accepted, StitchedObjects, Stitcher};
