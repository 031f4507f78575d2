//! Test utilities and mock types for Quilt development.
//!
//! - [`blob_labels`]: random label images for the geometry-free path.
//! - [`Scene`]: seeded star-convex objects with a marker image that
//!   [`MarkerDetector`] turns back into detections.
//! - [`matching`] and [`same_partition`]: comparing label images.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod detector;
mod labels;
mod metrics;
mod scene;

pub use detector::MarkerDetector;
pub use labels::{blob_labels, max_extents, repeat_labels, tile_labels};
pub use metrics::{
    assert_detections_close, matching, same_partition, sorted_detections, MatchStats,
};
pub use scene::{Scene, SceneObject};
