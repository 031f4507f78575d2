//! Core types for the Quilt tiling and stitching workspace.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate: axis tags, N-dimensional
//! regions, object identifiers, tiling configuration, and the
//! configuration error type.
//!
//! Configuration is broadcast exactly once, at the API boundary:
//! [`TilingParams`] accepts scalar-or-per-axis values and
//! [`TilingParams::resolve`] turns them into one validated [`AxisTiling`]
//! per spatial axis.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axes;
pub mod error;
pub mod id;
pub mod params;
pub mod region;

pub use axes::{Axes, Axis};
pub use error::ConfigError;
pub use id::{ObjectId, Point};
pub use params::{AxisParam, AxisTiling, TilingParams};
pub use region::Region;
