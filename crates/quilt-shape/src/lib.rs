//! Star-convex polygons and polyhedra.
//!
//! A [`StarShape`] is a centre plus one radius per ray of a shared
//! [`RayTemplate`]. In 2-D the boundary points form a polygon; in 3-D
//! they are joined into a polyhedron by the template's convex-hull faces.
//!
//! Shapes are immutable. Their [`bounding_region`](StarShape::bounding_region)
//! and [`mask`](StarShape::mask) are derived once and shared by every
//! consumer, and [`render`] paints shapes into label arrays in a
//! deterministic order, so a patch rendered for one tile is bit-identical
//! to the same window of a full-array rendering.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
mod hull;
pub mod polygon;
pub mod polyhedron;
pub mod rays;
pub mod render;
pub mod star;

pub use error::ShapeError;
pub use rays::RayTemplate;
pub use render::{paint_order, render_labels, render_region};
pub use star::StarShape;
