//! Grid-aligned, context-padded block coverings of N-dimensional arrays.
//!
//! - [`AxisBlock`] / [`cover_axis`]: partition one axis into disjoint
//!   cores padded by context.
//! - [`BlockGrid`]: the Cartesian product over all spatial axes, with
//!   [`Tile`] views for reading patches, cropping context and writing
//!   cores back.
//!
//! Covering never silently produces an invalid tiling: every chain it
//! returns passes [`check_chain`], and impossible requests fail with
//! [`CoverError::Infeasible`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axis_block;
pub mod error;
pub mod grid;

pub use axis_block::{check_chain, cover_axis, AxisBlock};
pub use error::{CoverError, TileError};
pub use grid::{BlockGrid, Tile};
