//! Benchmark profiles for the Quilt tiling pipeline.
//!
//! - [`reference_profile_2d`]: 1024x1024 image, 800 polygons, 256-pixel tiles
//! - [`reference_profile_3d`]: 96x256x256 volume, 300 polyhedra

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use quilt_core::{Axes, TilingParams};
use quilt_shape::RayTemplate;
use quilt_test_utils::Scene;
use std::sync::Arc;

/// A scene with the layout and tiling to run it with.
pub struct Profile {
    /// Synthetic objects and their marker image.
    pub scene: Scene,
    /// Layout of the marker image.
    pub axes: Axes,
    /// Tiling parameters.
    pub params: TilingParams,
}

/// 2-D reference profile: 1024x1024 image with 800 polygons of 32 rays.
pub fn reference_profile_2d(seed: u64) -> Profile {
    let rays = Arc::new(RayTemplate::polygon(32).unwrap());
    Profile {
        scene: Scene::random(&[1024, 1024], rays, 800, 10.0, seed),
        axes: Axes::parse("YX").unwrap(),
        params: TilingParams::new(256, 32, 32),
    }
}

/// 3-D reference profile: 96x256x256 volume with 300 polyhedra of 64 rays.
pub fn reference_profile_3d(seed: u64) -> Profile {
    let rays = Arc::new(RayTemplate::golden_spiral(64, Some([2.0, 1.0, 1.0])).unwrap());
    Profile {
        scene: Scene::random(&[96, 256, 256], rays, 300, 6.0, seed),
        axes: Axes::parse("ZYX").unwrap(),
        params: TilingParams::new(0, 16, 16).with_block_size([96usize, 128, 128]),
    }
}
