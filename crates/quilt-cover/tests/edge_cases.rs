//! Covering robustness across a sweep of awkward axis sizes.

use ndarray::{ArrayD, IxDyn};
use quilt_core::{Axes, AxisTiling, TilingParams};
use quilt_cover::{check_chain, cover_axis, BlockGrid};

const BLOCK_SIZE: usize = 4096;
const MIN_OVERLAP: usize = 128;
const CONTEXT: usize = 128;
const GRID: usize = 16;

fn tiling() -> AxisTiling {
    AxisTiling::new(BLOCK_SIZE, MIN_OVERLAP, CONTEXT, GRID).unwrap()
}

#[test]
fn every_size_in_sweep_has_a_valid_cover() {
    let t = tiling();
    for size in 7800..8000 {
        let blocks = cover_axis(size, &t).unwrap_or_else(|e| panic!("size {size}: {e}"));
        check_chain(&blocks, &t).unwrap_or_else(|e| panic!("size {size}: {e}"));
        assert_eq!(blocks.first().unwrap().write().start, 0);
        assert_eq!(blocks.last().unwrap().write().end, size);
        for pair in blocks.windows(2) {
            assert!(pair[0].overlap(&pair[1]) >= MIN_OVERLAP, "size {size}");
            assert_eq!(pair[1].write().start % GRID, 0, "size {size}");
        }
        for b in &blocks {
            assert!(b.read_len() <= BLOCK_SIZE, "size {size}");
        }
    }
}

#[test]
fn sweep_reassembles_thin_arrays() {
    let axes = Axes::parse("YX").unwrap();
    let params = TilingParams::new(BLOCK_SIZE, MIN_OVERLAP, CONTEXT).with_grid(GRID);
    for size in (7800..8000).step_by(7) {
        let shape = [size, 24];
        let x = ArrayD::from_shape_fn(IxDyn(&shape), |ix| (ix[0] * 31 + ix[1]) as u32);
        let grid = BlockGrid::cover(&shape, &axes, &params).unwrap();
        assert!(grid.len() > 1, "size {size} should need several tiles");
        let mut y = ArrayD::<u32>::zeros(IxDyn(&shape));
        for tile in grid.tiles() {
            let patch = tile.read(x.view()).unwrap();
            let core = tile.crop_context(patch).unwrap();
            tile.write(y.view_mut(), core).unwrap();
        }
        assert_eq!(x, y, "size {size}");
    }
}
