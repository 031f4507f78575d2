//! Reading, cropping and writing every tile reproduces the input exactly.
//!
//! Label images are small random blobs tiled several times over, with
//! `min_overlap` one more than the largest blob extent on each axis.

use ndarray::{ArrayD, IxDyn};
use quilt_core::{Axes, TilingParams};
use quilt_cover::{BlockGrid, CoverError};
use quilt_test_utils::{blob_labels, max_extents, tile_labels};

fn reassemble(x: &ArrayD<u32>, axes: &Axes, params: &TilingParams) -> ArrayD<u32> {
    let grid = BlockGrid::cover(x.shape(), axes, params).unwrap();
    let mut y = ArrayD::<u32>::zeros(IxDyn(x.shape()));
    for tile in grid.tiles() {
        let patch = tile.read(x.view()).unwrap();
        let read_shape: Vec<usize> = tile.read_slice().iter().map(|r| r.len()).collect();
        assert_eq!(patch.shape(), read_shape.as_slice());
        let core = tile.crop_context(patch).unwrap();
        let core_shape: Vec<usize> = tile.crop_slice().iter().map(|r| r.len()).collect();
        assert_eq!(core.shape(), core_shape.as_slice());
        tile.write(y.view_mut(), core).unwrap();
    }
    y
}

fn min_overlap(x: &ArrayD<u32>, n_spatial: usize) -> Vec<usize> {
    max_extents(x.view())[..n_spatial]
        .iter()
        .map(|e| e + 1)
        .collect()
}

#[test]
fn reassembly_2d() {
    let axes = Axes::parse("YX").unwrap();
    let x = tile_labels(&blob_labels(&[80, 64], 12, 9, 7), &[4, 4]);
    let overlap = min_overlap(&x, 2);
    for grid in [1usize, 3, 6] {
        for (block_size, context) in [(40, 0), (55, 3), (80, 10), (128, 17), (256, 80), (512, 93)] {
            let params = TilingParams::new(block_size, 0, context)
                .with_min_overlap(overlap.clone())
                .with_grid(grid);
            let y = reassemble(&x, &axes, &params);
            assert_eq!(x, y, "block {block_size}, context {context}, grid {grid}");
        }
    }
}

#[test]
fn reassembly_2d_with_channel() {
    let axes = Axes::parse("YXC").unwrap();
    let x = ArrayD::from_shape_fn(IxDyn(&[133, 151, 3]), |ix| {
        (ix[0] * 10_000 + ix[1] * 10 + ix[2]) as u32
    });
    let params = TilingParams::new(48, 8, 4).with_grid(2usize);
    let grid = BlockGrid::cover(x.shape(), &axes, &params).unwrap();
    assert!(grid.len() > 1);
    assert_eq!(reassemble(&x, &axes, &params), x);
}

#[test]
fn reassembly_3d() {
    let axes = Axes::parse("ZYX").unwrap();
    let x = tile_labels(&blob_labels(&[35, 38, 35], 20, 8, 11), &[2, 4, 4]);
    let overlap = min_overlap(&x, 3);
    let cases: [([usize; 3], [usize; 3]); 3] = [
        ([33, 71, 64], [3, 3, 3]),
        ([48, 96, 96], [0, 0, 0]),
        ([62, 97, 93], [0, 11, 9]),
    ];
    for grid in [1usize, 3] {
        for (block_size, context) in cases {
            let params = TilingParams::new(0, 0, 0)
                .with_block_size(block_size)
                .with_min_overlap(overlap.clone())
                .with_context(context)
                .with_grid(grid);
            let y = reassemble(&x, &axes, &params);
            assert_eq!(x, y, "block {block_size:?}, context {context:?}, grid {grid}");
        }
    }
}

#[test]
fn overlap_wider_than_the_core_budget_is_reported() {
    // Objects 80 wide need interior cores of 80, but a block of 100
    // leaves room for cores of 20.
    let axes = Axes::parse("YX").unwrap();
    let params = TilingParams::new(100, 80, 0);
    assert!(matches!(
        BlockGrid::cover(&[2000, 100], &axes, &params),
        Err(CoverError::Infeasible { .. })
    ));
}
