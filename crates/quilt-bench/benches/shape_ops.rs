//! Criterion micro-benchmarks for shape construction and rasterization.

use criterion::{criterion_group, criterion_main, Criterion};
use quilt_bench::{reference_profile_2d, reference_profile_3d};
use quilt_shape::RayTemplate;
use std::hint::black_box;

/// Benchmark: build the 96-ray golden spiral template (hull included).
fn bench_golden_spiral_96(c: &mut Criterion) {
    c.bench_function("golden_spiral_96", |b| {
        b.iter(|| black_box(RayTemplate::golden_spiral(black_box(96), None).unwrap()));
    });
}

/// Benchmark: rasterize all 800 polygons of the 2-D profile.
fn bench_polygon_masks(c: &mut Criterion) {
    let profile = reference_profile_2d(1);
    c.bench_function("polygon_masks_800", |b| {
        b.iter(|| {
            // Fresh shapes each iteration: masks are cached per shape.
            for shape in profile.scene.shapes() {
                black_box(shape.mask());
            }
        });
    });
}

/// Benchmark: voxelize all 300 polyhedra of the 3-D profile.
fn bench_polyhedron_masks(c: &mut Criterion) {
    let profile = reference_profile_3d(1);
    c.bench_function("polyhedron_masks_300", |b| {
        b.iter(|| {
            for shape in profile.scene.shapes() {
                black_box(shape.mask());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_golden_spiral_96,
    bench_polygon_masks,
    bench_polyhedron_masks
);
criterion_main!(benches);
