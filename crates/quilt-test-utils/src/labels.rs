//! Random label images.

use ndarray::{concatenate, ArrayD, ArrayViewD, Axis, Dimension, IxDyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Label image of `shape` with `n_blobs` overlapping random boxes, each
/// at most `max_extent` long on every axis.
///
/// Blob `k` carries label `k + 1`; later blobs overwrite earlier ones.
/// The same seed always gives the same image.
pub fn blob_labels(
    shape: &[usize],
    n_blobs: usize,
    max_extent: usize,
    seed: u64,
) -> ArrayD<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = ArrayD::<u32>::zeros(IxDyn(shape));
    for label in 1..=n_blobs as u32 {
        let bounds: Vec<(usize, usize)> = shape
            .iter()
            .map(|&n| {
                let start = rng.random_range(0..n);
                let len = rng.random_range(1..=max_extent.min(n).max(1));
                (start, (start + len).min(n))
            })
            .collect();
        for (ix, v) in out.indexed_iter_mut() {
            let inside = bounds
                .iter()
                .enumerate()
                .all(|(k, &(lo, hi))| (lo..hi).contains(&ix[k]));
            if inside {
                *v = label;
            }
        }
    }
    out
}

/// Concatenate `reps[k]` copies of `labels` along each axis `k`.
///
/// Each new copy has its labels shifted past the current maximum, so
/// copies never share an object. Extents of single objects are kept.
pub fn tile_labels(labels: &ArrayD<u32>, reps: &[usize]) -> ArrayD<u32> {
    let mut out = labels.clone();
    for (k, &rep) in reps.iter().enumerate() {
        let n_labels = out.iter().copied().max().unwrap_or(0);
        let copies: Vec<ArrayD<u32>> = (0..rep as u32)
            .map(|i| out.mapv(|v| if v > 0 { v + n_labels * i } else { 0 }))
            .collect();
        let views: Vec<_> = copies.iter().map(|c| c.view()).collect();
        out = concatenate(Axis(k), &views).expect("copies share a shape");
    }
    out
}

/// Largest bounding-box extent of any single label along each axis.
pub fn max_extents(labels: ArrayViewD<'_, u32>) -> Vec<usize> {
    let ndim = labels.ndim();
    let mut boxes: BTreeMap<u32, Vec<(usize, usize)>> = BTreeMap::new();
    for (ix, &v) in labels.indexed_iter() {
        if v == 0 {
            continue;
        }
        let b = boxes
            .entry(v)
            .or_insert_with(|| vec![(usize::MAX, 0); ndim]);
        for (k, (lo, hi)) in b.iter_mut().enumerate() {
            *lo = (*lo).min(ix[k]);
            *hi = (*hi).max(ix[k] + 1);
        }
    }
    (0..ndim)
        .map(|k| boxes.values().map(|b| b[k].1 - b[k].0).max().unwrap_or(0))
        .collect()
}

/// Broadcast a label image along a new trailing axis of length `n`.
pub fn repeat_labels(labels: &ArrayD<u32>, n: usize) -> ArrayD<u32> {
    let mut shape = labels.shape().to_vec();
    shape.push(n);
    ArrayD::from_shape_fn(IxDyn(&shape), |ix| {
        let n = ix.ndim();
        labels[&ix.slice()[..n - 1]]
    })
}
