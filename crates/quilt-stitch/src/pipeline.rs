//! Tiled prediction and its whole-image reference.
//!
//! [`predict_tiled`] runs in two phases over a worker pool:
//!
//! 1. every tile reads its patch, runs the detector, checks the label
//!    patch, moves detections into the full-array frame and keeps the
//!    objects it owns;
//! 2. once all accepted objects are merged, every tile renders its core
//!    from the shared registry and the calling thread writes it into the
//!    result.
//!
//! Phase two starts only after every tile has finished phase one, because
//! a tile's core may show objects accepted by its neighbours. The phases
//! are separated by this barrier: no tile renders while another is still
//! detecting.
//!
//! Cores are disjoint and cover the array, so the result needs no locks.
//! Rendering uses the same paint order as [`predict_whole`], which makes
//! the two outputs agree object for object.

use crate::config::PipelineConfig;
use crate::detector::Detector;
use crate::error::{PipelineError, TileStage};
use crate::pool;
use crate::stitcher::{Accepted, Stitcher, StitchedObjects};
use log::debug;
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use quilt_core::{Axes, ObjectId, Point, TilingParams};
use quilt_cover::{BlockGrid, Tile};
use smallvec::SmallVec;

/// Per-tile summary of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileReport {
    /// Flat index of the tile.
    pub tile: usize,
    /// Last stage the tile completed.
    pub stage: TileStage,
    /// Objects reported by the detector for the whole read region.
    pub detections: usize,
    /// Objects the tile owns.
    pub accepted: usize,
}

impl TileReport {
    fn pending(tile: usize) -> Self {
        Self {
            tile,
            stage: TileStage::Pending,
            detections: 0,
            accepted: 0,
        }
    }
}

/// Result of a prediction run.
#[derive(Clone, Debug)]
pub struct StitchOutcome {
    /// Label image over the spatial axes of the input.
    pub labels: ArrayD<u32>,
    /// Accepted objects in id order.
    pub objects: StitchedObjects,
    /// One report per tile in canonical order.
    pub reports: Vec<TileReport>,
}

struct DetectContext<'a, D: ?Sized> {
    image: ArrayViewD<'a, f32>,
    axes: &'a Axes,
    spatial_axes: &'a Axes,
    spatial_shape: &'a [usize],
    detector: &'a D,
    stitcher: &'a Stitcher,
}

struct TileOutput {
    detections: usize,
    accepted: Vec<Accepted>,
}

fn check_rays<D: Detector + ?Sized>(detector: &D, axes: &Axes) -> Result<(), PipelineError> {
    let rays = detector.rays().ndim();
    if rays != axes.n_spatial() {
        return Err(PipelineError::RayDimension {
            rays,
            spatial: axes.n_spatial(),
        });
    }
    Ok(())
}

fn detect_tile<D: Detector + ?Sized>(
    ctx: &DetectContext<'_, D>,
    tile: &Tile,
) -> Result<TileOutput, PipelineError> {
    let flat = tile.flat_index();
    let patch = tile
        .read(ctx.image.view())
        .map_err(|e| PipelineError::tile(flat, TileStage::Read, e))?;
    let prediction = ctx
        .detector
        .predict(patch, ctx.axes)
        .map_err(|e| PipelineError::tile(flat, TileStage::Detected, e))?;
    tile.crop_context_axes(prediction.labels.view(), ctx.spatial_axes)
        .map_err(|e| PipelineError::tile(flat, TileStage::Cropped, e))?;

    let origin = tile.read_origin();
    let shapes = prediction
        .detections
        .iter()
        .map(|d| d.to_shape(ctx.detector.rays(), &origin, ctx.spatial_shape))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::tile(flat, TileStage::Filtered, e))?;
    let accepted = ctx
        .stitcher
        .filter(tile, shapes)
        .map_err(|e| PipelineError::tile(flat, TileStage::Filtered, e))?;
    Ok(TileOutput {
        detections: prediction.detections.len(),
        accepted,
    })
}

/// Predict on `image` tile by tile and stitch the results.
///
/// Each object is kept by exactly one tile, so the output has no
/// duplicated or cut objects as long as `context` exceeds the largest
/// object extent. Any failure aborts the run.
pub fn predict_tiled<D>(
    image: ArrayViewD<'_, f32>,
    axes: &Axes,
    params: &TilingParams,
    detector: &D,
    config: &PipelineConfig,
) -> Result<StitchOutcome, PipelineError>
where
    D: Detector + ?Sized,
{
    let grid = BlockGrid::cover(image.shape(), axes, params)?;
    check_rays(detector, axes)?;
    let stitcher = Stitcher::new(&grid, config.max_objects_per_tile)?;
    let spatial_axes = axes.spatial();
    let spatial_shape = grid.spatial_shape();
    let workers = config.workers_for(grid.len());
    debug!(
        "tiled prediction: {} tiles {:?} on {workers} workers",
        grid.len(),
        grid.grid_shape().as_slice()
    );

    let mut reports: Vec<TileReport> = (0..grid.len()).map(TileReport::pending).collect();
    let mut objects = StitchedObjects::new();
    let ctx = DetectContext {
        image: image.view(),
        axes,
        spatial_axes: &spatial_axes,
        spatial_shape: &spatial_shape,
        detector,
        stitcher: &stitcher,
    };
    pool::run(
        grid.tiles(),
        workers,
        |tile| detect_tile(&ctx, tile),
        |tile, out: TileOutput| {
            let report = &mut reports[tile.flat_index()];
            report.stage = TileStage::Filtered;
            report.detections = out.detections;
            report.accepted = out.accepted.len();
            objects.merge(out.accepted)?;
            Ok(())
        },
    )?;
    objects.sort();
    debug!(
        "phase one: {} detections, {} objects accepted",
        reports.iter().map(|r| r.detections).sum::<usize>(),
        objects.len()
    );

    let mut labels = ArrayD::<u32>::zeros(IxDyn(&spatial_shape));
    let registry = &objects;
    pool::run(
        grid.tiles(),
        workers,
        |tile| Ok(registry.render_tile(tile)),
        |tile, patch: ArrayD<u32>| {
            tile.write_axes(labels.view_mut(), patch.view(), &spatial_axes)
                .map_err(|e| PipelineError::tile(tile.flat_index(), TileStage::Written, e))?;
            reports[tile.flat_index()].stage = TileStage::Written;
            Ok(())
        },
    )?;
    debug!("phase two: {} tiles written", grid.len());

    Ok(StitchOutcome {
        labels,
        objects,
        reports,
    })
}

/// Predict on the whole image in one detector call.
///
/// Ids are `1..=n` in detection order. The reference against which
/// [`predict_tiled`] is compared.
pub fn predict_whole<D>(
    image: ArrayViewD<'_, f32>,
    axes: &Axes,
    detector: &D,
) -> Result<StitchOutcome, PipelineError>
where
    D: Detector + ?Sized,
{
    axes.check_shape(image.shape())?;
    check_rays(detector, axes)?;
    let spatial_shape = axes.spatial_shape(image.shape());
    let prediction = detector
        .predict(image, axes)
        .map_err(|e| PipelineError::tile(0, TileStage::Detected, e))?;
    let origin: Point = SmallVec::from_elem(0, spatial_shape.len());
    let accepted = prediction
        .detections
        .iter()
        .zip(1u32..)
        .map(|(d, id)| {
            d.to_shape(detector.rays(), &origin, &spatial_shape)
                .map(|shape| Accepted {
                    id: ObjectId(id),
                    shape,
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::tile(0, TileStage::Filtered, e))?;

    let mut objects = StitchedObjects::new();
    objects.merge(accepted)?;
    let labels = objects.render(&spatial_shape);
    let report = TileReport {
        tile: 0,
        stage: TileStage::Written,
        detections: prediction.detections.len(),
        accepted: objects.len(),
    };
    Ok(StitchOutcome {
        labels,
        objects,
        reports: vec![report],
    })
}

/// Cut a label image into tiles and write every core back.
///
/// The geometry-free path: `read`, `crop_context`, `filter_labels` and
/// `write` for each tile. The result equals the input.
pub fn reassemble(
    labels: ArrayViewD<'_, u32>,
    axes: &Axes,
    params: &TilingParams,
) -> Result<ArrayD<u32>, PipelineError> {
    let grid = BlockGrid::cover(labels.shape(), axes, params)?;
    let stitcher = Stitcher::new(&grid, 1)?;
    let mut out = ArrayD::<u32>::zeros(labels.raw_dim());
    for tile in grid.tiles() {
        let flat = tile.flat_index();
        let patch = tile
            .read(labels.view())
            .map_err(|e| PipelineError::tile(flat, TileStage::Read, e))?;
        let cropped = tile
            .crop_context(patch)
            .map_err(|e| PipelineError::tile(flat, TileStage::Cropped, e))?;
        let kept = stitcher
            .filter_labels(tile, cropped)
            .map_err(|e| PipelineError::tile(flat, TileStage::Filtered, e))?;
        tile.write(out.view_mut(), kept.view())
            .map_err(|e| PipelineError::tile(flat, TileStage::Written, e))?;
    }
    debug!("reassembled {} tiles", grid.len());
    Ok(out)
}
