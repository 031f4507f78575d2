//! Tiled 2-D prediction agrees with whole-image prediction.

use quilt_core::{Axes, TilingParams};
use quilt_shape::RayTemplate;
use quilt_stitch::{
    predict_tiled, predict_whole, PipelineConfig, PipelineError, StitchError, StitchOutcome,
    TileFailure, TileStage,
};
use quilt_test_utils::{
    assert_detections_close, matching, same_partition, sorted_detections, MarkerDetector, Scene,
    SceneObject,
};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene(seed: u64) -> Scene {
    let rays = Arc::new(RayTemplate::polygon(32).unwrap());
    Scene::random(&[420, 390], rays, 150, 7.0, seed)
}

#[test]
fn tiled_matches_whole_image() {
    init_logging();
    let axes = Axes::parse("YX").unwrap();
    for (seed, grid) in [(1, 1usize), (2, 4), (3, 2)] {
        let scene = scene(seed);
        let detector = MarkerDetector::new(&scene);
        let image = scene.marker_image();
        let params = TilingParams::new(128, 20, 20).with_grid(grid);

        let whole = predict_whole(image.view(), &axes, &detector).unwrap();
        let tiled = predict_tiled(
            image.view(),
            &axes,
            &params,
            &detector,
            &PipelineConfig::default(),
        )
        .unwrap();

        assert!(tiled.reports.len() > 1);
        assert!(tiled.reports.iter().all(|r| r.stage == TileStage::Written));
        assert_eq!(tiled.objects.len(), whole.objects.len());

        let stats = matching(whole.labels.view(), tiled.labels.view(), 0.99);
        assert_eq!(stats.accuracy, 1.0, "seed {seed}: {stats:?}");
        assert_eq!(stats.mean_true_score, 1.0, "seed {seed}: {stats:?}");
        assert!(same_partition(whole.labels.view(), tiled.labels.view()));

        assert_detections_close(
            &sorted_detections(&whole.objects),
            &sorted_detections(&tiled.objects),
            1e-2,
        );
    }
}

#[test]
fn large_context_tiling_with_and_without_channel() {
    let scene = scene(10);
    let detector = MarkerDetector::new(&scene);
    let params = TilingParams::new(288, 32, 96);
    for (layout, image) in [
        ("YX", scene.marker_image()),
        ("YXC", scene.marker_image_with_channels(1)),
    ] {
        let axes = Axes::parse(layout).unwrap();
        let whole = predict_whole(image.view(), &axes, &detector).unwrap();
        let tiled = predict_tiled(
            image.view(),
            &axes,
            &params,
            &detector,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(tiled.reports.len() > 1, "{layout}");
        let stats = matching(whole.labels.view(), tiled.labels.view(), 0.99);
        assert_eq!((stats.accuracy, stats.mean_true_score), (1.0, 1.0), "{layout}");
        assert_detections_close(
            &sorted_detections(&whole.objects),
            &sorted_detections(&tiled.objects),
            1e-2,
        );
    }
}

#[test]
fn tiled_matches_ground_truth() {
    let axes = Axes::parse("YX").unwrap();
    let scene = scene(9);
    let detector = MarkerDetector::new(&scene);
    let tiled = predict_tiled(
        scene.marker_image().view(),
        &axes,
        &TilingParams::new(110, 18, 18),
        &detector,
        &PipelineConfig::default(),
    )
    .unwrap();
    assert!(same_partition(scene.labels().view(), tiled.labels.view()));
}

#[test]
fn channel_axis_is_carried_through() {
    let axes = Axes::parse("YXC").unwrap();
    let scene = scene(4);
    let detector = MarkerDetector::new(&scene);
    let image = scene.marker_image_with_channels(3);
    let whole = predict_whole(image.view(), &axes, &detector).unwrap();
    let tiled = predict_tiled(
        image.view(),
        &axes,
        &TilingParams::new(128, 20, 20),
        &detector,
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(tiled.labels.shape(), &[420, 390]);
    assert!(same_partition(whole.labels.view(), tiled.labels.view()));
}

#[test]
fn worker_count_does_not_change_result() {
    let axes = Axes::parse("YX").unwrap();
    let scene = scene(5);
    let detector = MarkerDetector::new(&scene);
    let image = scene.marker_image();
    let params = TilingParams::new(120, 18, 18);
    let run = |workers| {
        predict_tiled(
            image.view(),
            &axes,
            &params,
            &detector,
            &PipelineConfig {
                worker_count: Some(workers),
                ..PipelineConfig::default()
            },
        )
        .unwrap()
    };
    let one = run(1);
    let many = run(6);
    assert_eq!(one.labels, many.labels);
    let ids = |o: &StitchOutcome| o.objects.iter().map(|(id, _)| id).collect::<Vec<_>>();
    assert_eq!(ids(&one), ids(&many));
    assert_eq!(one.reports, many.reports);
}

#[test]
fn ids_come_from_owning_tiles() {
    let axes = Axes::parse("YX").unwrap();
    let scene = scene(6);
    let detector = MarkerDetector::new(&scene);
    let config = PipelineConfig {
        max_objects_per_tile: 1000,
        ..PipelineConfig::default()
    };
    let out = predict_tiled(
        scene.marker_image().view(),
        &axes,
        &TilingParams::new(128, 20, 20),
        &detector,
        &config,
    )
    .unwrap();
    for (id, shape) in out.objects.iter() {
        let tile = (id.0 as usize - 1) / 1000;
        let rep = shape.representative_point().unwrap();
        assert!(out.labels[rep.as_slice()] != 0 || shape.pixel_count() == 0);
        let accepted = out.reports[tile].accepted;
        assert!(accepted > 0, "tile {tile} produced id {id} but accepted nothing");
    }
    let total: usize = out.reports.iter().map(|r| r.accepted).sum();
    assert_eq!(total, out.objects.len());
}

#[test]
fn too_little_context_is_reported() {
    let axes = Axes::parse("YX").unwrap();
    let rays = Arc::new(RayTemplate::polygon(32).unwrap());
    let scene = Scene::random(&[300, 300], rays, 80, 12.0, 7);
    let detector = MarkerDetector::new(&scene);
    let err = predict_tiled(
        scene.marker_image().view(),
        &axes,
        &TilingParams::new(64, 4, 4),
        &detector,
        &PipelineConfig::default(),
    )
    .unwrap_err();
    match err {
        PipelineError::Tile {
            stage: TileStage::Filtered,
            source: TileFailure::Stitch(StitchError::NotFullyVisible { .. }),
            ..
        } => {}
        other => panic!("expected NotFullyVisible, got {other:?}"),
    }
}

/// Objects of radius 8 sitting on the core boundaries at 50, 100 and 150.
///
/// Each one's marker lies in a different tile from its first pixel.
fn straddling_scene() -> Scene {
    let rays = Arc::new(RayTemplate::polygon(32).unwrap());
    let mut objects = Vec::new();
    for boundary in [50.0, 100.0, 150.0] {
        for (j, offset) in [-6.5, 2.5, 6.0].into_iter().enumerate() {
            let center = [boundary + offset, 10.0 + 20.0 * j as f64];
            objects.push(SceneObject::round(&center, 8.0, 32, 0.5 + 0.1 * j as f32));
        }
    }
    Scene::from_objects(&[200, 60], rays, objects)
}

#[test]
fn objects_across_core_boundaries_are_kept_once() {
    init_logging();
    let axes = Axes::parse("YX").unwrap();
    let scene = straddling_scene();
    let detector = MarkerDetector::new(&scene);
    let image = scene.marker_image();
    // No context at all: the overlap alone keeps every object in view.
    let params = TilingParams::new(100, 40, 0);
    let whole = predict_whole(image.view(), &axes, &detector).unwrap();
    let tiled = predict_tiled(
        image.view(),
        &axes,
        &params,
        &detector,
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(tiled.reports.len(), 4);
    assert_eq!(whole.objects.len(), 9);
    assert_eq!(tiled.objects.len(), 9);
    // Objects sitting on a boundary are reported by both neighbours.
    let detected: usize = tiled.reports.iter().map(|r| r.detections).sum();
    assert!(detected > 9);
    assert!(same_partition(whole.labels.view(), tiled.labels.view()));
    assert!(same_partition(scene.labels().view(), tiled.labels.view()));
}

#[test]
fn object_wider_than_context_is_not_lost() {
    let axes = Axes::parse("YX").unwrap();
    let rays = Arc::new(RayTemplate::polygon(32).unwrap());
    // The marker is in tile 1, the first pixel in tile 0, whose read
    // region ends at 77 while the object reaches 95.
    let scene = Scene::from_objects(
        &[200, 60],
        rays,
        vec![SceneObject::round(&[79.0, 30.0], 16.0, 32, 0.9)],
    );
    let detector = MarkerDetector::new(&scene);
    let err = predict_tiled(
        scene.marker_image().view(),
        &axes,
        &TilingParams::new(100, 10, 10),
        &detector,
        &PipelineConfig::default(),
    )
    .unwrap_err();
    match err {
        PipelineError::Tile {
            tile: 1,
            stage: TileStage::Filtered,
            source: TileFailure::Stitch(StitchError::NotFullyVisible { tile: 0, .. }),
        } => {}
        other => panic!("expected tile 0 to be reported blind, got {other:?}"),
    }
}

#[test]
fn id_budget_per_tile_is_enforced() {
    let axes = Axes::parse("YX").unwrap();
    let scene = scene(8);
    let detector = MarkerDetector::new(&scene);
    let err = predict_tiled(
        scene.marker_image().view(),
        &axes,
        &TilingParams::new(256, 20, 20),
        &detector,
        &PipelineConfig {
            max_objects_per_tile: 2,
            ..PipelineConfig::default()
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Tile {
            source: TileFailure::Stitch(StitchError::TooManyObjects { max: 2, .. }),
            ..
        }
    ));
}
