//! A detector that reads markers instead of running a model.

use crate::scene::{Scene, SceneObject};
use ndarray::{ArrayD, ArrayViewD, Axis as NdAxis, Dimension};
use quilt_core::{Axes, ObjectId};
use quilt_shape::{render_labels, RayTemplate, StarShape};
use quilt_stitch::{DetectError, Detection, Detector, Prediction};
use smallvec::SmallVec;
use std::sync::Arc;

/// Mock [`Detector`] for a [`Scene`].
///
/// Every marker pixel in the patch becomes one detection with the
/// scene object's radii and score. Non-spatial axes are reduced to their
/// first entry. The label patch renders the patch's own detections.
#[derive(Clone, Debug)]
pub struct MarkerDetector {
    rays: Arc<RayTemplate>,
    objects: Vec<SceneObject>,
}

impl MarkerDetector {
    pub fn new(scene: &Scene) -> Self {
        Self {
            rays: Arc::clone(&scene.rays),
            objects: scene.objects.clone(),
        }
    }
}

impl Detector for MarkerDetector {
    fn rays(&self) -> &Arc<RayTemplate> {
        &self.rays
    }

    fn predict(&self, patch: ArrayViewD<'_, f32>, axes: &Axes) -> Result<Prediction, DetectError> {
        axes.check_shape(patch.shape())
            .map_err(|e| DetectError::new(e.to_string()))?;
        let mut view = patch;
        for k in (0..axes.len()).rev() {
            if !axes.as_slice()[k].is_spatial() {
                view = view.index_axis_move(NdAxis(k), 0);
            }
        }
        let extent = view.shape().to_vec();

        let mut detections = Vec::new();
        for (ix, &v) in view.indexed_iter() {
            if v < 0.5 {
                continue;
            }
            let object = self
                .objects
                .get(v.round() as usize - 1)
                .ok_or_else(|| DetectError::new(format!("unknown marker {v}")))?;
            let center: SmallVec<[f64; 3]> = ix
                .slice()
                .iter()
                .zip(&object.center)
                .map(|(&p, &c)| p as f64 + (c - c.floor()))
                .collect();
            detections.push(Detection::new(&center, object.radii.clone(), object.score));
        }

        let origin = vec![0; extent.len()];
        let shapes = detections
            .iter()
            .map(|d| d.to_shape(&self.rays, &origin, &extent))
            .collect::<Result<Vec<StarShape>, _>>()
            .map_err(|e| DetectError::new(e.to_string()))?;
        let labels: ArrayD<u32> = render_labels(
            &extent,
            shapes.iter().zip(1u32..).map(|(s, id)| (ObjectId(id), s)),
        );
        Ok(Prediction { labels, detections })
    }
}
