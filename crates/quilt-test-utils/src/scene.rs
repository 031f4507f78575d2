//! Seeded synthetic scenes of star-convex objects.
//!
//! Every object leaves one marker in the scene's image: the pixel at
//! `floor(center)` holds the object's index plus one. Centres are
//! multiples of 1/8 so moving them between tile and array frames is
//! exact in floating point.

use ndarray::{ArrayD, Axis, IxDyn};
use quilt_core::ObjectId;
use quilt_shape::{render_labels, RayTemplate, StarShape};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use std::sync::Arc;

/// One ground-truth object.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub center: SmallVec<[f64; 3]>,
    pub radii: Vec<f64>,
    pub score: f32,
}

impl SceneObject {
    /// An object with the same radius along each of `n_rays` rays.
    pub fn round(center: &[f64], radius: f64, n_rays: usize, score: f32) -> Self {
        Self {
            center: SmallVec::from_slice(center),
            radii: vec![radius; n_rays],
            score,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub rays: Arc<RayTemplate>,
    pub shape: Vec<usize>,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Up to `n_objects` objects with radii in `[0.6, 1] * max_radius`.
    ///
    /// Centres are kept at least `max_radius` apart, so objects may
    /// overlap but never share a marker pixel.
    pub fn random(
        shape: &[usize],
        rays: Arc<RayTemplate>,
        n_objects: usize,
        max_radius: f64,
        seed: u64,
    ) -> Self {
        Self::generate(shape, rays, n_objects, max_radius, max_radius.max(1.5), seed)
    }

    /// Like [`random`](Self::random), but no two objects share a pixel.
    pub fn disjoint(
        shape: &[usize],
        rays: Arc<RayTemplate>,
        n_objects: usize,
        max_radius: f64,
        seed: u64,
    ) -> Self {
        Self::generate(shape, rays, n_objects, max_radius, 2.0 * max_radius + 2.0, seed)
    }

    fn generate(
        shape: &[usize],
        rays: Arc<RayTemplate>,
        n_objects: usize,
        max_radius: f64,
        min_dist: f64,
        seed: u64,
    ) -> Self {
        assert_eq!(shape.len(), rays.ndim(), "scene and rays disagree");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut objects: Vec<SceneObject> = Vec::new();
        for _ in 0..n_objects * 50 {
            if objects.len() == n_objects {
                break;
            }
            let center: SmallVec<[f64; 3]> = shape
                .iter()
                .map(|&n| (rng.random_range(0.0..n as f64) * 8.0).floor() / 8.0)
                .collect();
            let crowded = objects.iter().any(|o| {
                let d2: f64 = o
                    .center
                    .iter()
                    .zip(&center)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                d2 < min_dist * min_dist
            });
            if crowded {
                continue;
            }
            let radii = (0..rays.len())
                .map(|_| max_radius * rng.random_range(0.6..=1.0))
                .collect();
            let score = rng.random_range(0.05f32..1.0);
            objects.push(SceneObject {
                center,
                radii,
                score,
            });
        }
        Self {
            rays,
            shape: shape.to_vec(),
            objects,
        }
    }

    /// A scene holding exactly `objects`.
    pub fn from_objects(
        shape: &[usize],
        rays: Arc<RayTemplate>,
        objects: Vec<SceneObject>,
    ) -> Self {
        assert_eq!(shape.len(), rays.ndim(), "scene and rays disagree");
        Self {
            rays,
            shape: shape.to_vec(),
            objects,
        }
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects as full-array shapes, in scene order.
    pub fn shapes(&self) -> Vec<StarShape> {
        self.objects
            .iter()
            .filter_map(|o| {
                StarShape::new(&o.center, Arc::clone(&self.rays), o.radii.clone(), &self.shape)
                    .ok()
                    .map(|s| s.with_score(o.score))
            })
            .collect()
    }

    /// Ground-truth labels, object `k` labelled `k + 1`.
    pub fn labels(&self) -> ArrayD<u32> {
        let shapes = self.shapes();
        render_labels(
            &self.shape,
            shapes.iter().zip(1u32..).map(|(s, id)| (ObjectId(id), s)),
        )
    }

    /// Marker image over the spatial axes.
    pub fn marker_image(&self) -> ArrayD<f32> {
        let mut image = ArrayD::<f32>::zeros(IxDyn(&self.shape));
        for (k, o) in self.objects.iter().enumerate() {
            let p: Vec<usize> = o.center.iter().map(|c| c.floor() as usize).collect();
            image[p.as_slice()] = (k + 1) as f32;
        }
        image
    }

    /// Marker image with a trailing channel axis of `channels` entries.
    ///
    /// Markers live in channel 0; the other channels hold a constant
    /// pattern the detector must ignore.
    pub fn marker_image_with_channels(&self, channels: usize) -> ArrayD<f32> {
        let markers = self.marker_image();
        let mut shape = self.shape.clone();
        shape.push(channels);
        let mut image = ArrayD::<f32>::from_elem(IxDyn(&shape), 0.25);
        let last = Axis(shape.len() - 1);
        image.index_axis_mut(last, 0).assign(&markers);
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_deterministic() {
        let rays = Arc::new(RayTemplate::polygon(16).unwrap());
        let a = Scene::random(&[64, 64], rays.clone(), 10, 5.0, 3);
        let b = Scene::random(&[64, 64], rays, 10, 5.0, 3);
        assert_eq!(a.objects, b.objects);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn markers_are_distinct() {
        let rays = Arc::new(RayTemplate::polygon(16).unwrap());
        let scene = Scene::random(&[50, 50], rays, 20, 4.0, 11);
        let image = scene.marker_image();
        let n = image.iter().filter(|&&v| v > 0.0).count();
        assert_eq!(n, scene.len());
    }
}
