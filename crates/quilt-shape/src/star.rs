//! Star-convex shapes in full-array coordinates.

use crate::error::ShapeError;
use crate::rays::RayTemplate;
use crate::{polygon, polyhedron};
use ndarray::ArrayD;
use ndarray::Dimension;
use quilt_core::{Point, Region};
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};

/// A star-convex polygon (2-D) or polyhedron (3-D).
///
/// Coordinates are in the frame of the full array whose spatial extent is
/// `shape_max`. The bounding region is computed at construction; the mask
/// is rasterized on first use and cached.
#[derive(Clone, Debug)]
pub struct StarShape {
    rays: Arc<RayTemplate>,
    center: SmallVec<[f64; 3]>,
    radii: Vec<f64>,
    score: Option<f32>,
    shape_max: Point,
    bounds: Region,
    mask: OnceLock<ArrayD<bool>>,
}

impl StarShape {
    /// Build a shape, validating every input against the ray template.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use quilt_shape::{RayTemplate, StarShape};
    ///
    /// let rays = Arc::new(RayTemplate::polygon(16).unwrap());
    /// let shape = StarShape::new(&[5.0, 5.0], rays, vec![2.0; 16], &[10, 10]).unwrap();
    /// assert_eq!(shape.bounding_region().ranges(), &[3..8, 3..8]);
    /// assert!(shape.mask()[[2, 2].as_slice()]);
    /// ```
    pub fn new(
        center: &[f64],
        rays: Arc<RayTemplate>,
        radii: Vec<f64>,
        shape_max: &[usize],
    ) -> Result<Self, ShapeError> {
        let ndim = rays.ndim();
        if center.len() != ndim {
            return Err(ShapeError::DimensionMismatch {
                what: "center",
                expected: ndim,
                got: center.len(),
            });
        }
        if shape_max.len() != ndim {
            return Err(ShapeError::DimensionMismatch {
                what: "shape_max",
                expected: ndim,
                got: shape_max.len(),
            });
        }
        if radii.len() != rays.len() {
            return Err(ShapeError::RadiiMismatch {
                expected: rays.len(),
                got: radii.len(),
            });
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(ShapeError::NonFinite { what: "center" });
        }
        if radii.iter().any(|r| !r.is_finite()) {
            return Err(ShapeError::NonFinite { what: "radii" });
        }
        if let Some((index, &value)) = radii.iter().enumerate().find(|(_, r)| **r < 0.0) {
            return Err(ShapeError::NegativeRadius { index, value });
        }

        let mut shape = Self {
            rays,
            center: SmallVec::from_slice(center),
            radii,
            score: None,
            shape_max: SmallVec::from_slice(shape_max),
            bounds: Region::new(std::iter::empty()),
            mask: OnceLock::new(),
        };
        shape.bounds = shape.compute_bounds();
        Ok(shape)
    }

    /// Attach a detection score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Number of spatial dimensions.
    pub fn ndim(&self) -> usize {
        self.center.len()
    }

    /// Centre point.
    pub fn center(&self) -> &[f64] {
        &self.center
    }

    /// One radius per ray.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Detection score, if any.
    pub fn score(&self) -> Option<f32> {
        self.score
    }

    /// Shared ray template.
    pub fn rays(&self) -> &Arc<RayTemplate> {
        &self.rays
    }

    /// Spatial extent of the enclosing array.
    pub fn shape_max(&self) -> &[usize] {
        &self.shape_max
    }

    /// Boundary points `center + radii[k] * rays[k]`.
    pub fn vertices(&self) -> Vec<SmallVec<[f64; 3]>> {
        self.radii
            .iter()
            .enumerate()
            .map(|(k, &r)| {
                let d = self.rays.direction(k);
                self.center.iter().zip(&d).map(|(c, d)| c + r * d).collect()
            })
            .collect()
    }

    fn compute_bounds(&self) -> Region {
        let vertices = self.vertices();
        Region::new((0..self.ndim()).map(|k| {
            let (lo, hi) = vertices
                .iter()
                .map(|v| v[k])
                .chain(std::iter::once(self.center[k]))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                    (lo.min(x), hi.max(x))
                });
            let n = self.shape_max[k] as f64;
            let lo = lo.floor().clamp(0.0, n);
            let hi = (hi.floor() + 1.0).clamp(lo, n);
            lo as usize..hi as usize
        }))
    }

    /// Axis-aligned box holding every pixel whose centre can lie in the
    /// shape, clipped to the array.
    pub fn bounding_region(&self) -> &Region {
        &self.bounds
    }

    /// Occupancy over [`bounding_region`](Self::bounding_region).
    pub fn mask(&self) -> &ArrayD<bool> {
        self.mask.get_or_init(|| match self.ndim() {
            2 => {
                let vertices: Vec<[f64; 2]> =
                    self.vertices().iter().map(|v| [v[0], v[1]]).collect();
                polygon::rasterize(&vertices, &self.bounds)
            }
            _ => polyhedron::rasterize(&self.rays, &self.center, &self.radii, &self.bounds),
        })
    }

    /// Number of pixels in the mask.
    pub fn pixel_count(&self) -> usize {
        self.mask().iter().filter(|&&m| m).count()
    }

    /// Whether a full-array point is covered by the mask.
    pub fn covers(&self, point: &[usize]) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let local: SmallVec<[usize; 4]> = point
            .iter()
            .zip(self.bounds.ranges())
            .map(|(p, r)| p - r.start)
            .collect();
        self.mask().get(local.as_slice()).copied().unwrap_or(false)
    }

    /// Canonical point deciding which tile owns the shape.
    ///
    /// The lexicographically smallest mask point in full-array
    /// coordinates; for an empty mask, `floor(center)` if it lies inside
    /// the array. `None` when neither exists.
    pub fn representative_point(&self) -> Option<Point> {
        let start = self.bounds.start();
        if let Some((ix, _)) = self.mask().indexed_iter().find(|(_, &m)| m) {
            return Some(ix.slice().iter().zip(&start).map(|(i, s)| i + s).collect());
        }
        self.center
            .iter()
            .zip(&self.shape_max)
            .map(|(&c, &n)| {
                let f = c.floor();
                (f >= 0.0 && f < n as f64).then_some(f as usize)
            })
            .collect()
    }

    /// Area (2-D) or volume (3-D) enclosed by the boundary points.
    pub fn measure(&self) -> f64 {
        let v = self.vertices();
        match self.ndim() {
            2 => {
                let n = v.len();
                let twice: f64 = (0..n)
                    .map(|i| {
                        let (a, b) = (&v[i], &v[(i + 1) % n]);
                        a[0] * b[1] - b[0] * a[1]
                    })
                    .sum();
                twice.abs() / 2.0
            }
            _ => self
                .rays
                .faces()
                .iter()
                .map(|f| {
                    let rel = |k: usize| -> [f64; 3] {
                        [
                            v[k][0] - self.center[0],
                            v[k][1] - self.center[1],
                            v[k][2] - self.center[2],
                        ]
                    };
                    let (a, b, c) = (rel(f[0]), rel(f[1]), rel(f[2]));
                    let det = a[0] * (b[1] * c[2] - b[2] * c[1])
                        - a[1] * (b[0] * c[2] - b[2] * c[0])
                        + a[2] * (b[0] * c[1] - b[1] * c[0]);
                    det / 6.0
                })
                .sum::<f64>()
                .abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(center: [f64; 2], r: f64, shape: [usize; 2]) -> StarShape {
        let rays = Arc::new(RayTemplate::polygon(32).unwrap());
        StarShape::new(&center, rays, vec![r; 32], &shape).unwrap()
    }

    #[test]
    fn bounds_are_clipped_to_array() {
        let s = disk([1.5, 18.2], 4.0, [20, 20]);
        let b = s.bounding_region();
        assert_eq!(b.range(0), 0..6);
        assert_eq!(b.range(1), 14..20);
    }

    #[test]
    fn bounds_outside_array_are_empty() {
        let s = disk([-10.0, 5.0], 2.0, [20, 20]);
        assert!(s.bounding_region().is_empty());
        assert_eq!(s.pixel_count(), 0);
        assert_eq!(s.representative_point(), None);
    }

    #[test]
    fn mask_matches_covers() {
        let s = disk([7.3, 9.6], 3.5, [20, 20]);
        let b = s.bounding_region().clone();
        let mut count = 0;
        for y in 0..20 {
            for x in 0..20 {
                if s.covers(&[y, x]) {
                    assert!(b.contains(&[y, x]));
                    count += 1;
                }
            }
        }
        assert_eq!(count, s.pixel_count());
        assert!(s.covers(&[7, 10]));
    }

    #[test]
    fn representative_point_is_first_mask_pixel() {
        let s = disk([10.0, 10.0], 3.0, [30, 30]);
        let rep = s.representative_point().unwrap();
        assert!(s.covers(&rep));
        for y in 0..30 {
            for x in 0..30 {
                if s.covers(&[y, x]) {
                    assert!([y, x].as_slice() >= rep.as_slice());
                }
            }
        }
    }

    #[test]
    fn empty_mask_falls_back_to_center() {
        let s = disk([3.4, 4.6], 0.0, [10, 10]);
        // A degenerate polygon still covers the pixel under its centre
        // only when the centre is integral.
        assert_eq!(s.pixel_count(), 0);
        assert_eq!(s.representative_point().unwrap().as_slice(), &[3, 4]);
    }

    #[test]
    fn invalid_inputs_rejected() {
        let rays = Arc::new(RayTemplate::polygon(8).unwrap());
        assert!(matches!(
            StarShape::new(&[1.0], rays.clone(), vec![1.0; 8], &[5, 5]),
            Err(ShapeError::DimensionMismatch { what: "center", .. })
        ));
        assert!(matches!(
            StarShape::new(&[1.0, 1.0], rays.clone(), vec![1.0; 7], &[5, 5]),
            Err(ShapeError::RadiiMismatch { expected: 8, got: 7 })
        ));
        let mut radii = vec![1.0; 8];
        radii[3] = -0.5;
        assert!(matches!(
            StarShape::new(&[1.0, 1.0], rays.clone(), radii, &[5, 5]),
            Err(ShapeError::NegativeRadius { index: 3, .. })
        ));
        assert!(matches!(
            StarShape::new(&[f64::NAN, 1.0], rays, vec![1.0; 8], &[5, 5]),
            Err(ShapeError::NonFinite { what: "center" })
        ));
    }

    #[test]
    fn polyhedron_mask_contains_center() {
        let rays = Arc::new(RayTemplate::golden_spiral(64, None).unwrap());
        let s = StarShape::new(&[8.0, 8.0, 8.0], rays, vec![4.0; 64], &[16, 16, 16]).unwrap();
        assert!(s.covers(&[8, 8, 8]));
        assert!(s.covers(&[8, 8, 11]));
        assert!(!s.covers(&[8, 8, 13]));
        let volume = s.measure();
        let count = s.pixel_count() as f64;
        assert!((count - volume).abs() / volume < 0.25, "{count} vs {volume}");
    }
}
