//! Ray templates: the fixed set of unit directions shared by all shapes.
//!
//! - [`RayTemplate::polygon`]: `n` rays evenly spaced in angle, in
//!   `(y, x)` order.
//! - [`RayTemplate::golden_spiral`]: `n` rays on the golden spiral, in
//!   `(z, y, x)` order, with triangular faces from the convex hull of the
//!   isotropic directions.

use crate::error::ShapeError;
use crate::hull::{inverse_columns, sphere_facets, Vec3};
use log::debug;
use smallvec::SmallVec;
use std::f64::consts::PI;

/// Tolerance for cone membership of a direction.
const CONE_EPS: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
enum Kind {
    Planar(Vec<[f64; 2]>),
    Spherical {
        dirs: Vec<Vec3>,
        faces: Vec<[usize; 3]>,
        /// Per face: inverse of the matrix with the face's ray directions
        /// as columns.
        cones: Vec<[Vec3; 3]>,
    },
}

/// A fixed set of ray directions.
#[derive(Clone, Debug, PartialEq)]
pub struct RayTemplate {
    kind: Kind,
}

impl RayTemplate {
    /// `n >= 3` rays at angles `2πk/n`, direction `(sin φ, cos φ)`.
    pub fn polygon(n: usize) -> Result<Self, ShapeError> {
        if n < 3 {
            return Err(ShapeError::TooFewRays { n, min: 3 });
        }
        let dirs = (0..n)
            .map(|k| {
                let phi = 2.0 * PI * k as f64 / n as f64;
                [phi.sin(), phi.cos()]
            })
            .collect();
        Ok(Self {
            kind: Kind::Planar(dirs),
        })
    }

    /// `n >= 4` rays on the golden spiral, optionally compressed by
    /// per-axis `anisotropy` factors `(z, y, x)`.
    ///
    /// Faces are the convex hull of the isotropic directions; anisotropic
    /// directions are `d / anisotropy`, renormalized.
    pub fn golden_spiral(n: usize, anisotropy: Option<[f64; 3]>) -> Result<Self, ShapeError> {
        if n < 4 {
            return Err(ShapeError::TooFewRays { n, min: 4 });
        }
        if let Some(a) = anisotropy {
            if a.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(ShapeError::InvalidAnisotropy { anisotropy: a });
            }
        }
        let g = (3.0 - 5.0f64.sqrt()) * PI;
        let isotropic: Vec<Vec3> = (0..n)
            .map(|k| {
                let phi = g * k as f64;
                let z = -1.0 + (2 * k + 1) as f64 / n as f64;
                let rho = (1.0 - z * z).max(0.0).sqrt();
                [z, rho * phi.sin(), rho * phi.cos()]
            })
            .collect();
        let faces = sphere_facets(&isotropic)?;
        let dirs: Vec<Vec3> = match anisotropy {
            None => isotropic,
            Some(a) => isotropic
                .iter()
                .map(|d| {
                    let v = [d[0] / a[0], d[1] / a[1], d[2] / a[2]];
                    let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
                    [v[0] / norm, v[1] / norm, v[2] / norm]
                })
                .collect(),
        };
        let (faces, cones): (Vec<_>, Vec<_>) = faces
            .into_iter()
            .filter_map(|f| {
                inverse_columns(dirs[f[0]], dirs[f[1]], dirs[f[2]]).map(|inv| (f, inv))
            })
            .unzip();
        debug!("golden spiral with {n} rays has {} faces", faces.len());
        Ok(Self {
            kind: Kind::Spherical { dirs, faces, cones },
        })
    }

    /// Number of spatial dimensions (2 or 3).
    pub fn ndim(&self) -> usize {
        match &self.kind {
            Kind::Planar(_) => 2,
            Kind::Spherical { .. } => 3,
        }
    }

    /// Number of rays.
    pub fn len(&self) -> usize {
        match &self.kind {
            Kind::Planar(d) => d.len(),
            Kind::Spherical { dirs, .. } => dirs.len(),
        }
    }

    /// Always `false`; templates hold at least three rays.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unit direction of ray `k`.
    pub fn direction(&self, k: usize) -> SmallVec<[f64; 3]> {
        match &self.kind {
            Kind::Planar(d) => SmallVec::from_slice(&d[k]),
            Kind::Spherical { dirs, .. } => SmallVec::from_slice(&dirs[k]),
        }
    }

    /// Triangular faces over ray indices (empty for polygon templates).
    pub fn faces(&self) -> &[[usize; 3]] {
        match &self.kind {
            Kind::Planar(_) => &[],
            Kind::Spherical { faces, .. } => faces,
        }
    }

    /// Find a face whose cone contains direction `v`, starting the search
    /// at face `hint`.
    ///
    /// Returns the face index and the coefficients of `v` in the basis of
    /// that face's three ray directions (all non-negative up to rounding).
    pub(crate) fn locate_cone(&self, v: Vec3, hint: usize) -> Option<(usize, Vec3)> {
        let Kind::Spherical { cones, .. } = &self.kind else {
            return None;
        };
        let n = cones.len();
        (0..n).map(|i| (i + hint) % n).find_map(|i| {
            let m = &cones[i];
            let w = [
                m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
                m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
                m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
            ];
            let scale = v[0].abs().max(v[1].abs()).max(v[2].abs());
            w.iter()
                .all(|&c| c >= -CONE_EPS * scale)
                .then_some((i, w))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_rays_start_along_x() {
        let rays = RayTemplate::polygon(4).unwrap();
        assert_eq!(rays.ndim(), 2);
        let d0 = rays.direction(0);
        assert!((d0[0] - 0.0).abs() < 1e-12 && (d0[1] - 1.0).abs() < 1e-12);
        let d1 = rays.direction(1);
        assert!((d1[0] - 1.0).abs() < 1e-12 && d1[1].abs() < 1e-12);
    }

    #[test]
    fn too_few_rays_rejected() {
        assert_eq!(
            RayTemplate::polygon(2),
            Err(ShapeError::TooFewRays { n: 2, min: 3 })
        );
        assert_eq!(
            RayTemplate::golden_spiral(3, None),
            Err(ShapeError::TooFewRays { n: 3, min: 4 })
        );
        assert!(matches!(
            RayTemplate::golden_spiral(32, Some([1.0, 0.0, 1.0])),
            Err(ShapeError::InvalidAnisotropy { .. })
        ));
    }

    #[test]
    fn spiral_directions_are_unit() {
        for aniso in [None, Some([2.0, 1.0, 1.0])] {
            let rays = RayTemplate::golden_spiral(48, aniso).unwrap();
            for k in 0..rays.len() {
                let d = rays.direction(k);
                let norm: f64 = d.iter().map(|v| v * v).sum::<f64>().sqrt();
                assert!((norm - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn cones_cover_the_sphere() {
        let rays = RayTemplate::golden_spiral(64, None).unwrap();
        assert!(rays.faces().len() >= 2 * 64 - 4);
        // Deterministic sweep of directions.
        for i in 0..40 {
            for j in 0..80 {
                let theta = PI * (i as f64 + 0.5) / 40.0;
                let phi = 2.0 * PI * j as f64 / 80.0;
                let v = [theta.cos(), theta.sin() * phi.sin(), theta.sin() * phi.cos()];
                assert!(
                    rays.locate_cone(v, 0).is_some(),
                    "direction {v:?} is in no cone"
                );
            }
        }
    }

    #[test]
    fn every_ray_is_a_face_vertex() {
        let rays = RayTemplate::golden_spiral(32, None).unwrap();
        for k in 0..rays.len() {
            assert!(rays.faces().iter().any(|f| f.contains(&k)), "ray {k} unused");
        }
    }
}
