//! Convex hull of ray directions on the unit sphere, via qhull.

use crate::error::ShapeError;
use qhull_enhanced::Qh;

pub(crate) type Vec3 = [f64; 3];

pub(crate) fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Inverse of the matrix whose columns are `a`, `b`, `c`.
///
/// `None` if the columns are (nearly) coplanar.
pub(crate) fn inverse_columns(a: Vec3, b: Vec3, c: Vec3) -> Option<[Vec3; 3]> {
    let det = dot(a, cross(b, c));
    if det.abs() < 1e-12 {
        return None;
    }
    // Rows of the inverse are the cross products of column pairs.
    let r0 = cross(b, c);
    let r1 = cross(c, a);
    let r2 = cross(a, b);
    let s = 1.0 / det;
    Some([
        [r0[0] * s, r0[1] * s, r0[2] * s],
        [r1[0] * s, r1[1] * s, r1[2] * s],
        [r2[0] * s, r2[1] * s, r2[2] * s],
    ])
}

/// Triangular facets of the convex hull of `points`, wound
/// counter-clockwise when viewed from outside.
///
/// The points must surround the origin, as unit directions do.
pub(crate) fn sphere_facets(points: &[Vec3]) -> Result<Vec<[usize; 3]>, ShapeError> {
    // Every direction lies on the hull and they are spread evenly.
    let qh = Qh::builder()
        .compute(true)
        .triangulate(true)
        .no_near_inside(true)
        .no_narrow(true)
        .build_from_iter(points.iter().copied())
        .map_err(|e| ShapeError::Hull {
            reason: e.to_string(),
        })?;

    let mut facets = Vec::new();
    for simplex in qh.simplices() {
        let set = simplex.vertices().ok_or_else(|| ShapeError::Hull {
            reason: "facet without vertices".into(),
        })?;
        let idx = set
            .iter()
            .map(|v| v.index(&qh))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| ShapeError::Hull {
                reason: "vertex outside the input".into(),
            })?;
        let &[i, j, k] = idx.as_slice() else {
            continue;
        };
        let (a, b, c) = (points[i], points[j], points[k]);
        if dot(cross(sub(b, a), sub(c, a)), a) < 0.0 {
            facets.push([i, k, j]);
        } else {
            facets.push([i, j, k]);
        }
    }
    Ok(facets)
}
