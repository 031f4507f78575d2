//! Polygon rasterization.
//!
//! A pixel belongs to a polygon when its centre lies inside or on the
//! boundary. Pixel centres sit at integer coordinates.

use ndarray::{ArrayD, IxDyn};
use quilt_core::Region;

const EDGE_EPS: f64 = 1e-9;

/// Whether `p` lies inside or on the boundary of the closed polygon.
///
/// Uses the even-odd crossing rule with an explicit on-edge test, so
/// the result does not depend on the vertices' winding.
pub fn point_in_polygon(vertices: &[[f64; 2]], p: [f64; 2]) -> bool {
    let n = vertices.len();
    if n == 0 {
        return false;
    }
    let mut inside = false;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if on_segment(a, b, p) {
            return true;
        }
        if (a[0] > p[0]) != (b[0] > p[0]) {
            let x = a[1] + (p[0] - a[0]) * (b[1] - a[1]) / (b[0] - a[0]);
            if p[1] < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    if len2 == 0.0 {
        return ap[0].abs() <= EDGE_EPS && ap[1].abs() <= EDGE_EPS;
    }
    let cross = ab[0] * ap[1] - ab[1] * ap[0];
    if cross.abs() > EDGE_EPS * len2.sqrt() {
        return false;
    }
    let t = (ab[0] * ap[0] + ab[1] * ap[1]) / len2;
    (-EDGE_EPS..=1.0 + EDGE_EPS).contains(&t)
}

/// Occupancy of every pixel of `region` (global coordinates).
pub fn rasterize(vertices: &[[f64; 2]], region: &Region) -> ArrayD<bool> {
    let start = region.start();
    ArrayD::from_shape_fn(IxDyn(&region.shape()), |ix| {
        let p = [(start[0] + ix[0]) as f64, (start[1] + ix[1]) as f64];
        point_in_polygon(vertices, p)
    })
}
