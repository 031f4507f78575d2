//! Polyhedron voxelization.
//!
//! The solid of a star-convex polyhedron is the union, over the template's
//! faces, of the tetrahedra spanned by the centre and the face's three
//! boundary points. A voxel offset `v` from the centre is located in the
//! cone of one face, written as `v = w_a a + w_b b + w_c c` over the face's
//! unit directions, and is inside when `w_a / r_a + w_b / r_b + w_c / r_c
//! <= 1`.

use crate::rays::RayTemplate;
use ndarray::{ArrayD, IxDyn};
use quilt_core::Region;

const INSIDE_EPS: f64 = 1e-9;

/// Whether offset `v` from the centre lies in the solid.
///
/// `hint` is the face to try first and is updated to the face found, which
/// makes scans over neighbouring voxels cheap.
pub fn contains_offset(
    rays: &RayTemplate,
    radii: &[f64],
    v: [f64; 3],
    hint: &mut usize,
) -> bool {
    if v == [0.0, 0.0, 0.0] {
        return true;
    }
    let Some((face, w)) = rays.locate_cone(v, *hint) else {
        return false;
    };
    *hint = face;
    let f = rays.faces()[face];
    let mut t = 0.0;
    for (m, &ray) in f.iter().enumerate() {
        if w[m] <= 0.0 {
            continue;
        }
        let r = radii[ray];
        if r <= 0.0 {
            return false;
        }
        t += w[m] / r;
    }
    t <= 1.0 + INSIDE_EPS
}

/// Occupancy of every voxel of `region` (global coordinates).
pub fn rasterize(
    rays: &RayTemplate,
    center: &[f64],
    radii: &[f64],
    region: &Region,
) -> ArrayD<bool> {
    let start = region.start();
    let mut hint = 0;
    ArrayD::from_shape_fn(IxDyn(&region.shape()), |ix| {
        let v = [
            (start[0] + ix[0]) as f64 - center[0],
            (start[1] + ix[1]) as f64 - center[1],
            (start[2] + ix[2]) as f64 - center[2],
        ];
        contains_offset(rays, radii, v, &mut hint)
    })
}
