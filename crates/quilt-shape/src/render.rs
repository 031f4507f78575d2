//! Painting shapes into label arrays.
//!
//! Shapes are painted in [`paint_order`]: ascending score, then centre,
//! then radii. Later shapes overwrite earlier ones where they overlap, so
//! the higher-scoring object wins. The order depends only on geometry
//! and score, never on ids or on which tile produced a shape, which makes
//! [`render_region`] over a tile's core identical to the same window of
//! [`render_labels`] over the whole array.

use crate::star::StarShape;
use ndarray::{ArrayD, ArrayViewMutD, Axis, IxDyn, Slice, Zip};
use quilt_core::{ObjectId, Region};
use std::cmp::Ordering;

/// Total order in which shapes are painted.
pub fn paint_order(a: &StarShape, b: &StarShape) -> Ordering {
    let score = match (a.score(), b.score()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    };
    score
        .then_with(|| lexicographic(a.center(), b.center()))
        .then_with(|| lexicographic(a.radii(), b.radii()))
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Paint one shape's mask into `out`, which covers `region`.
pub fn paint(
    out: &mut ArrayViewMutD<'_, u32>,
    region: &Region,
    id: ObjectId,
    shape: &StarShape,
) {
    let bounds = shape.bounding_region();
    let Some(common) = bounds.intersect(region) else {
        return;
    };
    let mut mask = shape.mask().view();
    for (k, r) in common.relative_to(bounds).ranges().iter().enumerate() {
        mask.slice_axis_inplace(Axis(k), Slice::from(r.clone()));
    }
    let mut target = out.view_mut();
    for (k, r) in common.relative_to(region).ranges().iter().enumerate() {
        target.slice_axis_inplace(Axis(k), Slice::from(r.clone()));
    }
    Zip::from(target).and(mask).for_each(|t, &m| {
        if m {
            *t = id.0;
        }
    });
}

/// Render labelled shapes into an array covering `region`.
///
/// Pixels outside every mask are 0.
pub fn render_region<'a, I>(region: &Region, objects: I) -> ArrayD<u32>
where
    I: IntoIterator<Item = (ObjectId, &'a StarShape)>,
{
    let mut objects: Vec<(ObjectId, &StarShape)> = objects.into_iter().collect();
    objects.sort_by(|a, b| paint_order(a.1, b.1).then(a.0.cmp(&b.0)));
    let mut out = ArrayD::<u32>::zeros(IxDyn(&region.shape()));
    let mut view = out.view_mut();
    for (id, shape) in objects {
        paint(&mut view, region, id, shape);
    }
    out
}

/// Render labelled shapes into a full array of spatial extent `shape`.
pub fn render_labels<'a, I>(shape: &[usize], objects: I) -> ArrayD<u32>
where
    I: IntoIterator<Item = (ObjectId, &'a StarShape)>,
{
    render_region(&Region::full(shape), objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rays::RayTemplate;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn disk(rays: &Arc<RayTemplate>, c: [f64; 2], r: f64, score: f32) -> StarShape {
        StarShape::new(&c, rays.clone(), vec![r; rays.len()], &[40, 40])
            .unwrap()
            .with_score(score)
    }

    #[test]
    fn higher_score_wins_overlap() {
        let rays = Arc::new(RayTemplate::polygon(24).unwrap());
        let low = disk(&rays, [10.0, 10.0], 6.0, 0.3);
        let high = disk(&rays, [10.0, 14.0], 6.0, 0.9);
        let labels = render_labels(&[40, 40], [(ObjectId(1), &high), (ObjectId(2), &low)]);
        assert_eq!(labels[[10, 12].as_slice()], 1);
        assert_eq!(labels[[10, 6].as_slice()], 2);
        assert_eq!(labels[[30, 30].as_slice()], 0);
    }

    #[test]
    fn region_render_matches_full_render_window() {
        let rays = Arc::new(RayTemplate::polygon(24).unwrap());
        let shapes = [
            disk(&rays, [8.0, 8.0], 5.0, 0.5),
            disk(&rays, [12.5, 17.0], 7.0, 0.7),
            disk(&rays, [30.0, 25.0], 4.0, 0.1),
        ];
        let labelled: Vec<_> = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (ObjectId(i as u32 + 1), s))
            .collect();
        let full = render_labels(&[40, 40], labelled.iter().copied());
        let region = Region::new([5..27, 11..33]);
        let part = render_region(&region, labelled.iter().copied());
        let mut window = full.view();
        for (k, r) in region.ranges().iter().enumerate() {
            window.slice_axis_inplace(Axis(k), Slice::from(r.clone()));
        }
        assert_eq!(part, window);
    }

    #[test]
    fn unscored_shapes_paint_first() {
        let rays = Arc::new(RayTemplate::polygon(8).unwrap());
        let scored = disk(&rays, [5.0, 5.0], 1.0, 0.0);
        let unscored = StarShape::new(&[5.0, 5.0], rays, vec![1.0; 8], &[40, 40]).unwrap();
        assert_eq!(paint_order(&unscored, &scored), Ordering::Less);
        assert_eq!(paint_order(&scored, &scored), Ordering::Equal);
    }

    fn window(full: &ArrayD<u32>, region: &Region) -> ArrayD<u32> {
        let mut view = full.view();
        for (k, r) in region.ranges().iter().enumerate() {
            view.slice_axis_inplace(Axis(k), Slice::from(r.clone()));
        }
        view.to_owned()
    }

    proptest! {
        #[test]
        fn any_window_renders_like_the_full_array(
            objects in prop::collection::vec(
                (0.0f64..48.0, 0.0f64..40.0, prop::collection::vec(0.5f64..9.0, 12), 0u8..4),
                1..8,
            ),
            y in (0usize..48).prop_flat_map(|a| (Just(a), a + 1..=48)),
            x in (0usize..40).prop_flat_map(|a| (Just(a), a + 1..=40)),
        ) {
            let rays = Arc::new(RayTemplate::polygon(12).unwrap());
            // Few distinct scores so that ties fall through to geometry.
            let shapes: Vec<StarShape> = objects
                .into_iter()
                .map(|(cy, cx, radii, s)| {
                    StarShape::new(&[cy, cx], rays.clone(), radii, &[48, 40])
                        .unwrap()
                        .with_score(f32::from(s) / 4.0)
                })
                .collect();
            let labelled: Vec<_> = shapes
                .iter()
                .enumerate()
                .map(|(i, s)| (ObjectId(i as u32 + 1), s))
                .collect();
            let full = render_labels(&[48, 40], labelled.iter().copied());
            let region = Region::new([y.0..y.1, x.0..x.1]);
            // Objects given in reverse must not change the result.
            let part = render_region(&region, labelled.iter().rev().copied());
            prop_assert_eq!(part, window(&full, &region));
        }
    }
}
