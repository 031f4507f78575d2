//! Axis-aligned N-dimensional boxes.

use smallvec::SmallVec;
use std::ops::Range;

/// A half-open axis-aligned box `[start_k, end_k)` per dimension.
///
/// Used for tile read/write regions and for object bounding regions. A
/// region with any `start_k >= end_k` is empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    ranges: SmallVec<[Range<usize>; 4]>,
}

impl Region {
    /// Build a region from per-axis ranges.
    pub fn new<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = Range<usize>>,
    {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    /// The region covering a whole array of the given shape.
    pub fn full(shape: &[usize]) -> Self {
        Self::new(shape.iter().map(|&n| 0..n))
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.ranges.len()
    }

    /// Per-axis ranges.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Range along axis `k`.
    pub fn range(&self, k: usize) -> Range<usize> {
        self.ranges[k].clone()
    }

    /// Lower corner.
    pub fn start(&self) -> SmallVec<[usize; 4]> {
        self.ranges.iter().map(|r| r.start).collect()
    }

    /// Extent per axis (zero for inverted ranges).
    pub fn shape(&self) -> SmallVec<[usize; 4]> {
        self.ranges
            .iter()
            .map(|r| r.end.saturating_sub(r.start))
            .collect()
    }

    /// Number of cells in the region.
    pub fn volume(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the region contains no cells.
    pub fn is_empty(&self) -> bool {
        self.ranges.iter().any(|r| r.start >= r.end)
    }

    /// Whether `point` lies inside the region.
    pub fn contains(&self, point: &[usize]) -> bool {
        point.len() == self.ndim() && self.ranges.iter().zip(point).all(|(r, p)| r.contains(p))
    }

    /// Whether `other` lies entirely inside `self`.
    ///
    /// Empty regions are contained in every region of the same dimension.
    pub fn contains_region(&self, other: &Region) -> bool {
        if other.ndim() != self.ndim() {
            return false;
        }
        other.is_empty()
            || self
                .ranges
                .iter()
                .zip(&other.ranges)
                .all(|(a, b)| a.start <= b.start && b.end <= a.end)
    }

    /// Intersection of two regions, or `None` when they share no cell.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        if other.ndim() != self.ndim() {
            return None;
        }
        let out = Region::new(
            self.ranges
                .iter()
                .zip(&other.ranges)
                .map(|(a, b)| a.start.max(b.start)..a.end.min(b.end)),
        );
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Re-express `self` in the coordinate frame of `outer`.
    ///
    /// `self` must lie inside `outer`; coordinates below `outer`'s start
    /// saturate at zero.
    pub fn relative_to(&self, outer: &Region) -> Region {
        Region::new(
            self.ranges
                .iter()
                .zip(&outer.ranges)
                .map(|(r, o)| r.start.saturating_sub(o.start)..r.end.saturating_sub(o.start)),
        )
    }
}
