//! The ownership rule and the global object registry.
//!
//! Every object is kept by exactly one tile: the one whose core contains
//! its [representative point](quilt_shape::StarShape::representative_point).
//! Cores partition the array, so the rule needs no communication between
//! tiles. An owned object must lie entirely inside its owner's read
//! region; if it does not, the context is too small and the run fails.
//! A tile that drops an object checks this for the owner as well, so an
//! object the owner cannot see is an error, never a gap.

use crate::error::StitchError;
use crate::ids::IdScheme;
use indexmap::IndexMap;
use log::trace;
use ndarray::{ArrayD, ArrayViewD};
use quilt_core::{ConfigError, ObjectId, Point, Region};
use quilt_cover::{AxisBlock, BlockGrid, Tile};
use quilt_shape::{render_labels, render_region, StarShape};
use smallvec::SmallVec;

/// An object kept by its owning tile, with its global id.
#[derive(Clone, Debug)]
pub struct Accepted {
    /// Globally unique id.
    pub id: ObjectId,
    /// Shape in full-array coordinates.
    pub shape: StarShape,
}

// ── Stitcher ───────────────────────────────────────────────────────

/// Applies the ownership rule for one [`BlockGrid`].
#[derive(Clone, Debug)]
pub struct Stitcher {
    ids: IdScheme,
    per_axis: Vec<Vec<AxisBlock>>,
}

impl Stitcher {
    /// Stitcher for `grid` with at most `max_objects_per_tile` per tile.
    pub fn new(grid: &BlockGrid, max_objects_per_tile: u32) -> Result<Self, ConfigError> {
        let n_spatial = grid.spatial_shape().len();
        Ok(Self {
            ids: IdScheme::new(grid.len(), max_objects_per_tile)?,
            per_axis: (0..n_spatial).map(|k| grid.axis_blocks(k).to_vec()).collect(),
        })
    }

    /// Flat index and read region of the tile whose core holds `point`.
    fn owner(&self, point: &[usize]) -> Option<(usize, Region)> {
        let mut flat = 0;
        let mut read = Vec::with_capacity(point.len());
        for (&p, blocks) in point.iter().zip(&self.per_axis) {
            let i = blocks.partition_point(|b| b.write().end <= p);
            read.push(blocks.get(i)?.read());
            flat = flat * blocks.len() + i;
        }
        Some((flat, Region::new(read)))
    }

    /// The id scheme in use.
    pub fn ids(&self) -> &IdScheme {
        &self.ids
    }

    /// Keep the shapes `tile` owns and give them global ids.
    ///
    /// Shapes are in full-array coordinates; local ids follow input order.
    pub fn filter(
        &self,
        tile: &Tile,
        shapes: Vec<StarShape>,
    ) -> Result<Vec<Accepted>, StitchError> {
        let flat = tile.flat_index();
        let write = tile.write_region();
        let read = tile.read_region();
        let mut accepted = Vec::new();
        for shape in shapes {
            if shape.ndim() != self.per_axis.len() {
                return Err(StitchError::DimensionMismatch {
                    expected: self.per_axis.len(),
                    got: shape.ndim(),
                });
            }
            let Some(rep) = shape.representative_point() else {
                return Err(StitchError::Unresolved {
                    tile: flat,
                    center: SmallVec::from_slice(shape.center()),
                });
            };
            if !write.contains(&rep) {
                let Some((owner, owner_read)) = self.owner(&rep) else {
                    return Err(StitchError::Unresolved {
                        tile: flat,
                        center: SmallVec::from_slice(shape.center()),
                    });
                };
                if !owner_read.contains_region(shape.bounding_region()) {
                    return Err(StitchError::NotFullyVisible {
                        tile: owner,
                        bounds: shape.bounding_region().clone(),
                        read: owner_read,
                    });
                }
                trace!("tile {flat}: object at {rep:?} belongs to tile {owner}");
                continue;
            }
            if !read.contains_region(shape.bounding_region()) {
                return Err(StitchError::NotFullyVisible {
                    tile: flat,
                    bounds: shape.bounding_region().clone(),
                    read,
                });
            }
            let local = u32::try_from(accepted.len() + 1).unwrap_or(u32::MAX);
            let id = self
                .ids
                .id(flat, local)
                .ok_or(StitchError::TooManyObjects {
                    tile: flat,
                    max: self.ids.max_per_tile(),
                })?;
            accepted.push(Accepted { id, shape });
        }
        trace!("tile {flat}: kept {} objects", accepted.len());
        Ok(accepted)
    }

    /// The geometry-free rule: a cropped label patch is kept as is.
    ///
    /// `cropped` is laid out like the covered array. Fails if it does not
    /// have the tile's core extent.
    pub fn filter_labels(
        &self,
        tile: &Tile,
        cropped: ArrayViewD<'_, u32>,
    ) -> Result<ArrayD<u32>, StitchError> {
        let expected: Vec<usize> = tile.crop_slice().iter().map(|r| r.len()).collect();
        if cropped.shape() != expected.as_slice() {
            return Err(StitchError::LabelShape {
                tile: tile.flat_index(),
                expected,
                got: cropped.shape().to_vec(),
            });
        }
        Ok(cropped.to_owned())
    }
}

// ── StitchedObjects ────────────────────────────────────────────────

/// Global registry of accepted objects, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct StitchedObjects {
    objects: IndexMap<ObjectId, StarShape>,
}

impl StitchedObjects {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile's accepted objects. Duplicate ids are an error and leave
    /// the registry unchanged.
    pub fn merge(&mut self, accepted: Vec<Accepted>) -> Result<(), StitchError> {
        if let Some(dup) = accepted
            .iter()
            .enumerate()
            .find(|(i, a)| {
                self.objects.contains_key(&a.id) || accepted[..*i].iter().any(|b| b.id == a.id)
            })
            .map(|(_, a)| a.id)
        {
            return Err(StitchError::DuplicateId { id: dup });
        }
        self.objects
            .extend(accepted.into_iter().map(|a| (a.id, a.shape)));
        Ok(())
    }

    /// Sort entries by id.
    pub fn sort(&mut self) {
        self.objects.sort_keys();
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object was accepted.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Shape registered under `id`.
    pub fn get(&self, id: ObjectId) -> Option<&StarShape> {
        self.objects.get(&id)
    }

    /// All objects in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &StarShape)> + '_ {
        self.objects.iter().map(|(&id, s)| (id, s))
    }

    /// Objects whose bounding region meets `region`.
    pub fn overlapping<'a>(
        &'a self,
        region: &'a Region,
    ) -> impl Iterator<Item = (ObjectId, &'a StarShape)> + 'a {
        self.iter()
            .filter(move |(_, s)| s.bounding_region().intersect(region).is_some())
    }

    /// Core-sized label patch for `tile`.
    pub fn render_tile(&self, tile: &Tile) -> ArrayD<u32> {
        let core = tile.write_region();
        render_region(&core, self.overlapping(&core))
    }

    /// Label image of spatial extent `shape`.
    pub fn render(&self, shape: &[usize]) -> ArrayD<u32> {
        render_labels(shape, self.iter())
    }

    /// Representative point of every object, in registry order.
    pub fn representative_points(&self) -> Vec<(ObjectId, Option<Point>)> {
        self.iter()
            .map(|(id, s)| (id, s.representative_point()))
            .collect()
    }
}
