//! Object identifiers and the [`Point`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Integer pixel/voxel position over the spatial axes.
///
/// Uses `SmallVec<[usize; 4]>` to avoid heap allocation for arrays of
/// up to four spatial dimensions.
pub type Point = SmallVec<[usize; 4]>;

/// Label value of an object in a stitched label image.
///
/// `0` is background and is never assigned to an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The background label.
    pub const BACKGROUND: ObjectId = ObjectId(0);

    /// Whether this is the background label.
    pub fn is_background(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
