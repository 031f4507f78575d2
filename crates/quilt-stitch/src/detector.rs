//! The detection model interface.
//!
//! A [`Detector`] turns one image patch into a label patch plus a list of
//! fixed-field [`Detection`] records. Detection coordinates are local to
//! the patch; [`Detection::to_shape`] moves them into the full array.

use ndarray::{ArrayD, ArrayViewD};
use quilt_core::Axes;
use quilt_shape::{RayTemplate, ShapeError, StarShape};
use smallvec::SmallVec;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// One detected object, in patch-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Centre over the spatial axes.
    pub center: SmallVec<[f64; 3]>,
    /// One radius per ray of the detector's template.
    pub radii: Vec<f64>,
    /// Model confidence.
    pub score: f32,
}

impl Detection {
    /// Build a record.
    pub fn new(center: &[f64], radii: Vec<f64>, score: f32) -> Self {
        Self {
            center: SmallVec::from_slice(center),
            radii,
            score,
        }
    }

    /// Record describing a full-array shape.
    pub fn from_shape(shape: &StarShape) -> Self {
        Self {
            center: SmallVec::from_slice(shape.center()),
            radii: shape.radii().to_vec(),
            score: shape.score().unwrap_or(0.0),
        }
    }

    /// Validate and translate by `origin` into a full-array shape.
    pub fn to_shape(
        &self,
        rays: &Arc<RayTemplate>,
        origin: &[usize],
        shape_max: &[usize],
    ) -> Result<StarShape, ShapeError> {
        if origin.len() != self.center.len() {
            return Err(ShapeError::DimensionMismatch {
                what: "origin",
                expected: self.center.len(),
                got: origin.len(),
            });
        }
        let center: SmallVec<[f64; 3]> = self
            .center
            .iter()
            .zip(origin)
            .map(|(&c, &o)| c + o as f64)
            .collect();
        let shape = StarShape::new(&center, Arc::clone(rays), self.radii.clone(), shape_max)?;
        Ok(shape.with_score(self.score))
    }
}

/// Output of one detector call.
#[derive(Clone, Debug)]
pub struct Prediction {
    /// The detector's own label image for the patch, over the spatial
    /// axes, with the patch's spatial extent.
    pub labels: ArrayD<u32>,
    /// Detected objects in patch coordinates.
    pub detections: Vec<Detection>,
}

/// A detector failed on a patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectError {
    /// What went wrong.
    pub reason: String,
}

impl DetectError {
    /// Error with a message.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "detection failed: {}", self.reason)
    }
}

impl Error for DetectError {}

/// A detection model.
///
/// Called concurrently from several worker threads, one patch per call.
pub trait Detector: Sync {
    /// Ray template shared by all of this detector's shapes.
    fn rays(&self) -> &Arc<RayTemplate>;

    /// Detect objects in one patch laid out as `axes`.
    fn predict(&self, patch: ArrayViewD<'_, f32>, axes: &Axes) -> Result<Prediction, DetectError>;
}
