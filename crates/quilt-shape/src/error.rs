//! Error types for star-convex shapes.

use std::error::Error;
use std::fmt;

/// Errors arising while building ray templates or shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeError {
    /// Too few rays to enclose an area or volume.
    TooFewRays {
        /// Requested ray count.
        n: usize,
        /// Minimum for the template kind.
        min: usize,
    },
    /// A vector has the wrong number of coordinates.
    DimensionMismatch {
        /// What was being checked (`center`, `shape_max`, ...).
        what: &'static str,
        /// Dimensionality of the ray template.
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// The number of radii does not match the number of rays.
    RadiiMismatch {
        /// Number of rays.
        expected: usize,
        /// Number of radii.
        got: usize,
    },
    /// A coordinate or radius is NaN or infinite.
    NonFinite {
        /// What was being checked.
        what: &'static str,
    },
    /// A radius is negative.
    NegativeRadius {
        /// Ray index.
        index: usize,
        /// The offending radius.
        value: f64,
    },
    /// Anisotropy factors must be positive and finite.
    InvalidAnisotropy {
        /// The supplied factors.
        anisotropy: [f64; 3],
    },
    /// The convex hull of the ray directions could not be built.
    Hull {
        /// Message reported by qhull.
        reason: String,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewRays { n, min } => write!(f, "{n} rays given, need at least {min}"),
            Self::DimensionMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what} has {got} coordinates, expected {expected}"),
            Self::RadiiMismatch { expected, got } => {
                write!(f, "{got} radii given for {expected} rays")
            }
            Self::NonFinite { what } => write!(f, "{what} contains a non-finite value"),
            Self::NegativeRadius { index, value } => {
                write!(f, "radius {index} is negative ({value})")
            }
            Self::InvalidAnisotropy { anisotropy } => {
                write!(f, "anisotropy {anisotropy:?} must be positive and finite")
            }
            Self::Hull { reason } => write!(f, "convex hull of ray directions failed: {reason}"),
        }
    }
}

impl Error for ShapeError {}
