//! Axis tags and axis layouts.
//!
//! An array's layout is described by a string of single-letter tags such
//! as `"YX"`, `"ZYX"` or `"YXC"`. Only the spatial axes (`Z`, `Y`, `X`) are
//! tiled; every other axis is carried at full extent.

use crate::error::ConfigError;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// A single axis tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Sample / batch.
    S,
    /// Time.
    T,
    /// Channel.
    C,
    /// Depth.
    Z,
    /// Rows.
    Y,
    /// Columns.
    X,
}

impl Axis {
    /// Whether the axis is tiled.
    pub fn is_spatial(self) -> bool {
        matches!(self, Self::Z | Self::Y | Self::X)
    }

    /// Parse a single tag, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            'C' => Some(Self::C),
            'Z' => Some(Self::Z),
            'Y' => Some(Self::Y),
            'X' => Some(Self::X),
            _ => None,
        }
    }

    /// The tag letter.
    pub fn as_char(self) -> char {
        match self {
            Self::S => 'S',
            Self::T => 'T',
            Self::C => 'C',
            Self::Z => 'Z',
            Self::Y => 'Y',
            Self::X => 'X',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An ordered, duplicate-free axis layout with at least one spatial axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Axes(SmallVec<[Axis; 4]>);

impl Axes {
    /// Parse an axes string such as `"YXC"`.
    ///
    /// Returns `Err(ConfigError::InvalidAxes)` for empty strings, unknown
    /// letters, repeated axes, or layouts without any spatial axis.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidAxes {
            axes: s.to_string(),
            reason,
        };
        if s.is_empty() {
            return Err(invalid("empty axes string".to_string()));
        }
        let mut tags: SmallVec<[Axis; 4]> = SmallVec::new();
        for c in s.chars() {
            let axis = Axis::from_char(c).ok_or_else(|| invalid(format!("unknown axis '{c}'")))?;
            if tags.contains(&axis) {
                return Err(invalid(format!("axis '{axis}' appears more than once")));
            }
            tags.push(axis);
        }
        if !tags.iter().any(|a| a.is_spatial()) {
            return Err(invalid("no spatial axis (Z, Y or X)".to_string()));
        }
        Ok(Self(tags))
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; an `Axes` value holds at least one axis.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All axes in order.
    pub fn as_slice(&self) -> &[Axis] {
        &self.0
    }

    /// Iterate over the axes in order.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        self.0.iter().copied()
    }

    /// Position of `axis` in the layout.
    pub fn position(&self, axis: Axis) -> Option<usize> {
        self.0.iter().position(|&a| a == axis)
    }

    /// Whether the layout contains `axis`.
    pub fn contains(&self, axis: Axis) -> bool {
        self.0.contains(&axis)
    }

    /// The spatial axes only, in layout order.
    pub fn spatial(&self) -> Axes {
        Axes(self.0.iter().copied().filter(|a| a.is_spatial()).collect())
    }

    /// Number of spatial axes.
    pub fn n_spatial(&self) -> usize {
        self.0.iter().filter(|a| a.is_spatial()).count()
    }

    /// Positions of the spatial axes within the layout.
    pub fn spatial_positions(&self) -> SmallVec<[usize; 4]> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_spatial())
            .map(|(i, _)| i)
            .collect()
    }

    /// Check that an array shape has one extent per axis, none of them zero.
    pub fn check_shape(&self, shape: &[usize]) -> Result<(), ConfigError> {
        if shape.len() != self.len() {
            return Err(ConfigError::ShapeMismatch {
                expected: self.len(),
                got: shape.len(),
            });
        }
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyAxis { axis });
        }
        Ok(())
    }

    /// Extract the extents of the spatial axes from a full array shape.
    pub fn spatial_shape(&self, shape: &[usize]) -> SmallVec<[usize; 4]> {
        self.spatial_positions()
            .into_iter()
            .filter_map(|i| shape.get(i).copied())
            .collect()
    }
}

impl FromStr for Axes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.0 {
            write!(f, "{a}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        let axes = Axes::parse("yxc").unwrap();
        assert_eq!(axes.as_slice(), &[Axis::Y, Axis::X, Axis::C]);
        assert_eq!(axes.to_string(), "YXC");
    }

    #[test]
    fn spatial_filters_channel() {
        let axes: Axes = "CZYX".parse().unwrap();
        assert_eq!(axes.spatial().as_slice(), &[Axis::Z, Axis::Y, Axis::X]);
        assert_eq!(axes.spatial_positions().as_slice(), &[1, 2, 3]);
        assert_eq!(axes.n_spatial(), 3);
        assert_eq!(axes.spatial_shape(&[2, 10, 20, 30]).as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn rejects_bad_layouts() {
        for bad in ["", "YXY", "YQ", "CT"] {
            assert!(
                matches!(Axes::parse(bad), Err(ConfigError::InvalidAxes { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn check_shape_catches_mismatch_and_empty_axes() {
        let axes = Axes::parse("YX").unwrap();
        assert_eq!(
            axes.check_shape(&[4, 5, 6]),
            Err(ConfigError::ShapeMismatch {
                expected: 2,
                got: 3
            })
        );
        assert_eq!(
            axes.check_shape(&[4, 0]),
            Err(ConfigError::EmptyAxis { axis: 1 })
        );
        assert!(axes.check_shape(&[4, 5]).is_ok());
    }
}
