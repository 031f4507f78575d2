//! Globally unique object ids from per-tile counters.
//!
//! Tile `t` hands out ids `t * max_per_tile + 1 ..= (t + 1) * max_per_tile`.
//! Workers therefore never coordinate to stay unique, and an id maps back
//! to the tile that produced it.

use quilt_core::{ConfigError, ObjectId};

/// Offset scheme mapping `(tile, local id)` to an [`ObjectId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdScheme {
    n_tiles: usize,
    max_per_tile: u32,
}

impl IdScheme {
    /// Scheme for `n_tiles` tiles of at most `max_per_tile` objects each.
    ///
    /// Fails if the largest id would not fit into `u32`.
    pub fn new(n_tiles: usize, max_per_tile: u32) -> Result<Self, ConfigError> {
        if max_per_tile == 0 {
            return Err(ConfigError::ZeroObjectsPerTile);
        }
        let largest = (n_tiles as u128) * u128::from(max_per_tile);
        if largest > u128::from(u32::MAX) {
            return Err(ConfigError::IdSpaceOverflow {
                tiles: n_tiles,
                max_per_tile,
            });
        }
        Ok(Self {
            n_tiles,
            max_per_tile,
        })
    }

    /// Number of tiles covered.
    pub fn n_tiles(&self) -> usize {
        self.n_tiles
    }

    /// Per-tile id budget.
    pub fn max_per_tile(&self) -> u32 {
        self.max_per_tile
    }

    /// Global id of the `local`-th object (1-based) of `tile`.
    ///
    /// `None` if either index is out of range.
    pub fn id(&self, tile: usize, local: u32) -> Option<ObjectId> {
        if tile >= self.n_tiles || local == 0 || local > self.max_per_tile {
            return None;
        }
        // Cannot overflow: checked against the largest id in `new`.
        Some(ObjectId(tile as u32 * self.max_per_tile + local))
    }

    /// Tile that produced `id`, or `None` for background and foreign ids.
    pub fn tile_of(&self, id: ObjectId) -> Option<usize> {
        if id.is_background() {
            return None;
        }
        let tile = ((id.0 - 1) / self.max_per_tile) as usize;
        (tile < self.n_tiles).then_some(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ids_are_offset_per_tile() {
        let ids = IdScheme::new(4, 100).unwrap();
        assert_eq!(ids.id(0, 1), Some(ObjectId(1)));
        assert_eq!(ids.id(2, 7), Some(ObjectId(207)));
        assert_eq!(ids.id(3, 100), Some(ObjectId(400)));
        assert_eq!(ids.id(4, 1), None);
        assert_eq!(ids.id(0, 0), None);
        assert_eq!(ids.id(0, 101), None);
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(IdScheme::new(5, 0), Err(ConfigError::ZeroObjectsPerTile));
        assert!(IdScheme::new(65_535, 65_536).is_ok());
        assert_eq!(
            IdScheme::new(65_536, 65_536),
            Err(ConfigError::IdSpaceOverflow {
                tiles: 65_536,
                max_per_tile: 65_536
            })
        );
    }

    #[test]
    fn background_has_no_tile() {
        let ids = IdScheme::new(2, 10).unwrap();
        assert_eq!(ids.tile_of(ObjectId::BACKGROUND), None);
        assert_eq!(ids.tile_of(ObjectId(21)), None);
    }

    proptest! {
        #[test]
        fn tile_of_inverts_id(
            n_tiles in 1usize..500,
            max in 1u32..5000,
            t in 0usize..500,
            l in 1u32..5000,
        ) {
            prop_assume!(t < n_tiles && l <= max);
            let ids = IdScheme::new(n_tiles, max).unwrap();
            let id = ids.id(t, l).unwrap();
            prop_assert_eq!(ids.tile_of(id), Some(t));
        }
    }
}
