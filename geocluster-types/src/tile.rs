use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a square map tile in the `z/x/y` scheme.
///
/// Tile `(0, 0)` is the north-west corner of the world; at zoom `z` the grid
/// has `2^z` tiles per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Highest zoom whose grid still fits `u32` tile coordinates.
    pub const MAX_ZOOM: u8 = 31;

    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles per side at this zoom.
    pub fn grid_size(&self) -> u64 {
        1u64 << self.z.min(Self::MAX_ZOOM)
    }

    /// Whether `x` and `y` fall inside the grid for `z`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::TileCoord;
    ///
    /// assert!(TileCoord::new(1, 1, 1).is_valid());
    /// assert!(!TileCoord::new(1, 2, 0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        self.z <= Self::MAX_ZOOM
            && u64::from(self.x) < self.grid_size()
            && u64::from(self.y) < self.grid_size()
    }

    /// Whether the tile touches the western edge of the world.
    pub fn is_west_edge(&self) -> bool {
        self.x == 0
    }

    /// Whether the tile touches the eastern edge of the world.
    pub fn is_east_edge(&self) -> bool {
        u64::from(self.x) + 1 == self.grid_size()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_tile_touches_both_edges() {
        let tile = TileCoord::new(0, 0, 0);
        assert!(tile.is_valid());
        assert!(tile.is_west_edge());
        assert!(tile.is_east_edge());
        assert_eq!(tile.grid_size(), 1);
    }

    #[test]
    fn test_out_of_grid_tiles_are_invalid() {
        assert!(!TileCoord::new(2, 4, 0).is_valid());
        assert!(!TileCoord::new(2, 0, 4).is_valid());
        assert!(TileCoord::new(2, 3, 3).is_valid());
        assert!(TileCoord::new(2, 3, 3).is_east_edge());
    }

    #[test]
    fn test_display() {
        assert_eq!(TileCoord::new(5, 10, 12).to_string(), "5/10/12");
    }
}
