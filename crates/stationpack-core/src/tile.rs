//! Tile coordinates, axes, directions, slopes and rectangular tile areas.
//!
//! The map grid itself is an external collaborator; this module only holds
//! the value types the engine passes around when talking to it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A tile position on the map. X grows towards the south-west, Y towards
/// the south-east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a delta.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset this position by a `(dx, dy)` pair.
    pub fn add(self, delta: (i32, i32)) -> Self {
        self.offset(delta.0, delta.1)
    }

    /// Offset this position by the negation of a `(dx, dy)` pair.
    pub fn sub(self, delta: (i32, i32)) -> Self {
        self.offset(-delta.0, -delta.1)
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &TilePos) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

// ---------------------------------------------------------------------------
// Axes and directions
// ---------------------------------------------------------------------------

/// Axis of a rail station tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Unit step along this axis.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Axis::X => (1, 0),
            Axis::Y => (0, 1),
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// The eight compass directions, numbered as the pack format expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N = 0,
    NE = 1,
    E = 2,
    SE = 3,
    S = 4,
    SW = 5,
    W = 6,
    NW = 7,
}

impl Direction {
    /// Tile offset for one step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (-1, -1),
            Direction::NE => (-1, 0),
            Direction::E => (-1, 1),
            Direction::SE => (0, 1),
            Direction::S => (1, 1),
            Direction::SW => (1, 0),
            Direction::W => (1, -1),
            Direction::NW => (0, -1),
        }
    }
}

/// The four diagonal (edge-crossing) directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagDirection {
    NE = 0,
    SE = 1,
    SW = 2,
    NW = 3,
}

impl DiagDirection {
    pub fn offset(self) -> (i32, i32) {
        match self {
            DiagDirection::NE => (-1, 0),
            DiagDirection::SE => (0, 1),
            DiagDirection::SW => (1, 0),
            DiagDirection::NW => (0, -1),
        }
    }
}

// ---------------------------------------------------------------------------
// Slopes
// ---------------------------------------------------------------------------

/// Raised-corner bitmask of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Slope(pub u8);

impl Slope {
    pub const FLAT: Slope = Slope(0x00);
    pub const CORNER_W: u8 = 0x01;
    pub const CORNER_S: u8 = 0x02;
    pub const CORNER_E: u8 = 0x04;
    pub const CORNER_N: u8 = 0x08;
    pub const STEEP: u8 = 0x10;
    /// West and east corners raised.
    pub const EW: u8 = Self::CORNER_W | Self::CORNER_E;

    pub fn has_corner(self, corner: u8) -> bool {
        self.0 & corner != 0
    }

    /// Mirror correction for Y-axis platforms: when exactly one of the west
    /// and east corners is raised, those two corners are swapped so packs see
    /// the slope in platform-relative orientation.
    pub fn axis_corrected(self, axis: Axis) -> Slope {
        if axis == Axis::Y && self.has_corner(Self::CORNER_W) != self.has_corner(Self::CORNER_E) {
            Slope(self.0 ^ Self::EW)
        } else {
            self
        }
    }
}

// ---------------------------------------------------------------------------
// TileArea
// ---------------------------------------------------------------------------

/// A rectangle of tiles. Origin is the north corner (minimum x and y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileArea {
    pub origin: TilePos,
    pub width: u32,
    pub height: u32,
}

impl TileArea {
    pub fn new(origin: TilePos, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// The 1x1 area at a tile.
    pub fn single(tile: TilePos) -> Self {
        Self::new(tile, 1, 1)
    }

    /// The smallest area covering both corners (inclusive).
    pub fn spanning(a: TilePos, b: TilePos) -> Self {
        let origin = TilePos::new(a.x.min(b.x), a.y.min(b.y));
        let width = (a.x - b.x).unsigned_abs() + 1;
        let height = (a.y - b.y).unsigned_abs() + 1;
        Self::new(origin, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, tile: TilePos) -> bool {
        let dx = tile.x - self.origin.x;
        let dy = tile.y - self.origin.y;
        dx >= 0 && dy >= 0 && (dx as u32) < self.width && (dy as u32) < self.height
    }

    /// Grow the area so that it also covers `tile`.
    pub fn extend(&mut self, tile: TilePos) {
        if self.is_empty() {
            *self = Self::single(tile);
            return;
        }
        let min_x = self.origin.x.min(tile.x);
        let min_y = self.origin.y.min(tile.y);
        let max_x = (self.origin.x + self.width as i32 - 1).max(tile.x);
        let max_y = (self.origin.y + self.height as i32 - 1).max(tile.y);
        *self = Self::spanning(TilePos::new(min_x, min_y), TilePos::new(max_x, max_y));
    }

    /// Iterate over all tiles of the area, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + use<> {
        let w = self.width as i32;
        let h = self.height as i32;
        let ox = self.origin.x;
        let oy = self.origin.y;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| TilePos::new(ox + dx, oy + dy)))
    }

    pub fn tile_count(&self) -> u32 {
        self.width * self.height
    }
}
