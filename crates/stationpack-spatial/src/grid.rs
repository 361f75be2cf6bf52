//! The map grid collaborator and an in-memory implementation of it.

use serde::{Deserialize, Serialize};
use stationpack_core::id::{PackId, StationId};
use stationpack_core::tile::{Axis, DiagDirection, Slope, TilePos};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Tile contents
// ---------------------------------------------------------------------------

/// Broad tile type, numbered as packs see it in land info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Clear,
    Railway,
    Road,
    House,
    Trees,
    Station,
    Water,
    Void,
    Industry,
    TunnelBridge,
    Object,
}

impl TileKind {
    pub fn code(self) -> u8 {
        match self {
            TileKind::Clear => 0,
            TileKind::Railway => 1,
            TileKind::Road => 2,
            TileKind::House => 3,
            TileKind::Trees => 4,
            TileKind::Station => 5,
            TileKind::Water => 6,
            TileKind::Void => 7,
            TileKind::Industry => 8,
            TileKind::TunnelBridge => 9,
            TileKind::Object => 10,
        }
    }
}

/// Rail track pieces present on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TrackBits(pub u8);

impl TrackBits {
    pub const NONE: TrackBits = TrackBits(0);
    pub const X: TrackBits = TrackBits(0x01);
    pub const Y: TrackBits = TrackBits(0x02);
    pub const UPPER: TrackBits = TrackBits(0x04);
    pub const LOWER: TrackBits = TrackBits(0x08);
    pub const LEFT: TrackBits = TrackBits(0x10);
    pub const RIGHT: TrackBits = TrackBits(0x20);

    pub fn union(self, other: TrackBits) -> TrackBits {
        TrackBits(self.0 | other.0)
    }

    pub fn intersects(self, other: TrackBits) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The straight track along `axis`.
    pub fn for_axis(axis: Axis) -> TrackBits {
        match axis {
            Axis::X => TrackBits::X,
            Axis::Y => TrackBits::Y,
        }
    }

    /// Tracks that can be entered when leaving a tile towards `dir`.
    pub fn reached_from(dir: DiagDirection) -> TrackBits {
        match dir {
            DiagDirection::NE => TrackBits(0x01 | 0x08 | 0x20),
            DiagDirection::SE => TrackBits(0x02 | 0x08 | 0x10),
            DiagDirection::SW => TrackBits(0x01 | 0x04 | 0x10),
            DiagDirection::NW => TrackBits(0x02 | 0x04 | 0x20),
        }
    }
}

/// Station-specific contents of a station tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationTile {
    pub station: StationId,
    /// Whether this tile is a rail station or rail waypoint tile.
    pub rail: bool,
    pub axis: Axis,
    /// Layout id of the tile.
    pub gfx: u8,
    /// Index into the owning station's spec list; 0 is the default spec.
    pub spec_index: u8,
    /// 4-bit per-tile random bits.
    pub random_bits: u8,
    pub animation_frame: u8,
    pub reserved: bool,
    pub rail_type: u8,
    pub blocked: bool,
}

impl StationTile {
    pub fn rail(station: StationId, axis: Axis) -> Self {
        Self {
            station,
            rail: true,
            axis,
            gfx: 0,
            spec_index: 0,
            random_bits: 0,
            animation_frame: 0,
            reserved: false,
            rail_type: 0,
            blocked: false,
        }
    }

    pub fn has_custom_spec(&self) -> bool {
        self.spec_index != 0
    }
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// Read and write access to the map tiles the engine needs.
pub trait TileGrid {
    /// Whether `tile` lies on the map.
    fn contains(&self, tile: TilePos) -> bool;

    fn kind(&self, tile: TilePos) -> TileKind;

    fn slope(&self, tile: TilePos) -> Slope;

    /// Height of the tile's lowest corner in pixels.
    fn pixel_height(&self, tile: TilePos) -> u32;

    /// Terrain type: 0 normal, 1 desert, 2 rainforest, 4 snow.
    fn terrain_type(&self, tile: TilePos) -> u8;

    /// Water class of tiles that have one.
    fn water_class(&self, tile: TilePos) -> Option<u8>;

    /// Rail tracks usable by trains on the tile.
    fn track_bits(&self, tile: TilePos) -> TrackBits;

    /// Direction a tunnel or bridge ramp on the tile faces.
    fn tunnel_bridge_direction(&self, tile: TilePos) -> Option<DiagDirection>;

    fn station_tile(&self, tile: TilePos) -> Option<&StationTile>;

    fn set_tile_random_bits(&mut self, tile: TilePos, bits: u8);

    fn set_animation_frame(&mut self, tile: TilePos, frame: u8);

    fn add_animated_tile(&mut self, tile: TilePos);

    fn delete_animated_tile(&mut self, tile: TilePos);

    fn mark_dirty(&mut self, tile: TilePos);

    /// Play a pack-defined sound effect at a tile.
    fn play_sound(&mut self, tile: TilePos, pack: PackId, sound: u8);

    /// The station contents of `tile` if it is a rail station or waypoint tile.
    fn rail_station_tile(&self, tile: TilePos) -> Option<&StationTile> {
        self.station_tile(tile).filter(|st| st.rail)
    }

    /// Whether `tile` is a rail tile of `station`.
    fn belongs_to_rail_station(&self, tile: TilePos, station: StationId) -> bool {
        self.rail_station_tile(tile)
            .is_some_and(|st| st.station == station)
    }
}

// ---------------------------------------------------------------------------
// TileMap
// ---------------------------------------------------------------------------

/// Contents of one tile of a [`TileMap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    pub kind: TileKind,
    pub slope: Slope,
    pub pixel_height: u32,
    pub terrain: u8,
    pub water_class: Option<u8>,
    pub tracks: TrackBits,
    pub tunnel_bridge: Option<DiagDirection>,
    pub station: Option<StationTile>,
}

/// A sound played through [`TileGrid::play_sound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedSound {
    pub tile: TilePos,
    pub pack: PackId,
    pub sound: u8,
}

/// A rectangular in-memory map. Tiles never written are clear and flat.
#[derive(Debug, Default)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: BTreeMap<TilePos, TileData>,
    animated: BTreeSet<TilePos>,
    dirty: BTreeSet<TilePos>,
    sounds: Vec<PlayedSound>,
}

static CLEAR_TILE: TileData = TileData {
    kind: TileKind::Clear,
    slope: Slope::FLAT,
    pixel_height: 0,
    terrain: 0,
    water_class: None,
    tracks: TrackBits::NONE,
    tunnel_bridge: None,
    station: None,
};

impl TileMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The contents of a tile. Off-map tiles read as clear.
    pub fn tile(&self, tile: TilePos) -> &TileData {
        self.tiles.get(&tile).unwrap_or(&CLEAR_TILE)
    }

    /// Mutable contents of an on-map tile, created on first access.
    pub fn tile_mut(&mut self, tile: TilePos) -> Option<&mut TileData> {
        if !self.contains(tile) {
            return None;
        }
        Some(self.tiles.entry(tile).or_default())
    }

    /// Put a station tile on the map.
    pub fn place_station_tile(&mut self, tile: TilePos, station: StationTile) -> bool {
        match self.tile_mut(tile) {
            Some(data) => {
                data.kind = TileKind::Station;
                data.station = Some(station);
                true
            }
            None => false,
        }
    }

    /// Put plain rail track on the map.
    pub fn place_rail(&mut self, tile: TilePos, tracks: TrackBits) -> bool {
        match self.tile_mut(tile) {
            Some(data) => {
                data.kind = TileKind::Railway;
                data.tracks = tracks;
                true
            }
            None => false,
        }
    }

    pub fn set_slope(&mut self, tile: TilePos, slope: Slope, pixel_height: u32) {
        if let Some(data) = self.tile_mut(tile) {
            data.slope = slope;
            data.pixel_height = pixel_height;
        }
    }

    pub fn station_tile_mut(&mut self, tile: TilePos) -> Option<&mut StationTile> {
        self.tiles.get_mut(&tile).and_then(|d| d.station.as_mut())
    }

    /// Turn a tile back into clear land.
    pub fn clear_tile(&mut self, tile: TilePos) {
        self.tiles.remove(&tile);
        self.animated.remove(&tile);
    }

    pub fn is_animated(&self, tile: TilePos) -> bool {
        self.animated.contains(&tile)
    }

    pub fn animated_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.animated.iter().copied()
    }

    pub fn is_dirty(&self, tile: TilePos) -> bool {
        self.dirty.contains(&tile)
    }

    /// Forget all dirty marks, returning how many tiles were dirty.
    pub fn take_dirty(&mut self) -> usize {
        let n = self.dirty.len();
        self.dirty.clear();
        n
    }

    pub fn sounds(&self) -> &[PlayedSound] {
        &self.sounds
    }
}

impl TileGrid for TileMap {
    fn contains(&self, tile: TilePos) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    fn kind(&self, tile: TilePos) -> TileKind {
        if !self.contains(tile) {
            return TileKind::Void;
        }
        self.tile(tile).kind
    }

    fn slope(&self, tile: TilePos) -> Slope {
        self.tile(tile).slope
    }

    fn pixel_height(&self, tile: TilePos) -> u32 {
        self.tile(tile).pixel_height
    }

    fn terrain_type(&self, tile: TilePos) -> u8 {
        self.tile(tile).terrain
    }

    fn water_class(&self, tile: TilePos) -> Option<u8> {
        self.tile(tile).water_class
    }

    fn track_bits(&self, tile: TilePos) -> TrackBits {
        let data = self.tile(tile);
        match &data.station {
            Some(st) if st.rail && !st.blocked => TrackBits::for_axis(st.axis),
            Some(_) => TrackBits::NONE,
            None => data.tracks,
        }
    }

    fn tunnel_bridge_direction(&self, tile: TilePos) -> Option<DiagDirection> {
        self.tile(tile).tunnel_bridge
    }

    fn station_tile(&self, tile: TilePos) -> Option<&StationTile> {
        self.tiles.get(&tile).and_then(|d| d.station.as_ref())
    }

    fn set_tile_random_bits(&mut self, tile: TilePos, bits: u8) {
        if let Some(st) = self.station_tile_mut(tile) {
            st.random_bits = bits & 0x0F;
        }
    }

    fn set_animation_frame(&mut self, tile: TilePos, frame: u8) {
        if let Some(st) = self.station_tile_mut(tile) {
            st.animation_frame = frame;
        }
    }

    fn add_animated_tile(&mut self, tile: TilePos) {
        self.animated.insert(tile);
    }

    fn delete_animated_tile(&mut self, tile: TilePos) {
        self.animated.remove(&tile);
    }

    fn mark_dirty(&mut self, tile: TilePos) {
        self.dirty.insert(tile);
    }

    fn play_sound(&mut self, tile: TilePos, pack: PackId, sound: u8) {
        self.sounds.push(PlayedSound { tile, pack, sound });
    }
}
