//! Platform geometry: where a tile sits within its platform block, and how
//! rail continues beyond it.

use crate::grid::{TileGrid, TileKind, TrackBits};
use stationpack_core::tile::{Axis, DiagDirection, Direction, TilePos};

/// Extent of a platform block and a tile's position within it, in map
/// coordinates (x across, y down), before any axis swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLayout {
    /// Number of tiles along the map x axis.
    pub x_extent: i32,
    /// Number of tiles along the map y axis.
    pub y_extent: i32,
    /// Position of the tile, relative to the block's north corner.
    pub x: i32,
    pub y: i32,
}

/// Encode platform information for a tile with layout id `gfx`.
///
/// Non-centred layout (`.TNLcCpP`): bits 0..3 position from start, 4..7
/// position from end, 8..11 platform from start, 12..15 platform from end.
/// Centred layout (`.TNL..CP`): bits 0..3 signed position offset from the
/// middle, 4..7 signed platform offset. Both carry the length in 16..19, the
/// platform count in 20..23 and `gfx` in 24..31. Nibbles saturate at 15 and
/// centred offsets clamp to `[-8, 7]`.
pub fn platform_info(axis: Axis, gfx: u8, layout: PlatformLayout, centred: bool) -> u32 {
    let PlatformLayout {
        x_extent: mut platforms,
        y_extent: mut length,
        mut x,
        mut y,
    } = layout;

    if axis == Axis::X {
        std::mem::swap(&mut platforms, &mut length);
        std::mem::swap(&mut x, &mut y);
    }

    let nibble = |v: i32| (v.min(15) as u32) & 0xF;
    let mut info = 0u32;

    if centred {
        let x = (x - platforms / 2).clamp(-8, 7);
        let y = (y - length / 2).clamp(-8, 7);
        info |= (y as u32) & 0xF;
        info |= ((x as u32) & 0xF) << 4;
    } else {
        info |= nibble(y);
        info |= nibble(length - y - 1) << 4;
        info |= nibble(x) << 8;
        info |= nibble(platforms - x - 1) << 12;
    }

    info |= nibble(length) << 16;
    info |= nibble(platforms) << 20;
    info |= (gfx as u32) << 24;
    info
}

/// Walk from `tile` in steps of `delta` while the next tile is a rail tile of
/// the same station, optionally with the same spec index and axis. Returns
/// the last tile reached.
pub fn find_rail_station_end<G: TileGrid + ?Sized>(
    grid: &G,
    tile: TilePos,
    delta: (i32, i32),
    check_type: bool,
    check_axis: bool,
) -> TilePos {
    let Some(origin) = grid.station_tile(tile).copied() else {
        return tile;
    };

    let mut end = tile;
    loop {
        let next = end.add(delta);
        if !grid.contains(next) {
            break;
        }
        let Some(st) = grid.station_tile(next) else {
            break;
        };
        if st.station != origin.station || !st.rail {
            break;
        }
        if check_type && st.spec_index != origin.spec_index {
            break;
        }
        if check_axis && st.axis != origin.axis {
            break;
        }
        end = next;
    }
    end
}

/// Measure the platform block around a rail station tile.
pub fn platform_layout_at<G: TileGrid + ?Sized>(
    grid: &G,
    tile: TilePos,
    check_type: bool,
    check_axis: bool,
) -> PlatformLayout {
    let sx = find_rail_station_end(grid, tile, (-1, 0), check_type, check_axis).x;
    let sy = find_rail_station_end(grid, tile, (0, -1), check_type, check_axis).y;
    let ex = find_rail_station_end(grid, tile, (1, 0), check_type, check_axis).x + 1;
    let ey = find_rail_station_end(grid, tile, (0, 1), check_type, check_axis).y + 1;

    PlatformLayout {
        x_extent: ex - sx,
        y_extent: ey - sy,
        x: tile.x - sx,
        y: tile.y - sy,
    }
}

/// Platform information of a rail station tile as packs read it through
/// variables 0x40, 0x41, 0x46, 0x47 and 0x49. `None` if `tile` is not a
/// rail station tile.
pub fn platform_info_at<G: TileGrid + ?Sized>(
    grid: &G,
    tile: TilePos,
    check_type: bool,
    check_axis: bool,
    centred: bool,
) -> Option<u32> {
    let st = grid.rail_station_tile(tile)?;
    let layout = platform_layout_at(grid, tile, check_type, check_axis);
    Some(platform_info(st.axis, st.gfx, layout, centred))
}

const X_DIRS: [(Direction, DiagDirection); 8] = [
    (Direction::SW, DiagDirection::SW),
    (Direction::NE, DiagDirection::NE),
    (Direction::SE, DiagDirection::SE),
    (Direction::NW, DiagDirection::NW),
    (Direction::S, DiagDirection::SW),
    (Direction::E, DiagDirection::NE),
    (Direction::W, DiagDirection::SW),
    (Direction::N, DiagDirection::NE),
];

const Y_DIRS: [(Direction, DiagDirection); 8] = [
    (Direction::SE, DiagDirection::SE),
    (Direction::NW, DiagDirection::NW),
    (Direction::SW, DiagDirection::SW),
    (Direction::NE, DiagDirection::NE),
    (Direction::S, DiagDirection::SE),
    (Direction::W, DiagDirection::NW),
    (Direction::E, DiagDirection::SE),
    (Direction::N, DiagDirection::NW),
];

/// Rail continuation bits around a rail station tile.
///
/// For each of eight neighbours, bit `i + 8` is set if the neighbour has any
/// track and bit `i` if that track connects towards the neighbour's exit.
/// Tunnel and bridge ramps only connect when facing the exit.
pub fn rail_continuation_info<G: TileGrid + ?Sized>(grid: &G, tile: TilePos, axis: Axis) -> u32 {
    let table = match axis {
        Axis::X => &X_DIRS,
        Axis::Y => &Y_DIRS,
    };

    let mut res = 0u32;
    for (i, &(dir, exit)) in table.iter().enumerate() {
        let neighbour = tile.add(dir.offset());
        let tracks = grid.track_bits(neighbour);
        if tracks.is_empty() {
            continue;
        }
        res |= 1 << (i + 8);

        if grid.kind(neighbour) == TileKind::TunnelBridge
            && grid.tunnel_bridge_direction(neighbour) != Some(exit)
        {
            continue;
        }
        if tracks.intersects(TrackBits::reached_from(exit)) {
            res |= 1 << i;
        }
    }
    res
}
