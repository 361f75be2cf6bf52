//! Nearby-tile addressing and land information encoding.

use crate::grid::{TileGrid, TileKind};
use stationpack_core::tile::{Axis, TilePos};

/// Height of one height level in pixels.
pub const TILE_HEIGHT: u32 = 8;

/// Address a tile relative to `tile` using the packed nibble offsets of a
/// variable parameter: bits 0..3 are the x offset, bits 4..7 the y offset.
///
/// With `signed`, nibbles of 8 and above count backwards. The offsets are
/// swapped for Y-axis platforms; `axis` defaults to the axis of the rail
/// station on `tile`. Returns `None` when the target is off the map.
pub fn nearby_tile<G: TileGrid + ?Sized>(
    grid: &G,
    tile: TilePos,
    parameter: u8,
    signed: bool,
    axis: Option<Axis>,
) -> Option<TilePos> {
    let mut x = (parameter & 0x0F) as i32;
    let mut y = (parameter >> 4) as i32;
    if signed && x >= 8 {
        x -= 16;
    }
    if signed && y >= 8 {
        y -= 16;
    }

    let axis = axis.or_else(|| grid.rail_station_tile(tile).map(|st| st.axis));
    if axis == Some(Axis::Y) {
        std::mem::swap(&mut x, &mut y);
    }

    let target = tile.offset(x, y);
    grid.contains(target).then_some(target)
}

/// Land information of a tile: `type << 24 | z << 16 | terrain << 8 | slope`.
///
/// Modern packs get `z` in height levels, older ones in pixels.
pub fn land_info<G: TileGrid + ?Sized>(grid: &G, tile: TilePos, modern: bool) -> u32 {
    let kind = grid.kind(tile);
    let slope = grid.slope(tile);
    let water = grid.water_class(tile).map(|c| (c + 1) & 3).unwrap_or(0);
    let terrain = water << 5 | grid.terrain_type(tile) << 2 | ((kind == TileKind::Water) as u8) << 1;

    let mut z = grid.pixel_height(tile);
    if modern {
        z /= TILE_HEIGHT;
    }

    (kind.code() as u32) << 24 | z.min(0xFF) << 16 | (terrain as u32) << 8 | slope.0 as u32
}

/// [`land_info`] with the slope mirrored into platform orientation for
/// Y-axis platforms.
pub fn land_info_for_axis<G: TileGrid + ?Sized>(
    grid: &G,
    tile: TilePos,
    axis: Axis,
    modern: bool,
) -> u32 {
    let info = land_info(grid, tile, modern);
    let corrected = grid.slope(tile).axis_corrected(axis);
    (info & !0xFF) | corrected.0 as u32
}

/// Land information of a tile that is off the map.
pub fn void_land_info() -> u32 {
    (TileKind::Void.code() as u32) << 24
}
