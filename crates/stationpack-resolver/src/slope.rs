//! Land slope check for stations being built.

use crate::resolver::{OutputRegisters, StationResolver};
use crate::world::World;
use stationpack_core::callback::{CALLBACK_FAILED, CallbackId, StationCallback};
use stationpack_core::id::PackId;
use stationpack_core::spec::StationSpec;
use stationpack_core::tile::{Axis, TilePos};

/// Base of the pack text ids slope checks can report.
pub const PACK_TEXT_BASE: u16 = 0xD000;

/// Why a pack refused a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("pack {:08X} refused the location with text 0x{text_id:04X}", .pack.0)]
    PackText {
        pack: PackId,
        text_id: u16,
        params: OutputRegisters,
    },
    #[error("land sloped in wrong direction")]
    SlopedInWrongDirection,
    #[error("must be built on a river")]
    River,
    #[error("must be built on the sea")]
    Sea,
    #[error("must be built on a canal")]
    Canal,
}

/// Ask the spec whether `cur_tile` of a station planned from `north_tile`
/// may be built with the tile's current slope.
///
/// Specs without the slope-check callback accept every tile.
pub fn perform_slope_check<'w>(
    world: World<'w>,
    north_tile: TilePos,
    cur_tile: TilePos,
    spec: &'w StationSpec,
    axis: Axis,
    plat_len: u8,
    num_tracks: u8,
) -> Result<(), LocationError> {
    if !spec.has_callback(StationCallback::SlopeCheck) {
        return Ok(());
    }

    let slope = world.grid.slope(cur_tile);
    let param1 = (slope.0 as u32) << 4 | slope.axis_corrected(axis).0 as u32;

    let dx = (cur_tile.x - north_tile.x) as u32 & 0xFF;
    let dy = (cur_tile.y - north_tile.y) as u32 & 0xFF;
    let offset = match axis {
        Axis::Y => dx << 8 | dy,
        Axis::X => dy << 8 | dx,
    };
    let param2 = (num_tracks as u32) << 24 | (plat_len as u32) << 16 | offset;

    let mut resolver = StationResolver::new(
        world,
        spec,
        None,
        Some(cur_tile),
        CallbackId::LandSlopeCheck,
        param1,
        param2,
    );
    resolver.set_axis(axis);
    let (mut result, regs) = resolver.resolve_callback();

    if result == CALLBACK_FAILED {
        return Ok(());
    }
    if !spec.pack.is_modern() {
        result ^= 1 << 10;
    }
    location_result(spec.pack.id, result, regs)
}

fn location_result(pack: PackId, result: u16, params: OutputRegisters) -> Result<(), LocationError> {
    match result {
        r if r < 0x400 => Err(LocationError::PackText {
            pack,
            text_id: PACK_TEXT_BASE + r,
            params,
        }),
        0x400 => Ok(()),
        0x402 => Err(LocationError::River),
        0x403 => Err(LocationError::Sea),
        0x404 => Err(LocationError::Canal),
        _ => Err(LocationError::SlopedInWrongDirection),
    }
}
