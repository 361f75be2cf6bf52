//! Tile areas that station triggers propagate over.

use crate::grid::TileGrid;
use serde::{Deserialize, Serialize};
use stationpack_core::station::Station;
use stationpack_core::tile::{TileArea, TilePos};

/// Extent of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerArea {
    /// Only the trigger tile.
    Tile,
    /// The contiguous platform through the trigger tile.
    Platform,
    /// Every rail tile of the station.
    WholeStation,
}

/// Whether `candidate` continues the platform of `reference`: same station,
/// same axis, same rail type, and not blocked.
pub fn is_compatible_platform_tile<G: TileGrid + ?Sized>(
    grid: &G,
    candidate: TilePos,
    reference: TilePos,
) -> bool {
    let (Some(c), Some(r)) = (grid.rail_station_tile(candidate), grid.rail_station_tile(reference)) else {
        return false;
    };
    c.station == r.station && c.axis == r.axis && c.rail_type == r.rail_type && !c.blocked
}

/// Compute the rectangle of tiles a trigger at `trigger_tile` covers.
pub fn compute_area<G: TileGrid + ?Sized>(
    grid: &G,
    station: &Station,
    trigger_tile: TilePos,
    kind: TriggerArea,
) -> TileArea {
    match kind {
        TriggerArea::Tile => TileArea::single(trigger_tile),
        TriggerArea::Platform => platform_area(grid, trigger_tile),
        TriggerArea::WholeStation => station.rail_area,
    }
}

fn platform_area<G: TileGrid + ?Sized>(grid: &G, tile: TilePos) -> TileArea {
    let Some(st) = grid.rail_station_tile(tile) else {
        return TileArea::single(tile);
    };
    let delta = st.axis.delta();

    let mut end = tile;
    while grid.contains(end.add(delta)) && is_compatible_platform_tile(grid, end.add(delta), tile) {
        end = end.add(delta);
    }
    let mut start = tile;
    while grid.contains(start.sub(delta)) && is_compatible_platform_tile(grid, start.sub(delta), tile)
    {
        start = start.sub(delta);
    }

    TileArea::spanning(start, end)
}
