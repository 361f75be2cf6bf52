//! Read-only views of the game state a resolution needs.

use stationpack_core::directory::{CompanyDirectory, TownDirectory};
use stationpack_core::id::CompanyId;
use stationpack_core::registry::SpecRegistry;
use stationpack_core::spec::StationSpec;
use stationpack_core::station::StationPool;
use stationpack_core::tile::TilePos;
use stationpack_spatial::TileGrid;

/// Days from year 0 to 1920-01-01, the base year packs count dates from.
pub const DAYS_TILL_ORIGINAL_BASE_YEAR: i32 = 701_265;

/// Collaborators and globals that stay fixed for the duration of a call.
#[derive(Clone, Copy)]
pub struct GameContext<'a> {
    pub registry: &'a SpecRegistry,
    pub towns: &'a dyn TownDirectory,
    pub companies: &'a dyn CompanyDirectory,
    /// The company executing the current command.
    pub current_company: CompanyId,
    /// Current calendar date in days since year 0.
    pub date: i32,
}

impl<'a> GameContext<'a> {
    pub fn new(
        registry: &'a SpecRegistry,
        towns: &'a dyn TownDirectory,
        companies: &'a dyn CompanyDirectory,
    ) -> Self {
        Self {
            registry,
            towns,
            companies,
            current_company: CompanyId(0),
            date: DAYS_TILL_ORIGINAL_BASE_YEAR,
        }
    }

    pub fn with_date(mut self, date: i32) -> Self {
        self.date = date;
        self
    }

    pub fn with_current_company(mut self, company: CompanyId) -> Self {
        self.current_company = company;
        self
    }
}

/// Everything a resolver reads: the context plus stations and the map.
#[derive(Clone, Copy)]
pub struct World<'a> {
    pub ctx: GameContext<'a>,
    pub stations: &'a StationPool,
    pub grid: &'a dyn TileGrid,
}

impl<'a> World<'a> {
    pub fn new(ctx: GameContext<'a>, stations: &'a StationPool, grid: &'a dyn TileGrid) -> Self {
        Self {
            ctx,
            stations,
            grid,
        }
    }

    /// The spec a station tile draws with, if it has a custom one.
    pub fn tile_spec(&self, tile: TilePos) -> Option<&'a StationSpec> {
        let st_tile = self.grid.station_tile(tile)?;
        if !st_tile.has_custom_spec() {
            return None;
        }
        let station = self.stations.get(st_tile.station)?;
        self.ctx.registry.get(station.spec_at(st_tile.spec_index)?)
    }
}

/// A date as packs see it: days since the base year, clamped to 16 bits.
pub fn pack_date(date: i32) -> u32 {
    (date - DAYS_TILL_ORIGINAL_BASE_YEAR).clamp(0, 0xFFFF) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_date_clamps() {
        assert_eq!(pack_date(DAYS_TILL_ORIGINAL_BASE_YEAR - 5), 0);
        assert_eq!(pack_date(DAYS_TILL_ORIGINAL_BASE_YEAR + 365), 365);
        assert_eq!(pack_date(i32::MAX), 0xFFFF);
    }

    #[test]
    fn tile_spec_follows_slot() {
        use crate::test_utils::Fixture;
        use stationpack_core::test_utils::{sprite_spec, test_pack};
        use stationpack_core::tile::Axis;

        let (mut fx, ids) = Fixture::new(vec![sprite_spec(5, test_pack())]);
        let sid = fx.add_station(TilePos::new(1, 1), 2, 1, Axis::X);
        fx.assign_spec(sid, ids[0], TilePos::new(1, 1), 1, 1);
        let world = fx.world();
        assert_eq!(world.tile_spec(TilePos::new(1, 1)).map(|s| s.local_id), Some(5));
        assert!(world.tile_spec(TilePos::new(2, 1)).is_none());
        assert!(world.tile_spec(TilePos::new(9, 9)).is_none());
    }
}
