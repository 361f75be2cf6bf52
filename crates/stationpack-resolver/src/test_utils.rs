//! A small game world for resolver tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::allocator::allocate_spec_to_station;
use crate::world::{DAYS_TILL_ORIGINAL_BASE_YEAR, GameContext, World};
use stationpack_core::directory::{CompanyList, TownList};
use stationpack_core::id::{SpecId, StationId};
use stationpack_core::registry::SpecRegistry;
use stationpack_core::spec::StationSpec;
use stationpack_core::station::StationPool;
use stationpack_core::test_utils::{rail_station, registry_with};
use stationpack_core::tile::{Axis, TileArea, TilePos};
use stationpack_spatial::{StationTile, TileMap};

/// Width and height of the fixture map.
pub const FIXTURE_MAP_SIZE: u32 = 64;

// ===========================================================================
// Fixture
// ===========================================================================

/// Owns every collaborator a resolution needs.
pub struct Fixture {
    pub registry: SpecRegistry,
    pub stations: StationPool,
    pub grid: TileMap,
    pub towns: TownList,
    pub companies: CompanyList,
    pub date: i32,
}

impl Fixture {
    /// A flat empty map with `specs` registered in the default class.
    pub fn new(specs: Vec<StationSpec>) -> (Self, Vec<SpecId>) {
        let (registry, ids) = registry_with(specs);
        let fixture = Self {
            registry,
            stations: StationPool::with_key(),
            grid: TileMap::new(FIXTURE_MAP_SIZE, FIXTURE_MAP_SIZE),
            towns: TownList::default(),
            companies: CompanyList::default(),
            date: DAYS_TILL_ORIGINAL_BASE_YEAR,
        };
        (fixture, ids)
    }

    pub fn ctx(&self) -> GameContext<'_> {
        GameContext::new(&self.registry, &self.towns, &self.companies).with_date(self.date)
    }

    pub fn world(&self) -> World<'_> {
        World::new(self.ctx(), &self.stations, &self.grid)
    }

    /// The read-only context plus mutable stations and map, for operations
    /// that change state.
    pub fn parts(&mut self) -> (GameContext<'_>, &mut StationPool, &mut TileMap) {
        let ctx = GameContext::new(&self.registry, &self.towns, &self.companies).with_date(self.date);
        (ctx, &mut self.stations, &mut self.grid)
    }

    /// Build a `width` x `height` block of rail tiles along `axis` as a new
    /// station.
    pub fn add_station(&mut self, origin: TilePos, width: u32, height: u32, axis: Axis) -> StationId {
        let id = self.stations.insert(rail_station(origin, width, height));
        for tile in TileArea::new(origin, width, height).tiles() {
            self.grid.place_station_tile(tile, StationTile::rail(id, axis));
        }
        id
    }

    /// Allocate `spec` on `station` and draw the given block of its tiles
    /// with it. Returns the slot.
    pub fn assign_spec(
        &mut self,
        station: StationId,
        spec: SpecId,
        origin: TilePos,
        width: u32,
        height: u32,
    ) -> u8 {
        let st = &mut self.stations[station];
        let slot = allocate_spec_to_station(&self.registry, Some(spec), st, true)
            .expect("fixture station has a free slot");
        for tile in TileArea::new(origin, width, height).tiles() {
            if let Some(t) = self.grid.station_tile_mut(tile) {
                if t.station == station {
                    t.spec_index = slot;
                }
            }
        }
        slot
    }
}
