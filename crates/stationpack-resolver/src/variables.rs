//! Station-scope variables.
//!
//! Packs read station and tile state through numbered variables. Variables
//! that need a platform walk are memoized in a [`VariableCache`] that lives
//! as long as one resolver.

use crate::world::{World, pack_date};
use stationpack_core::cargo::{CargoTranslation, CargoType};
use stationpack_core::id::{PackId, StationId};
use stationpack_core::spec::{CargoKey, StationSpec};
use stationpack_core::station::{GoodsStatus, INITIAL_STATION_RATING, Station};
use stationpack_core::tile::{Axis, TilePos};
use stationpack_core::variable::VarValue;
use stationpack_spatial::{
    StationTile, land_info_for_axis, nearby_tile, platform_info_at, rail_continuation_info,
    void_land_info,
};
use tracing::debug;

/// Platform info reported when there is no station yet: one platform of
/// one tile, at position 0.
pub const NO_STATION_PLATFORM_INFO: u32 = 0x0211_0000;

/// Airport type reported by stations without an airport.
const LEGACY_LARGE_AIRPORT: u32 = 1;

/// Had-vehicle-of-type bit reported by waypoints.
const HVOT_WAYPOINT: u32 = 1 << 6;

const INVALID_STATION: u32 = 0xFFFF;

// ---------------------------------------------------------------------------
// VariableCache
// ---------------------------------------------------------------------------

/// Memoized values of the expensive platform variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableCache {
    pub v40: Option<u32>,
    pub v41: Option<u32>,
    pub v45: Option<u32>,
    pub v46: Option<u32>,
    pub v47: Option<u32>,
    pub v49: Option<u32>,
}

impl VariableCache {
    fn slot(&mut self, variable: u8) -> Option<&mut Option<u32>> {
        match variable {
            0x40 => Some(&mut self.v40),
            0x41 => Some(&mut self.v41),
            0x45 => Some(&mut self.v45),
            0x46 => Some(&mut self.v46),
            0x47 => Some(&mut self.v47),
            0x49 => Some(&mut self.v49),
            _ => None,
        }
    }

    /// Number of variables computed so far.
    pub fn filled(&self) -> usize {
        [self.v40, self.v41, self.v45, self.v46, self.v47, self.v49]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

/// (check_type, check_axis, centred) for the memoized platform variables.
fn platform_flags(variable: u8) -> Option<(bool, bool, bool)> {
    match variable {
        0x40 => Some((false, false, false)),
        0x41 => Some((true, false, false)),
        0x46 => Some((false, false, true)),
        0x47 => Some((true, false, true)),
        0x49 => Some((false, true, false)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// StationScope
// ---------------------------------------------------------------------------

/// The self scope of a station resolution.
pub struct StationScope<'w> {
    pub(crate) world: World<'w>,
    pub(crate) spec: &'w StationSpec,
    pub(crate) station: Option<(StationId, &'w Station)>,
    pub(crate) tile: Option<TilePos>,
    /// Axis of a station being planned, set during slope checks.
    pub(crate) axis: Option<Axis>,
    pub(crate) cargo_key: CargoKey,
    pub(crate) cache: VariableCache,
}

impl<'w> StationScope<'w> {
    pub fn new(
        world: World<'w>,
        spec: &'w StationSpec,
        station: Option<StationId>,
        tile: Option<TilePos>,
    ) -> Self {
        let station = station.and_then(|id| world.stations.get(id).map(|st| (id, st)));
        Self {
            world,
            spec,
            station,
            tile,
            axis: None,
            cargo_key: CargoKey::Default,
            cache: VariableCache::default(),
        }
    }

    pub fn cache(&self) -> &VariableCache {
        &self.cache
    }

    /// Station random word in the low 16 bits, tile random bits above.
    pub fn random_bits(&self) -> u32 {
        let station = self.station.map(|(_, st)| st.random_bits as u32).unwrap_or(0);
        let tile = self
            .tile
            .and_then(|t| self.world.grid.station_tile(t))
            .map(|st| (st.random_bits as u32) << 16)
            .unwrap_or(0);
        station | tile
    }

    fn modern(&self) -> bool {
        self.spec.pack.is_modern()
    }

    fn rail_tile(&self) -> Option<(TilePos, &'w StationTile)> {
        let tile = self.tile?;
        self.world.grid.rail_station_tile(tile).map(|st| (tile, st))
    }

    /// Pack id of the spec slot `index` of `station`.
    fn slot_pack(station: &Station, index: u8) -> PackId {
        station.slot(index).map(|e| e.pack).unwrap_or(PackId::NONE)
    }

    /// Read a station-scope variable.
    pub fn variable(&mut self, variable: u8, parameter: u32) -> VarValue {
        let Some((id, st)) = self.station else {
            return self.planned_variable(variable, parameter);
        };

        match variable {
            0x40 | 0x41 | 0x45 | 0x46 | 0x47 | 0x49 => self.memoized(variable),
            0x42 => match self.rail_tile() {
                Some((tile, rail)) => {
                    let terrain = self.world.grid.terrain_type(tile) as u32;
                    VarValue::new(terrain | (rail.rail_type as u32) << 8)
                }
                None => VarValue::UNAVAILABLE,
            },
            0x43 => VarValue::new(self.world.ctx.companies.company_info(st.owner)),
            0x44 => match self.rail_tile() {
                Some((_, rail)) => VarValue::new(if rail.reserved { 7 } else { 4 }),
                None => VarValue::UNAVAILABLE,
            },
            0x4A => match self.rail_tile() {
                Some((_, rail)) => VarValue::new(rail.animation_frame as u32),
                None => VarValue::UNAVAILABLE,
            },
            0x66 => {
                let Some(tile) = self.tile else {
                    return VarValue::UNAVAILABLE;
                };
                let target = if parameter != 0 {
                    nearby_tile(self.world.grid, tile, parameter as u8, true, None)
                } else {
                    Some(tile)
                };
                let frame = target
                    .filter(|t| self.world.grid.belongs_to_rail_station(*t, id))
                    .and_then(|t| self.world.grid.station_tile(t))
                    .map(|nearby| nearby.animation_frame as u32)
                    .unwrap_or(u32::MAX);
                VarValue::new(frame)
            }
            0x67 => {
                let Some((tile, rail)) = self.rail_tile() else {
                    return VarValue::UNAVAILABLE;
                };
                let target = if parameter != 0 {
                    nearby_tile(self.world.grid, tile, parameter as u8, true, None)
                } else {
                    Some(tile)
                };
                let info = target
                    .map(|t| land_info_for_axis(self.world.grid, t, rail.axis, self.modern()))
                    .unwrap_or_else(void_land_info);
                VarValue::new(info)
            }
            0x68 | 0x6A | 0x6B => match self.rail_tile() {
                Some((tile, rail)) => VarValue::new(self.nearby_station_info(variable, parameter, id, st, tile, rail)),
                None => VarValue::UNAVAILABLE,
            },
            0x82 => VarValue::new(50),
            0x84 => VarValue::new(st.string_id as u32),
            0x86 => VarValue::new(0),
            0xF0 => VarValue::new(st.facilities as u32),
            0xFA => VarValue::new(pack_date(st.build_date)),
            _ if st.is_waypoint() => waypoint_variable(variable),
            _ => station_variable(st, &self.spec.pack.cargo_translation, variable, parameter as u8),
        }
    }

    fn memoized(&mut self, variable: u8) -> VarValue {
        if let Some(Some(value)) = self.cache.slot(variable).map(|s| *s) {
            return VarValue::new(value);
        }
        let Some((tile, rail)) = self.rail_tile() else {
            return VarValue::UNAVAILABLE;
        };
        let value = match platform_flags(variable) {
            Some((check_type, check_axis, centred)) => {
                platform_info_at(self.world.grid, tile, check_type, check_axis, centred)
            }
            None => Some(rail_continuation_info(self.world.grid, tile, rail.axis)),
        };
        let Some(value) = value else {
            return VarValue::UNAVAILABLE;
        };
        if let Some(slot) = self.cache.slot(variable) {
            *slot = Some(value);
        }
        VarValue::new(value)
    }

    fn nearby_station_info(
        &self,
        variable: u8,
        parameter: u32,
        id: StationId,
        st: &Station,
        tile: TilePos,
        rail: &StationTile,
    ) -> u32 {
        let grid = self.world.grid;
        let Some(target) = nearby_tile(grid, tile, parameter as u8, true, None) else {
            return u32::MAX;
        };
        let Some(nearby) = grid.rail_station_tile(target) else {
            return u32::MAX;
        };

        let own_pack = Self::slot_pack(st, rail.spec_index);
        let nearby_slot = nearby
            .has_custom_spec()
            .then(|| self.world.stations.get(nearby.station))
            .flatten()
            .and_then(|other| other.slot(nearby.spec_index).copied())
            .unwrap_or_default();

        match variable {
            0x68 => {
                let perpendicular = rail.axis != nearby.axis;
                let same_station = grid.belongs_to_rail_station(target, id);
                let mut res = ((nearby.gfx as u32 >> 1) & 0x3) << 12
                    | (perpendicular as u32) << 11
                    | (same_station as u32) << 10;
                if nearby.has_custom_spec() {
                    let bit = if nearby_slot.pack != own_pack { 9 } else { 8 };
                    res |= 1 << bit | nearby_slot.local_index.min(0xFF) as u32;
                }
                res
            }
            0x6A => {
                if nearby.has_custom_spec() {
                    nearby_slot.pack.0
                } else {
                    0
                }
            }
            _ => {
                if nearby.has_custom_spec() && nearby_slot.pack == own_pack {
                    nearby_slot.local_index as u32
                } else {
                    0xFFFE
                }
            }
        }
    }

    /// Variables while there is no station yet: build menu previews and slope
    /// checks of planned stations.
    fn planned_variable(&self, variable: u8, parameter: u32) -> VarValue {
        match variable {
            0x40 | 0x41 | 0x46 | 0x47 | 0x49 => VarValue::new(NO_STATION_PLATFORM_INFO),
            0x42 => VarValue::new(0),
            0x43 => {
                let ctx = self.world.ctx;
                VarValue::new(ctx.companies.company_info(ctx.current_company))
            }
            0x44 => VarValue::new(2),
            0x67 => match (self.axis, self.tile) {
                (Some(axis), Some(tile)) => {
                    let target = if parameter != 0 {
                        nearby_tile(self.world.grid, tile, parameter as u8, true, Some(axis))
                    } else {
                        Some(tile)
                    };
                    let info = target
                        .map(|t| land_info_for_axis(self.world.grid, t, axis, self.modern()))
                        .unwrap_or_else(void_land_info);
                    VarValue::new(info)
                }
                _ => VarValue::UNAVAILABLE,
            },
            0xFA => VarValue::new(pack_date(self.world.ctx.date)),
            _ => VarValue::UNAVAILABLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Generic station variables
// ---------------------------------------------------------------------------

/// Variables shared by every kind of station, for full stations.
pub fn station_variable(
    st: &Station,
    translation: &CargoTranslation,
    variable: u8,
    parameter: u8,
) -> VarValue {
    match variable {
        0x48 => return VarValue::new(st.acceptance_mask().0 as u32),
        0x8A => return VarValue::new(st.had_vehicle_of_type as u32),
        0xF1 => {
            return VarValue::new(st.airport.map(|a| a.ttd_type as u32).unwrap_or(LEGACY_LARGE_AIRPORT));
        }
        0xF2 => return VarValue::new(st.truck_stop_status.unwrap_or(0) as u32),
        0xF3 => return VarValue::new(st.bus_stop_status.unwrap_or(0) as u32),
        0xF6 => return VarValue::new(st.airport.map(|a| a.blocks as u32).unwrap_or(0)),
        0xF7 => return VarValue::new(st.airport.map(|a| (a.blocks >> 8) as u32 & 0xFF).unwrap_or(0)),
        _ => {}
    }

    if (0x60..=0x65).contains(&variable) || variable == 0x69 {
        let Some(ge) = translation.to_global(parameter).and_then(|c| st.goods(c)) else {
            return VarValue::new(match variable {
                0x62 => 0xFFFF_FFFF,
                0x64 => 0xFF00,
                _ => 0,
            });
        };
        let value = match variable {
            0x60 => ge.waiting.map(|w| w.min(4095)).unwrap_or(0),
            0x61 => {
                if ge.vehicle_ever_tried_loading {
                    ge.time_since_pickup as u32
                } else {
                    0
                }
            }
            0x62 => {
                if ge.has_rating() {
                    ge.rating as u32
                } else {
                    0xFFFF_FFFF
                }
            }
            0x63 => {
                if ge.has_data() {
                    ge.periods_in_transit as u32
                } else {
                    0
                }
            }
            0x64 => {
                if ge.vehicle_ever_tried_loading {
                    ge.last_speed as u32 | (ge.last_age as u32) << 8
                } else {
                    0xFF00
                }
            }
            0x65 => {
                if ge.has(GoodsStatus::Acceptance) {
                    1 << 3
                } else {
                    0
                }
            }
            _ => ge.convert_state() as u32,
        };
        return VarValue::new(value);
    }

    if (0x8C..=0xEC).contains(&variable) {
        let offset = variable - 0x8C;
        let Some(g) = st.goods(CargoType(offset >> 3)) else {
            return VarValue::new(0);
        };
        let value = match offset & 0x7 {
            0 => g.waiting_amount(),
            1 => {
                let acceptance = if g.has(GoodsStatus::Acceptance) { 1 << 7 } else { 0 };
                (g.waiting_amount().min(4095) & 0xF) | acceptance
            }
            2 => g.time_since_pickup as u32,
            3 => g.rating as u32,
            4 => {
                if g.has_data() {
                    g.first_station.map(u32::from).unwrap_or(INVALID_STATION)
                } else {
                    INVALID_STATION
                }
            }
            5 => {
                if g.has_data() {
                    g.periods_in_transit as u32
                } else {
                    0
                }
            }
            6 => g.last_speed as u32,
            _ => g.last_age as u32,
        };
        return VarValue::new(value);
    }

    debug!(variable = format_args!("0x{variable:02X}"), "unhandled station variable");
    VarValue::UNAVAILABLE
}

/// Variables shared by every kind of station, for waypoints.
pub fn waypoint_variable(variable: u8) -> VarValue {
    match variable {
        0x48 | 0xF1 | 0xF2 | 0xF3 | 0xF6 | 0xF7 => return VarValue::new(0),
        0x8A => return VarValue::new(HVOT_WAYPOINT),
        0x60..=0x65 => return VarValue::new(0),
        _ => {}
    }

    if (0x8C..=0xEC).contains(&variable) {
        return VarValue::new(match (variable - 0x8C) & 0x7 {
            3 => INITIAL_STATION_RATING,
            4 => INVALID_STATION,
            _ => 0,
        });
    }

    debug!(variable = format_args!("0x{variable:02X}"), "unhandled waypoint variable");
    VarValue::UNAVAILABLE
}
