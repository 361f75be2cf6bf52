//! The parts of a station the resolution engine reads and maintains.

use crate::cargo::{CargoType, CargoTypes, NUM_CARGO};
use crate::id::{CompanyId, PackId, SpecId, StationId, TownId};
use crate::tile::TileArea;
use crate::trigger::{AnimationTriggers, RandomTriggers};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Maximum number of spec slots per station, slot 0 included.
pub const MAX_SPECS_PER_STATION: usize = 255;

/// All stations of the game, keyed by [`StationId`].
pub type StationPool = SlotMap<StationId, Station>;

/// Rating a waypoint reports for every cargo.
pub const INITIAL_STATION_RATING: u32 = 175;

/// Whether a station is a full station or a rail waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationKind {
    Station,
    Waypoint,
}

// ---------------------------------------------------------------------------
// Goods
// ---------------------------------------------------------------------------

/// Status flags of a goods entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoodsStatus {
    Acceptance = 0,
    Rating = 1,
    EverAccepted = 2,
    LastMonth = 3,
    CurrentMonth = 4,
    AcceptedBigtick = 5,
}

/// Per-cargo state of a station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsEntry {
    /// Cargo waiting, `None` if this cargo never had data at the station.
    pub waiting: Option<u32>,
    pub periods_in_transit: u16,
    pub first_station: Option<u16>,
    pub status: u8,
    pub rating: u8,
    pub time_since_pickup: u8,
    pub last_speed: u8,
    pub last_age: u8,
    pub vehicle_ever_tried_loading: bool,
}

impl GoodsEntry {
    pub fn has(&self, flag: GoodsStatus) -> bool {
        self.status & (1 << flag as u8) != 0
    }

    pub fn set(&mut self, flag: GoodsStatus) {
        self.status |= 1 << flag as u8;
    }

    pub fn has_data(&self) -> bool {
        self.waiting.is_some()
    }

    pub fn waiting_amount(&self) -> u32 {
        self.waiting.unwrap_or(0)
    }

    pub fn has_rating(&self) -> bool {
        self.has(GoodsStatus::Rating)
    }

    /// Acceptance history in the 4-bit form packs expect.
    pub fn convert_state(&self) -> u8 {
        let mut res = 0;
        if self.has(GoodsStatus::EverAccepted) {
            res |= 1 << 0;
        }
        if self.has(GoodsStatus::LastMonth) {
            res |= 1 << 1;
        }
        if self.has(GoodsStatus::CurrentMonth) {
            res |= 1 << 2;
        }
        if self.has(GoodsStatus::AcceptedBigtick) {
            res |= 1 << 3;
        }
        res
    }
}

// ---------------------------------------------------------------------------
// Spec slots
// ---------------------------------------------------------------------------

/// A station's reference to one spec. Empty when `pack` is zero and `spec`
/// is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecListEntry {
    pub spec: Option<SpecId>,
    pub pack: PackId,
    pub local_index: u16,
}

impl SpecListEntry {
    pub fn is_empty(&self) -> bool {
        self.spec.is_none() && self.pack.is_none()
    }
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// Airport fields exposed to station packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AirportInfo {
    pub ttd_type: u8,
    pub blocks: u64,
}

/// A station as seen by the resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub kind: StationKind,
    pub owner: CompanyId,
    pub town: Option<TownId>,
    pub string_id: u16,
    pub facilities: u8,
    pub build_date: i32,
    pub had_vehicle_of_type: u8,
    /// Bounding rectangle of the station's rail tiles.
    pub rail_area: TileArea,
    pub truck_stop_status: Option<u8>,
    pub bus_stop_status: Option<u8>,
    pub airport: Option<AirportInfo>,
    pub goods: Vec<GoodsEntry>,
    pub speclist: Vec<SpecListEntry>,
    pub random_bits: u16,
    pub waiting_random_triggers: RandomTriggers,
    pub cached_anim_triggers: AnimationTriggers,
    pub cached_cargo_triggers: CargoTypes,
}

impl Station {
    pub fn new(kind: StationKind, owner: CompanyId, rail_area: TileArea) -> Self {
        Self {
            kind,
            owner,
            town: None,
            string_id: 0,
            facilities: 0,
            build_date: 0,
            had_vehicle_of_type: 0,
            rail_area,
            truck_stop_status: None,
            bus_stop_status: None,
            airport: None,
            goods: vec![GoodsEntry::default(); NUM_CARGO],
            speclist: Vec::new(),
            random_bits: 0,
            waiting_random_triggers: RandomTriggers::EMPTY,
            cached_anim_triggers: AnimationTriggers::EMPTY,
            cached_cargo_triggers: CargoTypes::EMPTY,
        }
    }

    pub fn is_waypoint(&self) -> bool {
        self.kind == StationKind::Waypoint
    }

    pub fn goods(&self, cargo: CargoType) -> Option<&GoodsEntry> {
        self.goods.get(cargo.index())
    }

    pub fn goods_mut(&mut self, cargo: CargoType) -> Option<&mut GoodsEntry> {
        self.goods.get_mut(cargo.index())
    }

    pub fn waiting(&self, cargo: CargoType) -> u32 {
        self.goods(cargo).map(GoodsEntry::waiting_amount).unwrap_or(0)
    }

    /// Total cargo waiting over all cargo types.
    pub fn total_waiting(&self) -> u32 {
        self.goods
            .iter()
            .fold(0u32, |acc, g| acc.saturating_add(g.waiting_amount()))
    }

    /// Cargo types this station accepts.
    pub fn acceptance_mask(&self) -> CargoTypes {
        self.goods
            .iter()
            .enumerate()
            .filter(|(_, g)| g.has(GoodsStatus::Acceptance))
            .map(|(i, _)| CargoType(i as u8))
            .collect()
    }

    /// Cargo types with nothing waiting.
    pub fn empty_cargo_mask(&self) -> CargoTypes {
        self.goods
            .iter()
            .enumerate()
            .filter(|(_, g)| g.waiting_amount() == 0)
            .map(|(i, _)| CargoType(i as u8))
            .collect()
    }

    /// The spec referenced by slot `index`, if any.
    pub fn spec_at(&self, index: u8) -> Option<SpecId> {
        self.speclist.get(index as usize).and_then(|e| e.spec)
    }

    pub fn slot(&self, index: u8) -> Option<&SpecListEntry> {
        self.speclist.get(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TilePos;

    fn station() -> Station {
        Station::new(
            StationKind::Station,
            CompanyId(0),
            TileArea::new(TilePos::new(0, 0), 4, 2),
        )
    }

    #[test]
    fn new_station_has_goods_for_every_cargo() {
        let st = station();
        assert_eq!(st.goods.len(), NUM_CARGO);
        assert_eq!(st.total_waiting(), 0);
        assert!(st.speclist.is_empty());
    }

    #[test]
    fn waiting_and_empty_mask() {
        let mut st = station();
        st.goods_mut(CargoType(2)).unwrap().waiting = Some(30);
        st.goods_mut(CargoType(5)).unwrap().waiting = Some(0);
        assert_eq!(st.waiting(CargoType(2)), 30);
        assert_eq!(st.total_waiting(), 30);

        let empty = st.empty_cargo_mask();
        assert!(!empty.contains(CargoType(2)));
        assert!(empty.contains(CargoType(5)));
        assert!(empty.contains(CargoType(0)));
    }

    #[test]
    fn acceptance_mask_follows_status() {
        let mut st = station();
        st.goods_mut(CargoType(1)).unwrap().set(GoodsStatus::Acceptance);
        assert_eq!(st.acceptance_mask(), CargoTypes(0b10));
    }

    #[test]
    fn convert_state_bits() {
        let mut g = GoodsEntry::default();
        g.set(GoodsStatus::EverAccepted);
        g.set(GoodsStatus::AcceptedBigtick);
        assert_eq!(g.convert_state(), 0b1001);
    }

    #[test]
    fn empty_slot() {
        assert!(SpecListEntry::default().is_empty());
        let e = SpecListEntry {
            spec: None,
            pack: PackId(7),
            local_index: 0,
        };
        assert!(!e.is_empty());
    }
}
