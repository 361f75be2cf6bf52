//! Per-station spec slots.
//!
//! Station tiles reference specs through a small per-station table. Slot 0
//! stands for the default look and is never handed out or freed. After
//! every change the station's trigger caches are rebuilt from the occupied
//! slots so dispatch can skip stations no spec listens on.

use stationpack_core::cargo::CargoTypes;
use stationpack_core::id::{SpecId, StationId};
use stationpack_core::registry::SpecRegistry;
use stationpack_core::station::{MAX_SPECS_PER_STATION, SpecListEntry, Station, StationPool};
use stationpack_core::trigger::AnimationTriggers;
use stationpack_spatial::TileGrid;
use tracing::warn;

/// Find a slot for `spec` on `station`, and claim it when `exec` is set.
///
/// `None` as spec is the default look and always gets slot 0. A spec
/// already on the station gets a fresh slot; its old slot is only reused
/// once all 255 are taken. Returns `None` if every slot is taken by other
/// specs.
pub fn allocate_spec_to_station(
    registry: &SpecRegistry,
    spec: Option<SpecId>,
    station: &mut Station,
    exec: bool,
) -> Option<u8> {
    let Some(spec_id) = spec else {
        return Some(0);
    };
    let Some(descriptor) = registry.get(spec_id) else {
        warn!(?spec_id, "allocating unknown spec");
        return None;
    };

    let limit = station.speclist.len().min(MAX_SPECS_PER_STATION);
    let free = (1..limit)
        .find(|&i| station.speclist[i].is_empty())
        .unwrap_or(limit.max(1));

    if free >= MAX_SPECS_PER_STATION {
        let reused = (1..limit).find(|&i| station.speclist[i].spec == Some(spec_id));
        if reused.is_none() {
            warn!(
                pack = format_args!("{:08X}", descriptor.pack.id.0),
                local_id = descriptor.local_id,
                "station spec slots exhausted"
            );
        }
        return reused.map(|i| i as u8);
    }

    if exec {
        if free >= station.speclist.len() {
            station.speclist.resize(free + 1, SpecListEntry::default());
        }
        station.speclist[free] = SpecListEntry {
            spec: Some(spec_id),
            pack: descriptor.pack.id,
            local_index: descriptor.local_id,
        };
        update_cached_triggers(registry, station);
    }

    Some(free as u8)
}

/// Release `slot` of a station once no rail tile of it refers to the slot
/// any more. Trailing empty slots are dropped. Returns whether the slot was
/// released.
pub fn deallocate_spec_from_station<G: TileGrid + ?Sized>(
    registry: &SpecRegistry,
    grid: &G,
    stations: &mut StationPool,
    station_id: StationId,
    slot: u8,
) -> bool {
    if slot == 0 {
        return false;
    }
    let Some(station) = stations.get_mut(station_id) else {
        return false;
    };
    let index = slot as usize;
    if index >= station.speclist.len() {
        return false;
    }

    let in_use = station.rail_area.tiles().any(|tile| {
        grid.belongs_to_rail_station(tile, station_id)
            && grid.station_tile(tile).is_some_and(|t| t.spec_index == slot)
    });
    if in_use {
        return false;
    }

    station.speclist[index] = SpecListEntry::default();

    if index == station.speclist.len() - 1 {
        match station.speclist.iter().rposition(|e| !e.pack.is_none()) {
            Some(last) if last > 0 => station.speclist.truncate(last + 1),
            _ => {
                station.speclist.clear();
                station.cached_anim_triggers = AnimationTriggers::EMPTY;
                station.cached_cargo_triggers = CargoTypes::EMPTY;
                return true;
            }
        }
    }

    update_cached_triggers(registry, station);
    true
}

/// Rebuild the animation and cargo trigger caches from the occupied slots.
pub fn update_cached_triggers(registry: &SpecRegistry, station: &mut Station) {
    let mut anim = AnimationTriggers::EMPTY;
    let mut cargo = CargoTypes::EMPTY;
    for spec in station
        .speclist
        .iter()
        .filter_map(|e| e.spec)
        .filter_map(|id| registry.get(id))
    {
        anim = anim.union(spec.animation.triggers);
        cargo = cargo.union(spec.cargo_triggers);
    }
    station.cached_anim_triggers = anim;
    station.cached_cargo_triggers = cargo;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Fixture;
    use stationpack_core::test_utils::*;
    use stationpack_core::tile::{Axis, TilePos};
    use stationpack_core::trigger::StationAnimationTrigger;

    fn anim_spec(local_id: u16, trigger: StationAnimationTrigger) -> stationpack_core::spec::StationSpec {
        let mut spec = sprite_spec(local_id, test_pack());
        spec.animation.triggers.insert(trigger);
        spec
    }

    #[test]
    fn default_look_is_slot_zero() {
        let (registry, _) = registry_with(vec![]);
        let mut st = rail_station(TilePos::new(0, 0), 1, 1);
        assert_eq!(allocate_spec_to_station(&registry, None, &mut st, true), Some(0));
        assert!(st.speclist.is_empty());
    }

    #[test]
    fn first_allocation_takes_slot_one() {
        let (registry, ids) = registry_with(vec![sprite_spec(3, test_pack())]);
        let mut st = rail_station(TilePos::new(0, 0), 1, 1);

        assert_eq!(allocate_spec_to_station(&registry, Some(ids[0]), &mut st, false), Some(1));
        assert!(st.speclist.is_empty());

        assert_eq!(allocate_spec_to_station(&registry, Some(ids[0]), &mut st, true), Some(1));
        assert_eq!(st.speclist.len(), 2);
        assert!(st.speclist[0].is_empty());
        assert_eq!(st.speclist[1].pack, TEST_PACK_ID);
        assert_eq!(st.speclist[1].local_index, 3);
    }

    #[test]
    fn allocations_fill_gaps() {
        let (registry, ids) = registry_with(vec![
            sprite_spec(0, test_pack()),
            sprite_spec(1, test_pack()),
            sprite_spec(2, test_pack()),
        ]);
        let mut st = rail_station(TilePos::new(0, 0), 1, 1);
        for id in &ids {
            allocate_spec_to_station(&registry, Some(*id), &mut st, true);
        }
        st.speclist[2] = SpecListEntry::default();
        assert_eq!(allocate_spec_to_station(&registry, Some(ids[1]), &mut st, true), Some(2));
    }

    #[test]
    fn same_spec_gets_a_new_slot_below_ceiling() {
        let (registry, ids) = registry_with(vec![sprite_spec(0, test_pack())]);
        let mut st = rail_station(TilePos::new(0, 0), 1, 1);
        assert_eq!(allocate_spec_to_station(&registry, Some(ids[0]), &mut st, true), Some(1));
        assert_eq!(allocate_spec_to_station(&registry, Some(ids[0]), &mut st, true), Some(2));
        assert_eq!(st.speclist.len(), 3);
        assert_eq!(st.speclist[1].spec, st.speclist[2].spec);
    }

    #[test]
    fn exhausted_table_reuses_identical_spec() {
        let (registry, ids) = registry_with(vec![sprite_spec(0, test_pack()), sprite_spec(1, test_pack())]);
        let mut st = rail_station(TilePos::new(0, 0), 1, 1);
        st.speclist = vec![SpecListEntry::default(); MAX_SPECS_PER_STATION];
        for entry in st.speclist.iter_mut().skip(1) {
            *entry = SpecListEntry {
                spec: Some(ids[0]),
                pack: TEST_PACK_ID,
                local_index: 0,
            };
        }
        assert_eq!(allocate_spec_to_station(&registry, Some(ids[0]), &mut st, true), Some(1));
        assert_eq!(allocate_spec_to_station(&registry, Some(ids[1]), &mut st, true), None);
        assert_eq!(st.speclist.len(), MAX_SPECS_PER_STATION);
    }

    #[test]
    fn caches_follow_slots() {
        let (mut fx, ids) = Fixture::new(vec![
            anim_spec(0, StationAnimationTrigger::Built),
            anim_spec(1, StationAnimationTrigger::TileLoop),
        ]);
        let sid = fx.add_station(TilePos::new(2, 2), 2, 1, Axis::X);
        fx.assign_spec(sid, ids[0], TilePos::new(2, 2), 1, 1);
        fx.assign_spec(sid, ids[1], TilePos::new(3, 2), 1, 1);
        let st = &fx.stations[sid];
        assert!(st.cached_anim_triggers.contains(StationAnimationTrigger::Built));
        assert!(st.cached_anim_triggers.contains(StationAnimationTrigger::TileLoop));

        // Slot 2 is still used by (3, 2).
        assert!(!deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 2));
        fx.grid.station_tile_mut(TilePos::new(3, 2)).unwrap().spec_index = 0;
        assert!(deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 2));

        let st = &fx.stations[sid];
        assert_eq!(st.speclist.len(), 2);
        assert!(st.cached_anim_triggers.contains(StationAnimationTrigger::Built));
        assert!(!st.cached_anim_triggers.contains(StationAnimationTrigger::TileLoop));
    }

    #[test]
    fn freeing_the_last_slot_clears_everything() {
        let (mut fx, ids) = Fixture::new(vec![anim_spec(0, StationAnimationTrigger::Built)]);
        let sid = fx.add_station(TilePos::new(2, 2), 1, 1, Axis::X);
        fx.assign_spec(sid, ids[0], TilePos::new(2, 2), 1, 1);
        fx.grid.clear_tile(TilePos::new(2, 2));

        assert!(deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 1));
        let st = &fx.stations[sid];
        assert!(st.speclist.is_empty());
        assert!(st.cached_anim_triggers.is_empty());
        assert!(st.cached_cargo_triggers.is_empty());
    }

    #[test]
    fn slot_zero_and_unknown_slots_are_kept() {
        let (mut fx, _) = Fixture::new(vec![]);
        let sid = fx.add_station(TilePos::new(2, 2), 1, 1, Axis::X);
        assert!(!deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 0));
        assert!(!deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 9));
    }

    #[test]
    fn freeing_a_middle_slot_keeps_length() {
        let (mut fx, ids) = Fixture::new(vec![sprite_spec(0, test_pack()), sprite_spec(1, test_pack())]);
        let sid = fx.add_station(TilePos::new(2, 2), 2, 1, Axis::X);
        fx.assign_spec(sid, ids[0], TilePos::new(2, 2), 1, 1);
        fx.assign_spec(sid, ids[1], TilePos::new(3, 2), 1, 1);
        fx.grid.station_tile_mut(TilePos::new(2, 2)).unwrap().spec_index = 0;

        assert!(deallocate_spec_from_station(&fx.registry, &fx.grid, &mut fx.stations, sid, 1));
        let st = &fx.stations[sid];
        assert_eq!(st.speclist.len(), 3);
        assert!(st.speclist[1].is_empty());
    }
}
