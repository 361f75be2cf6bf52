//! Property tests for station spec slot allocation across random sequences
//! of builds and removals.

use proptest::prelude::*;
use stationpack_core::cargo::CargoTypes;
use stationpack_core::id::SpecId;
use stationpack_core::registry::SpecRegistry;
use stationpack_core::station::{Station, StationPool};
use stationpack_core::test_utils::{callback_spec, rail_station, registry_with};
use stationpack_core::tile::TilePos;
use stationpack_core::trigger::AnimationTriggers;
use stationpack_resolver::{allocate_spec_to_station, deallocate_spec_from_station};
use stationpack_spatial::TileMap;

// ===========================================================================
// Strategies
// ===========================================================================

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    Release(u8),
}

/// Trigger sets of up to eight specs.
fn arb_triggers() -> impl Strategy<Value = Vec<(u16, u64)>> {
    prop::collection::vec((0u16..0x200, any::<u64>()), 1..8)
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0usize..8).prop_map(Op::Allocate),
            (0u8..10).prop_map(Op::Release),
        ],
        0..40,
    )
}

fn registry(triggers: &[(u16, u64)]) -> (SpecRegistry, Vec<SpecId>) {
    let specs = triggers
        .iter()
        .enumerate()
        .map(|(i, &(anim, cargo))| {
            let mut spec = callback_spec(i as u16, 0);
            spec.animation.triggers = AnimationTriggers(anim);
            spec.cargo_triggers = CargoTypes(cargo);
            spec
        })
        .collect();
    registry_with(specs)
}

/// Union of the trigger sets of every occupied slot.
fn expected_caches(registry: &SpecRegistry, station: &Station) -> (AnimationTriggers, CargoTypes) {
    station
        .speclist
        .iter()
        .filter_map(|e| e.spec)
        .filter_map(|id| registry.get(id))
        .fold(
            (AnimationTriggers::EMPTY, CargoTypes::EMPTY),
            |(anim, cargo), spec| {
                (
                    anim.union(spec.animation.triggers),
                    cargo.union(spec.cargo_triggers),
                )
            },
        )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A dry run picks the slot the real allocation then claims.
    #[test]
    fn dry_run_predicts_slot(triggers in arb_triggers(), picks in prop::collection::vec(0usize..8, 1..12)) {
        let (registry, ids) = registry(&triggers);
        let mut station = rail_station(TilePos::new(0, 0), 1, 1);
        for pick in picks {
            let spec = ids[pick % ids.len()];
            let dry = allocate_spec_to_station(&registry, Some(spec), &mut station, false);
            let before = station.speclist.clone();
            let again = allocate_spec_to_station(&registry, Some(spec), &mut station, false);
            prop_assert_eq!(dry, again);
            prop_assert_eq!(&before, &station.speclist);

            let real = allocate_spec_to_station(&registry, Some(spec), &mut station, true);
            prop_assert_eq!(dry, real);
            let slot = real.unwrap() as usize;
            prop_assert!(slot >= 1);
            prop_assert_eq!(station.speclist[slot].spec, Some(spec));
        }
    }

    /// Trigger caches always equal the union over occupied slots, and the
    /// slot list never ends in an empty slot.
    #[test]
    fn caches_track_occupied_slots(triggers in arb_triggers(), ops in arb_ops()) {
        let (registry, ids) = registry(&triggers);
        // No station tiles on the map, so every slot is releasable.
        let grid = TileMap::new(4, 4);
        let mut stations = StationPool::with_key();
        let sid = stations.insert(rail_station(TilePos::new(0, 0), 1, 1));

        for op in ops {
            match op {
                Op::Allocate(pick) => {
                    let spec = ids[pick % ids.len()];
                    let slot = allocate_spec_to_station(&registry, Some(spec), &mut stations[sid], true);
                    prop_assert!(slot.is_some());
                }
                Op::Release(slot) => {
                    let len = stations[sid].speclist.len();
                    let released = deallocate_spec_from_station(&registry, &grid, &mut stations, sid, slot);
                    prop_assert_eq!(released, slot != 0 && (slot as usize) < len);
                }
            }

            let station = &stations[sid];
            let (anim, cargo) = expected_caches(&registry, station);
            prop_assert_eq!(station.cached_anim_triggers, anim);
            prop_assert_eq!(station.cached_cargo_triggers, cargo);
            if let Some(last) = station.speclist.last() {
                prop_assert!(station.speclist.len() >= 2);
                prop_assert!(!last.is_empty());
            }
        }
    }

    /// Freeing a slot hands it to the next allocation.
    #[test]
    fn freed_slot_is_reused(triggers in arb_triggers(), count in 2usize..6, victim in 1u8..6) {
        let (registry, ids) = registry(&triggers);
        let grid = TileMap::new(4, 4);
        let mut stations = StationPool::with_key();
        let sid = stations.insert(rail_station(TilePos::new(0, 0), 1, 1));
        for i in 0..count {
            allocate_spec_to_station(&registry, Some(ids[i % ids.len()]), &mut stations[sid], true);
        }
        // Keep the last slot so the list is not truncated.
        let victim = victim.min(count as u8 - 1);
        prop_assert!(deallocate_spec_from_station(&registry, &grid, &mut stations, sid, victim));

        let next = allocate_spec_to_station(&registry, Some(ids[0]), &mut stations[sid], true);
        prop_assert_eq!(next, Some(victim));
    }
}

// ===========================================================================
// Fixed cases
// ===========================================================================

#[test]
fn default_look_takes_slot_zero_without_claiming() {
    let (registry, _) = registry(&[(1, 1)]);
    let mut station = rail_station(TilePos::new(0, 0), 1, 1);
    assert_eq!(allocate_spec_to_station(&registry, None, &mut station, true), Some(0));
    assert!(station.speclist.is_empty());
    assert!(station.cached_cargo_triggers.is_empty());
}
