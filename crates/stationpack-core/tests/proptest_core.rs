//! Property-based tests for the stationpack core data model.

use proptest::prelude::*;
use stationpack_core::cargo::{CargoType, CargoTypes, NUM_CARGO};
use stationpack_core::rng::{RandomSource, SimRng, apply_mask};
use stationpack_core::sprite_group::AdjustOp;
use stationpack_core::test_utils::*;
use stationpack_core::tile::{Axis, Slope, TileArea, TilePos};

// ===========================================================================
// Generators
// ===========================================================================

fn arb_tile() -> impl Strategy<Value = TilePos> {
    (-64..64i32, -64..64i32).prop_map(|(x, y)| TilePos::new(x, y))
}

fn arb_area() -> impl Strategy<Value = TileArea> {
    (arb_tile(), 1..16u32, 1..16u32).prop_map(|(o, w, h)| TileArea::new(o, w, h))
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Zero mask leaves the old value untouched; full mask takes the fresh one.
    #[test]
    fn apply_mask_extremes(old in any::<u32>(), fresh in any::<u32>()) {
        prop_assert_eq!(apply_mask(old, fresh, 0), old);
        prop_assert_eq!(apply_mask(old, fresh, u32::MAX), fresh);
    }

    /// Bits outside the mask always survive; bits inside always come from fresh.
    #[test]
    fn apply_mask_partitions_bits(old in any::<u32>(), fresh in any::<u32>(), mask in any::<u32>()) {
        let out = apply_mask(old, fresh, mask);
        prop_assert_eq!(out & !mask, old & !mask);
        prop_assert_eq!(out & mask, fresh & mask);
    }

    /// Applying the same mask twice with the same fresh value is idempotent.
    #[test]
    fn apply_mask_idempotent(old in any::<u32>(), fresh in any::<u32>(), mask in any::<u32>()) {
        let once = apply_mask(old, fresh, mask);
        prop_assert_eq!(apply_mask(once, fresh, mask), once);
    }

    /// An extended area contains the new tile and every tile it held before.
    #[test]
    fn extend_covers_old_and_new(area in arb_area(), tile in arb_tile()) {
        let mut grown = area;
        grown.extend(tile);
        prop_assert!(grown.contains(tile));
        for t in area.tiles() {
            prop_assert!(grown.contains(t));
        }
    }

    /// Iterating an area yields exactly `tile_count` tiles, all contained.
    #[test]
    fn tiles_match_count(area in arb_area()) {
        let tiles: Vec<_> = area.tiles().collect();
        prop_assert_eq!(tiles.len() as u32, area.tile_count());
        prop_assert!(tiles.iter().all(|t| area.contains(*t)));
    }

    /// Axis correction only ever touches the west and east corners, and
    /// applying it twice restores the slope.
    #[test]
    fn slope_correction_involution(bits in 0u8..0x20) {
        let slope = Slope(bits);
        let corrected = slope.axis_corrected(Axis::Y);
        prop_assert_eq!((corrected.0 ^ slope.0) & !Slope::EW, 0);
        prop_assert_eq!(corrected.axis_corrected(Axis::Y), slope);
        prop_assert_eq!(slope.axis_corrected(Axis::X), slope);
    }

    /// Collecting the members of a cargo set reproduces the set.
    #[test]
    fn cargo_set_iter_round_trip(bits in any::<u64>()) {
        let set = CargoTypes(bits);
        let rebuilt: CargoTypes = set.iter().collect();
        prop_assert_eq!(rebuilt, set);
        prop_assert!(set.iter().all(|c| (c.index()) < NUM_CARGO));
    }

    /// Compare ops always yield 0, 1 or 2.
    #[test]
    fn compare_ops_are_ternary(a in any::<u32>(), b in any::<u32>()) {
        prop_assert!(AdjustOp::SignedCompare.apply(a, b) <= 2);
        prop_assert!(AdjustOp::UnsignedCompare.apply(a, b) <= 2);
        prop_assert_eq!(AdjustOp::UnsignedCompare.apply(a, a), 1);
    }

    /// SimRng sequences depend only on the seed.
    #[test]
    fn rng_is_seed_deterministic(seed in any::<u64>()) {
        let mut a = SimRng::new(seed);
        let mut b = SimRng::new(seed);
        for _ in 0..16 {
            prop_assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}

#[test]
fn registry_fixture_registers_in_order() {
    let (reg, ids) = registry_with(vec![
        sprite_spec(0, test_pack()),
        sprite_spec(1, test_pack()),
        callback_spec(2, 0x400),
    ]);
    assert_eq!(reg.spec_count(), 3);
    assert_eq!(ids.len(), 3);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(reg.get(*id).unwrap().local_id, i as u16);
    }
}

#[test]
fn station_fixture_goods() {
    let mut st = rail_station(TilePos::new(4, 4), 3, 2);
    st.goods_mut(coal()).unwrap().waiting = Some(12);
    assert_eq!(st.waiting(coal()), 12);
    assert_eq!(st.waiting(CargoType(63)), 0);
    assert!(waypoint(TilePos::new(0, 0)).is_waypoint());
}
