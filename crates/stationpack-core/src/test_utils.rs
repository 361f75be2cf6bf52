//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::cargo::CargoType;
use crate::id::*;
use crate::registry::{SpecRegistry, SpecRegistryBuilder};
use crate::rng::RandomSource;
use crate::spec::{CargoKey, PackFile, StationSpec};
use crate::sprite_group::SpriteGroup;
use crate::station::{Station, StationKind};
use crate::tile::{TileArea, TilePos};
use std::sync::Arc;

// ===========================================================================
// Packs and specs
// ===========================================================================

pub const TEST_PACK_ID: PackId = PackId(0x5453_5450);

pub fn test_pack() -> Arc<PackFile> {
    Arc::new(PackFile::new(TEST_PACK_ID, 8))
}

pub fn legacy_pack() -> Arc<PackFile> {
    Arc::new(PackFile::new(PackId(0x4C45_4731), 7))
}

pub fn passengers() -> CargoType {
    CargoType(0)
}

pub fn coal() -> CargoType {
    CargoType(1)
}

pub fn mail() -> CargoType {
    CargoType(2)
}

/// A spec whose `Default` tree is a single sprite block.
pub fn sprite_spec(local_id: u16, pack: Arc<PackFile>) -> StationSpec {
    let mut spec = StationSpec::new("sprites", StationClassId(0), local_id, pack);
    spec.sprite_groups
        .insert(CargoKey::Default, SpriteGroup::sprites(0x42D + 10, 8));
    spec
}

/// A spec whose `Default` tree answers every callback with `result`.
pub fn callback_spec(local_id: u16, result: u16) -> StationSpec {
    let mut spec = StationSpec::new("callback", StationClassId(0), local_id, test_pack());
    spec.sprite_groups
        .insert(CargoKey::Default, SpriteGroup::callback(result));
    spec
}

/// Register `specs` into the default class and build the registry.
pub fn registry_with(specs: Vec<StationSpec>) -> (SpecRegistry, Vec<SpecId>) {
    let mut builder = SpecRegistryBuilder::new();
    let ids = specs
        .into_iter()
        .map(|s| {
            builder
                .register_spec(ClassLabel::DEFAULT, s)
                .expect("test spec registration")
        })
        .collect();
    (builder.build(), ids)
}

// ===========================================================================
// Stations
// ===========================================================================

pub fn rail_station(origin: TilePos, width: u32, height: u32) -> Station {
    Station::new(
        StationKind::Station,
        CompanyId(0),
        TileArea::new(origin, width, height),
    )
}

pub fn waypoint(tile: TilePos) -> Station {
    Station::new(StationKind::Waypoint, CompanyId(0), TileArea::single(tile))
}

// ===========================================================================
// Randomness
// ===========================================================================

/// Replays a fixed sequence of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<u32>,
    next: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, next: 0 }
    }

    /// Always returns `value`.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl RandomSource for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}
