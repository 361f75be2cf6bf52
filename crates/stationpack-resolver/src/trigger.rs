//! Propagation of animation and randomisation triggers over station tiles.
//!
//! A trigger fires on one tile and spreads over the tile alone, its
//! platform or the whole station depending on its kind. Stations whose
//! cached trigger sets show no spec listening are skipped without touching
//! a single tile.

use crate::animation::apply_animation_trigger_result;
use crate::resolver::{StationResolver, resolve_callback};
use crate::world::{GameContext, World};
use stationpack_core::callback::CallbackId;
use stationpack_core::cargo::{CargoType, CargoTypes};
use stationpack_core::id::StationId;
use stationpack_core::rng::{RandomSource, apply_mask};
use stationpack_core::station::StationPool;
use stationpack_core::tile::TilePos;
use stationpack_core::trigger::{RandomTriggers, StationAnimationTrigger, StationRandomTrigger};
use stationpack_spatial::{TileGrid, TriggerArea, compute_area};
use tracing::trace;

/// Area each animation trigger spreads over, indexed by trigger.
static ANIMATION_TRIGGER_AREAS: [TriggerArea; StationAnimationTrigger::COUNT] = [
    TriggerArea::Tile,
    TriggerArea::WholeStation,
    TriggerArea::WholeStation,
    TriggerArea::Platform,
    TriggerArea::Platform,
    TriggerArea::Platform,
    TriggerArea::WholeStation,
    TriggerArea::Tile,
    TriggerArea::Platform,
];

/// Area each random trigger spreads over, indexed by trigger.
static RANDOM_TRIGGER_AREAS: [TriggerArea; StationRandomTrigger::COUNT] = [
    TriggerArea::WholeStation,
    TriggerArea::WholeStation,
    TriggerArea::Platform,
    TriggerArea::Platform,
    TriggerArea::Platform,
    TriggerArea::Platform,
];

/// Local cargo id passed to packs when a trigger concerns no cargo.
const NO_CARGO: u32 = 0xFF;

/// What one dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerReport {
    /// Tiles of the trigger area that were examined.
    pub tiles_visited: usize,
    /// Resolutions run against specs.
    pub callbacks: usize,
}

/// Fire an animation trigger at `trigger_tile` of `station_id`.
pub fn trigger_station_animation<G: TileGrid>(
    ctx: GameContext<'_>,
    stations: &StationPool,
    grid: &mut G,
    station_id: StationId,
    trigger_tile: TilePos,
    trigger: StationAnimationTrigger,
    cargo: Option<CargoType>,
    rng: &mut dyn RandomSource,
) -> TriggerReport {
    let mut report = TriggerReport::default();
    let Some(station) = stations.get(station_id) else {
        return report;
    };
    if !station.cached_anim_triggers.contains(trigger) {
        trace!(?trigger, "no spec on station listens for animation trigger");
        return report;
    }

    let random16 = rng.next_u16() as u32;
    let area = compute_area(&*grid, station, trigger_tile, ANIMATION_TRIGGER_AREAS[trigger.index()]);
    trace!(?trigger, ?trigger_tile, tiles = area.tile_count(), "dispatching animation trigger");

    for tile in area.tiles() {
        report.tiles_visited += 1;
        if !grid.belongs_to_rail_station(tile, station_id) {
            continue;
        }

        let outcome = {
            let world = World::new(ctx, stations, &*grid);
            let Some(spec) = world.tile_spec(tile) else {
                continue;
            };
            if !spec.animation.triggers.contains(trigger) {
                continue;
            }
            let local_cargo = cargo
                .map(|c| spec.pack.cargo_translation.to_local(c) as u32)
                .unwrap_or(NO_CARGO);
            let param1 = random16 << 16 | rng.next_u16() as u32;
            let param2 = trigger.index() as u32 | local_cargo << 8;
            let (result, _) = resolve_callback(
                world,
                spec,
                Some(station_id),
                Some(tile),
                CallbackId::AnimationTrigger,
                param1,
                param2,
            );
            (spec.pack.id, result)
        };

        report.callbacks += 1;
        let (pack, result) = outcome;
        apply_animation_trigger_result(grid, tile, pack, result);
    }
    report
}

/// Fire a randomisation trigger at `trigger_tile` of `station_id`.
///
/// `cargo` restricts the trigger to specs listening on that cargo type.
pub fn trigger_station_randomisation<G: TileGrid>(
    ctx: GameContext<'_>,
    stations: &mut StationPool,
    grid: &mut G,
    station_id: StationId,
    trigger_tile: TilePos,
    trigger: StationRandomTrigger,
    cargo: Option<CargoType>,
    rng: &mut dyn RandomSource,
) -> TriggerReport {
    let mut report = TriggerReport::default();
    let Some(station) = stations.get_mut(station_id) else {
        return report;
    };
    let cached = station.cached_cargo_triggers;
    if cached.is_empty() || cargo.is_some_and(|c| !cached.contains(c)) {
        trace!(?trigger, ?cargo, "no spec on station listens for cargo");
        return report;
    }

    let empty_mask = match trigger {
        StationRandomTrigger::CargoTaken => station.empty_cargo_mask(),
        _ => CargoTypes::EMPTY,
    };
    station.waiting_random_triggers.insert(trigger);

    let area = compute_area(&*grid, station, trigger_tile, RANDOM_TRIGGER_AREAS[trigger.index()]);
    let pool: &StationPool = stations;
    trace!(?trigger, ?trigger_tile, tiles = area.tile_count(), "dispatching random trigger");

    let mut whole_reseed = 0u32;
    let mut used = 0u8;
    for tile in area.tiles() {
        report.tiles_visited += 1;
        if !grid.belongs_to_rail_station(tile, station_id) {
            continue;
        }

        let reseed = {
            let world = World::new(ctx, pool, &*grid);
            let Some(spec) = world.tile_spec(tile) else {
                continue;
            };
            if trigger == StationRandomTrigger::CargoTaken
                && !spec.cargo_triggers.difference(empty_mask).is_empty()
            {
                continue;
            }
            if cargo.is_some_and(|c| !spec.cargo_triggers.contains(c)) {
                continue;
            }

            let mut resolver = StationResolver::new(
                world,
                spec,
                Some(station_id),
                Some(tile),
                CallbackId::RandomTrigger,
                0,
                0,
            );
            resolver.resolve_rerandomisation();
            used |= resolver.used_triggers();
            resolver.reseed_sum()
        };
        report.callbacks += 1;

        if reseed != 0 {
            whole_reseed |= reseed;
            let old = grid.station_tile(tile).map(|t| t.random_bits).unwrap_or(0);
            let bits = apply_mask(old as u32, rng.next_u32(), reseed >> 16);
            grid.set_tile_random_bits(tile, bits as u8);
            grid.mark_dirty(tile);
        }
    }

    if let Some(station) = stations.get_mut(station_id) {
        station.waiting_random_triggers.reset(RandomTriggers(used));
        let whole_reseed = whole_reseed & 0xFFFF;
        if whole_reseed != 0 {
            station.random_bits =
                apply_mask(station.random_bits as u32, rng.next_u32(), whole_reseed) as u16;
        }
    }
    trace!(used, whole_reseed, "random trigger done");
    report
}
