//! The callback engine: one resolution request against one spec.
//!
//! A [`StationResolver`] walks the sprite-group tree the spec selects for
//! the station's cargo situation. It owns the temp registers, the last
//! computed value and the random-trigger bookkeeping of a single request;
//! nothing survives it.

use crate::selector::{cargo_amount, select_real};
use crate::town_scope::TownScopeResolver;
use crate::variables::{StationScope, VariableCache};
use crate::world::World;
use std::cell::OnceCell;
use stationpack_core::callback::{CALLBACK_FAILED, CallbackId, NUM_OUTPUT_REGISTERS};
use stationpack_core::id::StationId;
use stationpack_core::spec::{CargoKey, StationSpec};
use stationpack_core::sprite_group::{
    AdjustOp, DeterministicGroup, RandomizedGroup, RealGroup, SpriteGroup, TriggerMatch, VarScope,
};
use stationpack_core::tile::TilePos;
use stationpack_core::variable::{VarValue, common};
use tracing::debug;

/// Number of temp registers, including the output bank.
pub const NUM_TEMP_REGISTERS: usize = 0x110;

/// First register of the output bank returned with callback results.
pub const OUTPUT_REGISTER_BASE: usize = 0x100;

/// Sprite offset packs count station sprite blocks from.
pub const RAIL_PLATFORM_Y_FRONT: u32 = 0x42D;

/// `param1` value selecting foundation sprites.
const FOUNDATION_PARAM: u32 = 2;

/// Output register bank of a callback.
pub type OutputRegisters = [i32; NUM_OUTPUT_REGISTERS];

// ---------------------------------------------------------------------------
// StationResolver
// ---------------------------------------------------------------------------

/// Per-request resolution state.
pub struct StationResolver<'w> {
    scope: StationScope<'w>,
    town_scope: OnceCell<Option<TownScopeResolver<'w>>>,
    root: Option<&'w SpriteGroup>,
    pub callback: CallbackId,
    pub param1: u32,
    pub param2: u32,
    registers: [i32; NUM_TEMP_REGISTERS],
    last_value: u32,
    waiting_triggers: u8,
    used_triggers: u8,
    reseed: [u32; 2],
}

impl<'w> StationResolver<'w> {
    /// Set up a request. `station` is `None` for previews of stations that
    /// do not exist yet.
    pub fn new(
        world: World<'w>,
        spec: &'w StationSpec,
        station: Option<StationId>,
        tile: Option<TilePos>,
        callback: CallbackId,
        param1: u32,
        param2: u32,
    ) -> Self {
        let mut scope = StationScope::new(world, spec, station, tile);

        let mut key = match scope.station {
            None => CargoKey::Purchase,
            Some((_, st)) if !st.is_waypoint() => spec
                .sprite_groups
                .cargo_keys()
                .find(|&c| st.waiting(c) > 0)
                .map(CargoKey::Cargo)
                .unwrap_or(CargoKey::DefaultNoCargo),
            Some(_) => CargoKey::DefaultNoCargo,
        };
        let mut root = spec.sprite_groups.get(key);
        if root.is_none() {
            key = CargoKey::Default;
            root = spec.sprite_groups.get(key);
        }
        scope.cargo_key = key;

        let waiting_triggers = scope
            .station
            .map(|(_, st)| st.waiting_random_triggers.bits())
            .unwrap_or(0);

        Self {
            scope,
            town_scope: OnceCell::new(),
            root: root.map(|g| &**g),
            callback,
            param1,
            param2,
            registers: [0; NUM_TEMP_REGISTERS],
            last_value: 0,
            waiting_triggers,
            used_triggers: 0,
            reseed: [0; 2],
        }
    }

    pub fn cargo_key(&self) -> CargoKey {
        self.scope.cargo_key
    }

    pub fn cache(&self) -> &VariableCache {
        self.scope.cache()
    }

    /// Mark the station being planned as running along `axis`.
    pub fn set_axis(&mut self, axis: stationpack_core::tile::Axis) {
        self.scope.axis = Some(axis);
    }

    #[cfg(test)]
    fn set_waiting_triggers(&mut self, triggers: u8) {
        self.waiting_triggers = triggers;
    }

    /// Random triggers consumed by the last resolve.
    pub fn used_triggers(&self) -> u8 {
        self.used_triggers
    }

    /// Union of the reseed masks of all scopes from the last resolve.
    pub fn reseed_sum(&self) -> u32 {
        self.reseed.iter().fold(0, |acc, r| acc | r)
    }

    pub fn register(&self, index: usize) -> i32 {
        self.registers.get(index).copied().unwrap_or(0)
    }

    pub fn output_registers(&self) -> OutputRegisters {
        let mut out = [0; NUM_OUTPUT_REGISTERS];
        out.copy_from_slice(
            &self.registers[OUTPUT_REGISTER_BASE..OUTPUT_REGISTER_BASE + NUM_OUTPUT_REGISTERS],
        );
        out
    }

    /// The town scope, created on first use.
    pub fn town_scope(&self) -> Option<&TownScopeResolver<'w>> {
        self.town_scope
            .get_or_init(|| {
                let towns = self.scope.world.ctx.towns;
                let town = match self.scope.station {
                    Some((_, st)) => st.town.and_then(|id| towns.town(id)),
                    None => self.scope.tile.and_then(|t| towns.closest_town(t)),
                };
                town.map(TownScopeResolver::new)
            })
            .as_ref()
    }

    fn random_bits(&self, scope: VarScope) -> u32 {
        match scope {
            VarScope::SelfScope => self.scope.random_bits(),
            VarScope::Parent => 0,
        }
    }

    fn random_triggers(&self, scope: VarScope) -> u32 {
        match scope {
            VarScope::SelfScope => self
                .scope
                .station
                .map(|(_, st)| st.waiting_random_triggers.bits() as u32)
                .unwrap_or(0),
            VarScope::Parent => 0,
        }
    }

    /// Read a variable in `scope`. Common variables come first.
    pub fn variable(&mut self, scope: VarScope, variable: u8, parameter: u32) -> VarValue {
        match variable {
            common::CALLBACK => VarValue::new(self.callback.code() as u32),
            common::PARAM1 => VarValue::new(self.param1),
            common::PARAM2 => VarValue::new(self.param2),
            common::ALL_ONES => VarValue::new(u32::MAX),
            common::LAST_VALUE => VarValue::new(self.last_value),
            common::RANDOM_AND_TRIGGERS => {
                VarValue::new(self.random_bits(scope) << 8 | self.random_triggers(scope))
            }
            common::TEMP_REGISTER => VarValue::new(self.register(parameter as usize) as u32),
            _ => match scope {
                VarScope::SelfScope => self.scope.variable(variable, parameter),
                VarScope::Parent => match self.town_scope() {
                    Some(town) => town.variable(variable, parameter),
                    None => VarValue::UNAVAILABLE,
                },
            },
        }
    }

    fn store(&mut self, index: u32, value: u32) {
        if let Some(reg) = self.registers.get_mut(index as usize) {
            *reg = value as i32;
        }
    }

    // -- Tree walk ---------------------------------------------------------

    /// Walk the tree from the root and return the leaf reached. Registers
    /// start at zero for every walk.
    pub fn resolve(&mut self) -> Option<&'w SpriteGroup> {
        self.registers = [0; NUM_TEMP_REGISTERS];
        self.last_value = 0;
        self.used_triggers = 0;
        self.reseed = [0; 2];
        let root = self.root?;
        self.resolve_group(root)
    }

    /// Resolve as a callback: the result of a callback leaf, or
    /// [`CALLBACK_FAILED`], together with the output register bank.
    pub fn resolve_callback(&mut self) -> (u16, OutputRegisters) {
        match self.resolve() {
            Some(SpriteGroup::CallbackResult(result)) => (*result, self.output_registers()),
            _ => {
                debug!(
                    callback = ?self.callback,
                    spec = self.scope.spec.local_id,
                    "callback not answered"
                );
                (CALLBACK_FAILED, self.output_registers())
            }
        }
    }

    /// Resolve for random-trigger bookkeeping only.
    pub fn resolve_rerandomisation(&mut self) {
        let _ = self.resolve();
    }

    fn resolve_group(&mut self, group: &'w SpriteGroup) -> Option<&'w SpriteGroup> {
        match group {
            SpriteGroup::Deterministic(det) => self.resolve_deterministic(det),
            SpriteGroup::Randomized(rnd) => self.resolve_randomized(rnd),
            SpriteGroup::Real(real) => self.resolve_real(real),
            SpriteGroup::CallbackResult(_) | SpriteGroup::Result { .. } => Some(group),
        }
    }

    fn resolve_child(&mut self, child: Option<&'w SpriteGroup>) -> Option<&'w SpriteGroup> {
        child.and_then(|g| self.resolve_group(g))
    }

    fn resolve_deterministic(&mut self, group: &'w DeterministicGroup) -> Option<&'w SpriteGroup> {
        let mut last = 0u32;
        for adjust in &group.adjusts {
            let var = self.variable(group.scope, adjust.variable, adjust.parameter);
            if !var.available {
                return self.resolve_child(group.default.as_deref());
            }
            let value = var.value.checked_shr(adjust.shift as u32).unwrap_or(0) & adjust.and_mask;
            last = match adjust.op {
                AdjustOp::Store => {
                    self.store(value, last);
                    last
                }
                op => op.apply(last, value),
            };
        }
        self.last_value = last;

        let chosen = group
            .ranges
            .iter()
            .find(|r| r.low <= last && last <= r.high)
            .map(|r| r.group.as_deref())
            .unwrap_or(group.default.as_deref());
        self.resolve_child(chosen)
    }

    fn resolve_randomized(&mut self, group: &'w RandomizedGroup) -> Option<&'w SpriteGroup> {
        let mask = group.random_mask();

        if self.callback == CallbackId::RandomTrigger {
            let waiting = match group.scope {
                VarScope::SelfScope => self.waiting_triggers,
                VarScope::Parent => 0,
            };
            let matched = group.triggers & waiting;
            let fires = match group.cmp_mode {
                TriggerMatch::Any => matched != 0,
                TriggerMatch::All => matched == group.triggers,
            };
            if fires {
                self.used_triggers |= matched;
                self.reseed[group.scope.index()] |= mask;
            }
        }

        let bits = self.random_bits(group.scope) & mask;
        let index = bits.checked_shr(group.lowest_randbit as u32).unwrap_or(0) as usize;
        let child = group.groups.get(index).and_then(|g| g.as_deref());
        self.resolve_child(child)
    }

    fn resolve_real(&mut self, group: &'w RealGroup) -> Option<&'w SpriteGroup> {
        match self.scope.station {
            Some((_, st)) if !st.is_waypoint() => {
                let spec = self.scope.spec;
                let amount = cargo_amount(st, spec, self.scope.cargo_key);
                select_real(group, amount, spec.cargo_threshold)
            }
            _ => group.loading.first().map(|g| &**g),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run `callback` for a spec on a station tile, or on a planned one when
/// `station` is `None`.
pub fn resolve_callback<'w>(
    world: World<'w>,
    spec: &'w StationSpec,
    station: Option<StationId>,
    tile: Option<TilePos>,
    callback: CallbackId,
    param1: u32,
    param2: u32,
) -> (u16, OutputRegisters) {
    StationResolver::new(world, spec, station, tile, callback, param1, param2).resolve_callback()
}

/// First sprite of the block a tile draws with, relative to
/// [`RAIL_PLATFORM_Y_FRONT`]. `var10` is 1 when resolving the ground sprite
/// of specs with separate ground sprites.
pub fn custom_station_relocation<'w>(
    world: World<'w>,
    spec: &'w StationSpec,
    station: Option<StationId>,
    tile: Option<TilePos>,
    var10: u32,
) -> Option<u32> {
    let mut resolver =
        StationResolver::new(world, spec, station, tile, CallbackId::NoCallback, var10, 0);
    match resolver.resolve() {
        Some(SpriteGroup::Result {
            sprite,
            num_sprites,
        }) if *num_sprites > 0 => Some(sprite.wrapping_sub(RAIL_PLATFORM_Y_FRONT)),
        _ => None,
    }
}

/// First sprite of a custom foundation set, offset by register 0x100.
/// `None` means default foundations are drawn.
pub fn custom_station_foundation<'w>(
    world: World<'w>,
    spec: &'w StationSpec,
    station: Option<StationId>,
    tile: Option<TilePos>,
    layout: u32,
    edge_info: u32,
) -> Option<u32> {
    let mut resolver = StationResolver::new(
        world,
        spec,
        station,
        tile,
        CallbackId::NoCallback,
        FOUNDATION_PARAM,
        layout | edge_info << 16,
    );
    let group = resolver.resolve();
    let offset = resolver.register(OUTPUT_REGISTER_BASE) as u32;
    match group {
        Some(SpriteGroup::Result {
            sprite,
            num_sprites,
        }) if (*num_sprites as u32) > offset => Some(sprite + offset),
        _ => None,
    }
}
