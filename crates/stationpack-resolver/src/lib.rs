//! Stationpack Resolver -- the resolution engine for customized stations.
//!
//! Given a spec and a station tile (or a station still being planned), the
//! engine walks the spec's sprite-group tree to answer callbacks and pick
//! sprites, and keeps per-station spec slots, trigger caches, random bits
//! and tile animation up to date.
//!
//! # Key Types
//!
//! - [`resolver::StationResolver`] -- One resolution request: registers,
//!   last value and random-trigger bookkeeping.
//! - [`variables::StationScope`] -- Station variables as packs read them,
//!   with the per-request [`variables::VariableCache`].
//! - [`town_scope::TownScopeResolver`] -- Variables of the station's town.
//! - [`world::World`] -- Read-only view of everything a request reads.
//! - [`trigger::TriggerReport`] -- What a trigger dispatch did.
//!
//! Mutating entry points ([`allocator`], [`trigger`], [`animation`]) take
//! the station pool and map separately from the read-only
//! [`world::GameContext`].

pub mod allocator;
pub mod animation;
pub mod resolver;
pub mod selector;
pub mod slope;
pub mod town_scope;
pub mod trigger;
pub mod variables;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use allocator::{allocate_spec_to_station, deallocate_spec_from_station, update_cached_triggers};
pub use animation::{animate_station_tile, apply_animation_trigger_result};
pub use resolver::{
    OutputRegisters, StationResolver, custom_station_foundation, custom_station_relocation,
    resolve_callback,
};
pub use slope::{LocationError, perform_slope_check};
pub use trigger::{TriggerReport, trigger_station_animation, trigger_station_randomisation};
pub use world::{GameContext, World};
