//! Stationpack Core -- data model of the station customization engine.
//!
//! Customization packs override the look and behaviour of rail-station
//! tiles. This crate holds everything the resolution engine reads and
//! writes, without any resolution logic of its own.
//!
//! # Key Types
//!
//! - [`spec::StationSpec`] -- Pack-authored descriptor of a station tile type,
//!   owning its [`sprite_group::SpriteGroup`] decision trees.
//! - [`registry::SpecRegistry`] -- Immutable class-partitioned spec table,
//!   built once through [`registry::SpecRegistryBuilder`].
//! - [`station::Station`] -- Live station state: spec slots, goods, random
//!   bits and derived trigger caches.
//! - [`tile::TileArea`] -- Rectangles of tiles that triggers propagate over.
//! - [`directory::TownDirectory`] / [`directory::CompanyDirectory`] -- Narrow
//!   views of the town and company data models.
//! - [`rng::RandomSource`] -- Where trigger dispatch draws random bits from.

pub mod callback;
pub mod cargo;
pub mod directory;
pub mod id;
pub mod registry;
pub mod rng;
pub mod spec;
pub mod sprite_group;
pub mod station;
pub mod tile;
pub mod trigger;
pub mod variable;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
