//! Spatial side of station customization: the map grid collaborator,
//! trigger areas, platform geometry and land information.
//!
//! The engine never owns the map. Everything here works through the
//! [`TileGrid`] trait; [`TileMap`] is an in-memory implementation for tools
//! and tests.

pub mod area;
pub mod grid;
pub mod land;
pub mod platform;

pub use area::{TriggerArea, compute_area, is_compatible_platform_tile};
pub use grid::{PlayedSound, StationTile, TileData, TileGrid, TileKind, TileMap, TrackBits};
pub use land::{land_info, land_info_for_axis, nearby_tile, void_land_info};
pub use platform::{
    PlatformLayout, find_rail_station_end, platform_info, platform_info_at, platform_layout_at,
    rail_continuation_info,
};
