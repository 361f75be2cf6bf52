//! Stationpack Data -- loads station packs from RON, TOML or JSON files.
//!
//! A pack file lists named sprite groups and the specs built from them.
//! [`load_pack_file`] and [`load_pack_dir`] resolve the names into shared
//! trees and return a ready [`SpecRegistry`](stationpack_core::registry::SpecRegistry).

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, load_pack_dir, load_pack_file, register_pack};
