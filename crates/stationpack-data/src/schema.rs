//! Serde data file structs for station packs.
//!
//! A pack file describes one customization pack: its cargo table, the
//! classes it adds, a list of named sprite groups, and the station specs
//! built from them. Groups refer to each other and are referenced by specs
//! by name; the loader resolves the names into shared trees.

use serde::Deserialize;
use stationpack_core::callback::StationCallback;
use stationpack_core::spec::{AnimationStatus, MODERN_FORMAT_VERSION, StationSpecFlag};
use stationpack_core::sprite_group::{AdjustOp, VarScope};
use stationpack_core::trigger::StationAnimationTrigger;

// ===========================================================================
// Pack
// ===========================================================================

/// A whole pack file.
#[derive(Debug, Clone, Deserialize)]
pub struct PackData {
    /// Pack id, unique among loaded packs.
    pub id: u32,
    #[serde(default = "default_format_version")]
    pub format_version: u8,
    /// Global cargo type of each local cargo index. Empty means the pack
    /// uses global cargo numbers directly.
    #[serde(default)]
    pub cargo_table: Vec<Option<u8>>,
    #[serde(default)]
    pub classes: Vec<ClassData>,
    #[serde(default)]
    pub groups: Vec<NamedGroupData>,
    #[serde(default)]
    pub specs: Vec<SpecData>,
}

fn default_format_version() -> u8 {
    MODERN_FORMAT_VERSION
}

/// Display name of a class the pack adds or renames.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassData {
    /// Up to four characters.
    pub label: String,
    pub name: String,
}

// ===========================================================================
// Sprite groups
// ===========================================================================

/// A sprite group with the name other groups and specs refer to it by.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedGroupData {
    pub name: String,
    pub group: GroupData,
}

/// One node of a sprite-group tree. Children are group names.
#[derive(Debug, Clone, Deserialize)]
pub enum GroupData {
    Callback(u16),
    Sprites {
        sprite: u32,
        count: u16,
    },
    Real {
        #[serde(default)]
        loaded: Vec<String>,
        #[serde(default)]
        loading: Vec<String>,
    },
    Deterministic {
        #[serde(default)]
        scope: VarScope,
        adjusts: Vec<AdjustData>,
        #[serde(default)]
        ranges: Vec<RangeData>,
        #[serde(default)]
        default: Option<String>,
    },
    Randomized {
        #[serde(default)]
        scope: VarScope,
        #[serde(default)]
        triggers: u8,
        /// Fire only when every trigger is waiting.
        #[serde(default)]
        match_all: bool,
        #[serde(default)]
        lowest_bit: u8,
        /// A power-of-two number of children.
        groups: Vec<Option<String>>,
    },
}

/// One step of a deterministic group's adjust chain.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustData {
    pub op: AdjustOp,
    pub variable: u8,
    #[serde(default)]
    pub parameter: u32,
    #[serde(default)]
    pub shift: u8,
    #[serde(default = "default_mask")]
    pub mask: u32,
}

fn default_mask() -> u32 {
    u32::MAX
}

/// An inclusive value range of a deterministic group.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeData {
    pub low: u32,
    pub high: u32,
    #[serde(default)]
    pub group: Option<String>,
}

// ===========================================================================
// Specs
// ===========================================================================

/// A station spec definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecData {
    pub name: String,
    /// Label of the class the spec joins, `DFLT` if absent.
    #[serde(default)]
    pub class: Option<String>,
    pub local_id: u16,
    #[serde(default)]
    pub flags: Vec<StationSpecFlag>,
    #[serde(default)]
    pub callbacks: Vec<StationCallback>,
    #[serde(default)]
    pub cargo_threshold: u16,
    /// Local cargo indices whose events rerandomise the spec.
    #[serde(default)]
    pub cargo_triggers: Vec<u8>,
    #[serde(default)]
    pub animation: Option<AnimationData>,
    /// Root groups, keyed by cargo situation.
    pub sprites: Vec<SpriteRootData>,
}

/// Animation properties of a spec.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationData {
    pub frames: u8,
    pub status: AnimationStatus,
    #[serde(default)]
    pub speed: u8,
    #[serde(default)]
    pub triggers: Vec<StationAnimationTrigger>,
}

/// A root group of a spec.
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteRootData {
    pub key: RootKeyData,
    pub group: String,
}

/// Which cargo situation a root group serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RootKeyData {
    /// A pack-local cargo index.
    Cargo(u8),
    Default,
    DefaultNoCargo,
    Purchase,
}
