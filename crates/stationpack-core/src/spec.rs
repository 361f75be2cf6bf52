//! Station spec descriptors and the packs that author them.

use crate::callback::{CallbackMask, StationCallback};
use crate::cargo::{CargoTranslation, CargoType, CargoTypes};
use crate::id::{PackId, StationClassId};
use crate::sprite_group::SpriteGroup;
use crate::trigger::AnimationTriggers;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pack format version from which slope-check result bit 10 keeps its
/// modern meaning and land info reports heights in whole levels.
pub const MODERN_FORMAT_VERSION: u8 = 8;

/// A loaded customization pack. Shared by all specs the pack defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFile {
    pub id: PackId,
    pub format_version: u8,
    pub cargo_translation: CargoTranslation,
}

impl PackFile {
    pub fn new(id: PackId, format_version: u8) -> Self {
        Self {
            id,
            format_version,
            cargo_translation: CargoTranslation::identity(),
        }
    }

    pub fn with_cargo_translation(mut self, translation: CargoTranslation) -> Self {
        self.cargo_translation = translation;
        self
    }

    pub fn is_modern(&self) -> bool {
        self.format_version >= MODERN_FORMAT_VERSION
    }
}

/// Behaviour flags of a station spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationSpecFlag {
    /// Ground sprites are resolved separately (var10 = 1).
    SeparateGround = 0,
    /// Divide cargo amounts by the station's rail width + height.
    DivByStationSize = 1,
    /// Pass random bits to the animation next-frame callback.
    Cb141RandomBits = 2,
    CustomFoundations = 3,
    ExtendedFoundations = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StationSpecFlags(pub u8);

impl StationSpecFlags {
    pub fn contains(self, flag: StationSpecFlag) -> bool {
        self.0 & (1 << flag as u8) != 0
    }

    pub fn insert(&mut self, flag: StationSpecFlag) {
        self.0 |= 1 << flag as u8;
    }
}

impl FromIterator<StationSpecFlag> for StationSpecFlags {
    fn from_iter<I: IntoIterator<Item = StationSpecFlag>>(iter: I) -> Self {
        let mut flags = StationSpecFlags::default();
        for f in iter {
            flags.insert(f);
        }
        flags
    }
}

/// What happens after the last animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationStatus {
    #[default]
    NoAnimation,
    NonLooping,
    Looping,
}

/// Animation properties of a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimationInfo {
    /// Index of the last frame.
    pub frames: u8,
    pub status: AnimationStatus,
    /// Frame delay exponent: one frame every `1 << speed` ticks.
    pub speed: u8,
    pub triggers: AnimationTriggers,
}

/// Key of a sprite-group tree in a spec's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CargoKey {
    Cargo(CargoType),
    /// Cargo-agnostic tree, sized by total cargo waiting.
    Default,
    /// Used when a station has no cargo the spec has a tree for.
    DefaultNoCargo,
    /// Used when there is no station yet (build menu preview).
    Purchase,
}

/// Sprite-group trees of a spec, in the order the pack declared them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpriteGroupTable {
    entries: Vec<(CargoKey, Arc<SpriteGroup>)>,
}

impl SpriteGroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tree for `key`, replacing an earlier one in place.
    pub fn insert(&mut self, key: CargoKey, group: Arc<SpriteGroup>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = group,
            None => self.entries.push((key, group)),
        }
    }

    pub fn get(&self, key: CargoKey) -> Option<&Arc<SpriteGroup>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, g)| g)
    }

    /// Cargo types with an explicit tree, in declaration order.
    pub fn cargo_keys(&self) -> impl Iterator<Item = CargoType> + '_ {
        self.entries.iter().filter_map(|(k, _)| match k {
            CargoKey::Cargo(c) => Some(*c),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An immutable station spec. Owned by the registry, referenced by stations
/// through [`SpecId`](crate::id::SpecId).
#[derive(Debug, Clone)]
pub struct StationSpec {
    pub name: String,
    pub class: StationClassId,
    /// Index of the spec within its pack.
    pub local_id: u16,
    pub pack: Arc<PackFile>,
    pub flags: StationSpecFlags,
    pub callback_mask: CallbackMask,
    pub cargo_threshold: u16,
    pub cargo_triggers: CargoTypes,
    pub animation: AnimationInfo,
    pub sprite_groups: SpriteGroupTable,
}

impl StationSpec {
    pub fn new(name: &str, class: StationClassId, local_id: u16, pack: Arc<PackFile>) -> Self {
        Self {
            name: name.to_string(),
            class,
            local_id,
            pack,
            flags: StationSpecFlags::default(),
            callback_mask: CallbackMask::default(),
            cargo_threshold: 0,
            cargo_triggers: CargoTypes::EMPTY,
            animation: AnimationInfo::default(),
            sprite_groups: SpriteGroupTable::new(),
        }
    }

    pub fn has_callback(&self, cb: StationCallback) -> bool {
        self.callback_mask.contains(cb)
    }

    pub fn has_flag(&self, flag: StationSpecFlag) -> bool {
        self.flags.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_preserves_declaration_order() {
        let mut table = SpriteGroupTable::new();
        table.insert(CargoKey::Cargo(CargoType(7)), SpriteGroup::sprites(1, 1));
        table.insert(CargoKey::Default, SpriteGroup::sprites(2, 1));
        table.insert(CargoKey::Cargo(CargoType(2)), SpriteGroup::sprites(3, 1));

        let cargos: Vec<_> = table.cargo_keys().collect();
        assert_eq!(cargos, vec![CargoType(7), CargoType(2)]);
    }

    #[test]
    fn table_insert_replaces() {
        let mut table = SpriteGroupTable::new();
        table.insert(CargoKey::Default, SpriteGroup::sprites(1, 1));
        table.insert(CargoKey::Default, SpriteGroup::sprites(9, 1));
        assert_eq!(table.len(), 1);
        assert_eq!(
            **table.get(CargoKey::Default).unwrap(),
            SpriteGroup::Result {
                sprite: 9,
                num_sprites: 1
            }
        );
        assert!(table.get(CargoKey::Purchase).is_none());
    }

    #[test]
    fn flags_membership() {
        let flags: StationSpecFlags = [StationSpecFlag::DivByStationSize].into_iter().collect();
        assert!(flags.contains(StationSpecFlag::DivByStationSize));
        assert!(!flags.contains(StationSpecFlag::SeparateGround));
    }

    #[test]
    fn pack_version_gate() {
        assert!(PackFile::new(PackId(1), 8).is_modern());
        assert!(!PackFile::new(PackId(1), 7).is_modern());
    }
}
