//! Cargo types, cargo bitmasks and per-pack cargo translation.

use serde::{Deserialize, Serialize};

/// Number of cargo types the simulation supports.
pub const NUM_CARGO: usize = 64;

/// Identifies a global (simulation-wide) cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CargoType(pub u8);

impl CargoType {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self.index() < NUM_CARGO
    }
}

/// A set of cargo types, one bit per cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CargoTypes(pub u64);

impl CargoTypes {
    pub const EMPTY: CargoTypes = CargoTypes(0);

    pub fn contains(self, cargo: CargoType) -> bool {
        cargo.is_valid() && self.0 & (1u64 << cargo.0) != 0
    }

    pub fn insert(&mut self, cargo: CargoType) {
        if cargo.is_valid() {
            self.0 |= 1u64 << cargo.0;
        }
    }

    pub fn union(self, other: CargoTypes) -> CargoTypes {
        CargoTypes(self.0 | other.0)
    }

    pub fn difference(self, other: CargoTypes) -> CargoTypes {
        CargoTypes(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = CargoType> {
        (0..NUM_CARGO as u8)
            .map(CargoType)
            .filter(move |&c| self.contains(c))
    }
}

impl FromIterator<CargoType> for CargoTypes {
    fn from_iter<I: IntoIterator<Item = CargoType>>(iter: I) -> Self {
        let mut set = CargoTypes::EMPTY;
        for cargo in iter {
            set.insert(cargo);
        }
        set
    }
}

/// Maps between a pack's local cargo numbering and global cargo types.
///
/// A pack without a translation table addresses global cargo types directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CargoTranslation {
    local_to_global: Vec<Option<CargoType>>,
}

impl CargoTranslation {
    /// Identity mapping.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a table where entry `i` is the global cargo for local index `i`.
    pub fn from_table(local_to_global: Vec<Option<CargoType>>) -> Self {
        Self { local_to_global }
    }

    /// Translate a pack-local cargo index into a global cargo type.
    pub fn to_global(&self, local: u8) -> Option<CargoType> {
        if self.local_to_global.is_empty() {
            let cargo = CargoType(local);
            return cargo.is_valid().then_some(cargo);
        }
        self.local_to_global.get(local as usize).copied().flatten()
    }

    /// Translate a global cargo type into the pack's local index.
    ///
    /// Cargo types the pack does not know map to `0xFF`.
    pub fn to_local(&self, cargo: CargoType) -> u8 {
        if self.local_to_global.is_empty() {
            return if cargo.is_valid() { cargo.0 } else { 0xFF };
        }
        self.local_to_global
            .iter()
            .position(|&c| c == Some(cargo))
            .map(|i| i.min(0xFE) as u8)
            .unwrap_or(0xFF)
    }
}
