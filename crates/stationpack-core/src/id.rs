use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a station spec in the registry arena.
    pub struct SpecId;

    /// Identifies a station (or waypoint) in the station pool.
    pub struct StationId;
}

/// Identifies a customization pack. Zero is reserved for "no pack".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PackId(pub u32);

impl PackId {
    pub const NONE: PackId = PackId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Index of a station class in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationClassId(pub u16);

/// Four-byte label naming a station class, e.g. `DFLT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassLabel(pub [u8; 4]);

impl ClassLabel {
    pub const DEFAULT: ClassLabel = ClassLabel(*b"DFLT");
    pub const WAYPOINT: ClassLabel = ClassLabel(*b"WAYP");

    /// Build a label from a string of up to four bytes, padding with spaces.
    pub fn from_str_padded(s: &str) -> Self {
        let mut bytes = [b' '; 4];
        for (dst, src) in bytes.iter_mut().zip(s.bytes()) {
            *dst = src;
        }
        ClassLabel(bytes)
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// Identifies a town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TownId(pub u16);

/// Identifies a company (station owner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub u8);

impl CompanyId {
    /// Owner used for tiles and stations belonging to nobody.
    pub const NONE: CompanyId = CompanyId(0x10);
}
