//! Narrow read-only views of the town and company data models.

use crate::id::{CompanyId, TownId};
use crate::tile::TilePos;

/// Town fields exposed to station packs through the town scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Town {
    pub id: TownId,
    pub xy: TilePos,
    pub population: u32,
    pub flags: u8,
    pub num_houses: u16,
}

impl Town {
    pub fn new(id: TownId, xy: TilePos, population: u32) -> Self {
        Self {
            id,
            xy,
            population,
            flags: 0,
            num_houses: 0,
        }
    }
}

/// Town lookup collaborator.
pub trait TownDirectory {
    fn town(&self, id: TownId) -> Option<&Town>;

    /// The town closest to `tile`, by Manhattan distance.
    fn closest_town(&self, tile: TilePos) -> Option<&Town>;
}

/// A plain list of towns.
#[derive(Debug, Clone, Default)]
pub struct TownList {
    pub towns: Vec<Town>,
}

impl TownDirectory for TownList {
    fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.iter().find(|t| t.id == id)
    }

    fn closest_town(&self, tile: TilePos) -> Option<&Town> {
        self.towns
            .iter()
            .min_by_key(|t| (t.xy.manhattan_distance(&tile), t.id.0))
    }
}

/// Primary and secondary company colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Livery {
    pub colour1: u8,
    pub colour2: u8,
}

/// Company lookup collaborator.
pub trait CompanyDirectory {
    fn livery(&self, company: CompanyId) -> Option<Livery>;

    fn is_ai(&self, company: CompanyId) -> bool;

    /// Owner, AI flag and livery packed the way packs read them.
    fn company_info(&self, company: CompanyId) -> u32 {
        let ai = if self.is_ai(company) { 0x1_0000 } else { 0 };
        let colours = self
            .livery(company)
            .map(|l| (l.colour1 as u32) << 24 | (l.colour2 as u32) << 28)
            .unwrap_or(0);
        company.0 as u32 | ai | colours
    }
}

/// Companies known by livery, indexed by company id.
#[derive(Debug, Clone, Default)]
pub struct CompanyList {
    pub liveries: Vec<Option<Livery>>,
    pub ai: Vec<CompanyId>,
}

impl CompanyDirectory for CompanyList {
    fn livery(&self, company: CompanyId) -> Option<Livery> {
        self.liveries.get(company.0 as usize).copied().flatten()
    }

    fn is_ai(&self, company: CompanyId) -> bool {
        self.ai.contains(&company)
    }
}
