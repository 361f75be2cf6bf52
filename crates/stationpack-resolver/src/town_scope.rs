//! Parent scope of a station: the town it belongs to.

use stationpack_core::directory::Town;
use stationpack_core::variable::VarValue;
use tracing::debug;

/// Town variables readable by station packs.
pub struct TownScopeResolver<'w> {
    town: &'w Town,
}

impl<'w> TownScopeResolver<'w> {
    pub fn new(town: &'w Town) -> Self {
        Self { town }
    }

    pub fn variable(&self, variable: u8, _parameter: u32) -> VarValue {
        let t = self.town;
        let value = match variable {
            0x41 => t.id.0 as u32,
            0x82 => t.population.min(0xFFFF),
            0x83 => (t.population.min(0xFFFF) >> 8) & 0xFF,
            0x92 => t.flags as u32,
            0x93 => 0,
            0xB6 => t.num_houses as u32,
            0xB7 => (t.num_houses >> 8) as u32,
            _ => {
                debug!(variable = format_args!("0x{variable:02X}"), "unhandled town variable");
                return VarValue::UNAVAILABLE;
            }
        };
        VarValue::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationpack_core::id::TownId;
    use stationpack_core::tile::TilePos;

    #[test]
    fn population_is_clamped() {
        let mut town = Town::new(TownId(3), TilePos::new(0, 0), 70_000);
        town.num_houses = 0x1234;
        town.flags = 0x5;
        let scope = TownScopeResolver::new(&town);
        assert_eq!(scope.variable(0x41, 0).value, 3);
        assert_eq!(scope.variable(0x82, 0).value, 0xFFFF);
        assert_eq!(scope.variable(0x83, 0).value, 0xFF);
        assert_eq!(scope.variable(0x92, 0).value, 5);
        assert_eq!(scope.variable(0xB6, 0).value, 0x1234);
        assert_eq!(scope.variable(0xB7, 0).value, 0x12);
    }

    #[test]
    fn unknown_is_unavailable() {
        let town = Town::new(TownId(0), TilePos::new(0, 0), 10);
        let scope = TownScopeResolver::new(&town);
        assert_eq!(scope.variable(0xC0, 0), VarValue::UNAVAILABLE);
        assert_eq!(scope.variable(0x93, 0), VarValue::new(0));
    }
}
