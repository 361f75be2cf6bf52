//! Choice between the "loaded" and "loading" sprite sets of a real group.

use stationpack_core::spec::{CargoKey, StationSpec, StationSpecFlag};
use stationpack_core::sprite_group::{RealGroup, SpriteGroup};
use stationpack_core::station::Station;

/// Cargo amounts are clamped to this before selection.
pub const MAX_CARGO_AMOUNT: u32 = 0xFFF;

/// The cargo amount a real group sees for `key`, after the station-size
/// divisor and the clamp.
pub fn cargo_amount(station: &Station, spec: &StationSpec, key: CargoKey) -> u32 {
    let mut amount = match key {
        CargoKey::Cargo(cargo) => station.waiting(cargo),
        CargoKey::Default => station.total_waiting(),
        CargoKey::DefaultNoCargo | CargoKey::Purchase => 0,
    };

    if spec.has_flag(StationSpecFlag::DivByStationSize) {
        let size = station.rail_area.width + station.rail_area.height;
        if size > 0 {
            amount /= size;
        }
    }
    amount.min(MAX_CARGO_AMOUNT)
}

/// Pick a sprite set for `amount` cargo: above `threshold` from the loading
/// list, otherwise from the loaded list, each scaled evenly over its range.
/// An empty list falls back to the first loading set.
pub fn select_real(group: &RealGroup, amount: u32, threshold: u16) -> Option<&SpriteGroup> {
    let threshold = threshold as u32;

    if amount > threshold {
        if !group.loading.is_empty() {
            let set = (amount - threshold) as usize * group.loading.len()
                / (4096u32.saturating_sub(threshold).max(1)) as usize;
            return group.loading.get(set).map(|g| &**g);
        }
    } else if !group.loaded.is_empty() {
        let set = amount as usize * group.loaded.len() / (threshold + 1) as usize;
        return group.loaded.get(set).map(|g| &**g);
    }

    group.loading.first().map(|g| &**g)
}
