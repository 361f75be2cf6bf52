//! Callback identifiers and the per-spec callback enablement mask.

use serde::{Deserialize, Serialize};

/// Result code meaning "the pack declines to override; use default behaviour".
pub const CALLBACK_FAILED: u16 = 0xFFFF;

/// Number of output registers returned alongside a callback result.
pub const NUM_OUTPUT_REGISTERS: usize = 16;

/// Callbacks a station spec can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackId {
    /// Plain sprite resolution, no callback.
    NoCallback,
    /// Internal: random trigger resolution.
    RandomTrigger,
    Availability,
    DrawTileLayout,
    BuildTileLayout,
    /// Animation start/stop, fired by animation triggers.
    AnimationTrigger,
    AnimationNextFrame,
    AnimationSpeed,
    LandSlopeCheck,
}

impl CallbackId {
    /// Numeric id as exposed to packs through variable 0x0C.
    pub fn code(self) -> u16 {
        match self {
            CallbackId::NoCallback => 0x00,
            CallbackId::RandomTrigger => 0x01,
            CallbackId::Availability => 0x13,
            CallbackId::DrawTileLayout => 0x14,
            CallbackId::BuildTileLayout => 0x24,
            CallbackId::AnimationTrigger => 0x140,
            CallbackId::AnimationNextFrame => 0x141,
            CallbackId::AnimationSpeed => 0x142,
            CallbackId::LandSlopeCheck => 0x149,
        }
    }
}

/// Individual callbacks a spec can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationCallback {
    Available = 0,
    DrawTileLayout = 1,
    AnimationNextFrame = 2,
    AnimationSpeed = 3,
    SlopeCheck = 4,
}

/// Bitmask of enabled callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CallbackMask(pub u16);

impl CallbackMask {
    pub fn contains(self, cb: StationCallback) -> bool {
        self.0 & (1 << cb as u16) != 0
    }

    pub fn insert(&mut self, cb: StationCallback) {
        self.0 |= 1 << cb as u16;
    }
}

impl FromIterator<StationCallback> for CallbackMask {
    fn from_iter<I: IntoIterator<Item = StationCallback>>(iter: I) -> Self {
        let mut mask = CallbackMask::default();
        for cb in iter {
            mask.insert(cb);
        }
        mask
    }
}
