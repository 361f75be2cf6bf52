//! Animation and randomisation trigger kinds and their bitsets.

use serde::{Deserialize, Serialize};

/// Events that may start or advance a station tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationAnimationTrigger {
    Built = 0,
    NewCargo = 1,
    CargoTaken = 2,
    VehicleArrives = 3,
    VehicleDeparts = 4,
    VehicleLoads = 5,
    AcceptanceTick = 6,
    TileLoop = 7,
    PathReservation = 8,
}

impl StationAnimationTrigger {
    pub const COUNT: usize = 9;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Events that may re-randomise station and tile random bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationRandomTrigger {
    NewCargo = 0,
    CargoTaken = 1,
    VehicleArrives = 2,
    VehicleDeparts = 3,
    VehicleLoads = 4,
    PathReservation = 5,
}

impl StationRandomTrigger {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Set of animation triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AnimationTriggers(pub u16);

impl AnimationTriggers {
    pub const EMPTY: AnimationTriggers = AnimationTriggers(0);

    pub fn contains(self, trigger: StationAnimationTrigger) -> bool {
        self.0 & (1 << trigger.index()) != 0
    }

    pub fn insert(&mut self, trigger: StationAnimationTrigger) {
        self.0 |= 1 << trigger.index();
    }

    pub fn union(self, other: AnimationTriggers) -> AnimationTriggers {
        AnimationTriggers(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<StationAnimationTrigger> for AnimationTriggers {
    fn from_iter<I: IntoIterator<Item = StationAnimationTrigger>>(iter: I) -> Self {
        let mut set = AnimationTriggers::EMPTY;
        for t in iter {
            set.insert(t);
        }
        set
    }
}

/// Set of random triggers. Exposed to packs through variable 0x5F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RandomTriggers(pub u8);

impl RandomTriggers {
    pub const EMPTY: RandomTriggers = RandomTriggers(0);

    pub fn contains(self, trigger: StationRandomTrigger) -> bool {
        self.0 & (1 << trigger.index()) != 0
    }

    pub fn insert(&mut self, trigger: StationRandomTrigger) {
        self.0 |= 1 << trigger.index();
    }

    /// Add all triggers of `other`.
    pub fn set_all(&mut self, other: RandomTriggers) {
        self.0 |= other.0;
    }

    /// Remove all triggers of `other`.
    pub fn reset(&mut self, other: RandomTriggers) {
        self.0 &= !other.0;
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_trigger_set() {
        let set: AnimationTriggers = [
            StationAnimationTrigger::Built,
            StationAnimationTrigger::PathReservation,
        ]
        .into_iter()
        .collect();
        assert!(set.contains(StationAnimationTrigger::Built));
        assert!(set.contains(StationAnimationTrigger::PathReservation));
        assert!(!set.contains(StationAnimationTrigger::TileLoop));
        assert_eq!(set.0, 0b1_0000_0001);
    }

    #[test]
    fn random_trigger_set_and_reset() {
        let mut waiting = RandomTriggers::EMPTY;
        waiting.insert(StationRandomTrigger::NewCargo);
        waiting.insert(StationRandomTrigger::VehicleLoads);
        assert_eq!(waiting.bits(), 0b1_0001);

        waiting.reset(RandomTriggers(0b1));
        assert!(!waiting.contains(StationRandomTrigger::NewCargo));
        assert!(waiting.contains(StationRandomTrigger::VehicleLoads));
    }
}
