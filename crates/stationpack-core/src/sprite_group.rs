//! Sprite-group decision trees authored by customization packs.
//!
//! A pack describes each station spec as a tree of sprite groups. Resolution
//! walks the tree from the root: deterministic groups branch on variable
//! values, randomized groups branch on random bits, real groups choose a
//! sprite set by cargo amount, and leaves either name a sprite block or carry
//! a callback result. Subtrees are shared between specs via `Arc`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which scope a group reads its variables and random bits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VarScope {
    /// The station tile itself.
    #[default]
    SelfScope,
    /// The town the station belongs to.
    Parent,
}

impl VarScope {
    pub fn index(self) -> usize {
        match self {
            VarScope::SelfScope => 0,
            VarScope::Parent => 1,
        }
    }
}

/// Operation combining the accumulator with the next adjusted variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustOp {
    Add,
    Sub,
    SignedMin,
    SignedMax,
    UnsignedMin,
    UnsignedMax,
    Mul,
    And,
    Or,
    Xor,
    /// Store the accumulator in the temp register named by the value.
    Store,
    /// Replace the accumulator with the value.
    Restore,
    ShiftLeft,
    ShiftRight,
    RotateRight,
    /// 0 if less, 1 if equal, 2 if greater (signed).
    SignedCompare,
    /// 0 if less, 1 if equal, 2 if greater (unsigned).
    UnsignedCompare,
}

impl AdjustOp {
    /// Combine the accumulator `last` with the adjusted variable value.
    ///
    /// `Store` is handled by the resolver since it needs register access;
    /// here it leaves the accumulator unchanged.
    pub fn apply(self, last: u32, value: u32) -> u32 {
        match self {
            AdjustOp::Add => last.wrapping_add(value),
            AdjustOp::Sub => last.wrapping_sub(value),
            AdjustOp::SignedMin => (last as i32).min(value as i32) as u32,
            AdjustOp::SignedMax => (last as i32).max(value as i32) as u32,
            AdjustOp::UnsignedMin => last.min(value),
            AdjustOp::UnsignedMax => last.max(value),
            AdjustOp::Mul => last.wrapping_mul(value),
            AdjustOp::And => last & value,
            AdjustOp::Or => last | value,
            AdjustOp::Xor => last ^ value,
            AdjustOp::Store => last,
            AdjustOp::Restore => value,
            AdjustOp::ShiftLeft => last.wrapping_shl(value & 0x1F),
            AdjustOp::ShiftRight => last.wrapping_shr(value & 0x1F),
            AdjustOp::RotateRight => last.rotate_right(value & 0x1F),
            AdjustOp::SignedCompare => compare((last as i32).cmp(&(value as i32))),
            AdjustOp::UnsignedCompare => compare(last.cmp(&value)),
        }
    }
}

fn compare(ord: std::cmp::Ordering) -> u32 {
    match ord {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Equal => 1,
        std::cmp::Ordering::Greater => 2,
    }
}

/// One step of a deterministic group's adjust chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjust {
    pub op: AdjustOp,
    pub variable: u8,
    pub parameter: u32,
    pub shift: u8,
    pub and_mask: u32,
}

impl Adjust {
    /// Read `variable`, shift right and mask, then combine with `op`.
    pub fn new(op: AdjustOp, variable: u8) -> Self {
        Self {
            op,
            variable,
            parameter: 0,
            shift: 0,
            and_mask: u32::MAX,
        }
    }

    pub fn with_parameter(mut self, parameter: u32) -> Self {
        self.parameter = parameter;
        self
    }

    pub fn with_shift_mask(mut self, shift: u8, and_mask: u32) -> Self {
        self.shift = shift;
        self.and_mask = and_mask;
        self
    }
}

/// An inclusive value range selecting a child group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRange {
    pub low: u32,
    pub high: u32,
    pub group: Option<Arc<SpriteGroup>>,
}

/// Branches on the result of an adjust chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicGroup {
    pub scope: VarScope,
    pub adjusts: Vec<Adjust>,
    pub ranges: Vec<GroupRange>,
    pub default: Option<Arc<SpriteGroup>>,
}

/// How a randomized group matches its trigger set against waiting triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriggerMatch {
    /// Fire if any of the group's triggers is waiting.
    #[default]
    Any,
    /// Fire only if all of the group's triggers are waiting.
    All,
}

/// Branches on random bits of its scope.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomizedGroup {
    pub scope: VarScope,
    pub triggers: u8,
    pub cmp_mode: TriggerMatch,
    pub lowest_randbit: u8,
    /// Power-of-two number of children.
    pub groups: Vec<Option<Arc<SpriteGroup>>>,
}

impl RandomizedGroup {
    /// Mask of the random bits this group consumes.
    pub fn random_mask(&self) -> u32 {
        let count = self.groups.len().max(1) as u32;
        (count - 1).checked_shl(self.lowest_randbit as u32).unwrap_or(0)
    }
}

/// Sprite sets to pick from depending on cargo waiting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RealGroup {
    pub loaded: Vec<Arc<SpriteGroup>>,
    pub loading: Vec<Arc<SpriteGroup>>,
}

/// A node of a sprite-group tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteGroup {
    Real(RealGroup),
    Deterministic(DeterministicGroup),
    Randomized(RandomizedGroup),
    /// A 15-bit callback result.
    CallbackResult(u16),
    /// A block of `num_sprites` consecutive sprites starting at `sprite`.
    Result { sprite: u32, num_sprites: u16 },
}

impl SpriteGroup {
    pub fn callback(result: u16) -> Arc<SpriteGroup> {
        Arc::new(SpriteGroup::CallbackResult(result & 0x7FFF))
    }

    pub fn sprites(sprite: u32, num_sprites: u16) -> Arc<SpriteGroup> {
        Arc::new(SpriteGroup::Result {
            sprite,
            num_sprites,
        })
    }
}
