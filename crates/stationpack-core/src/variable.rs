/// Result of reading a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarValue {
    pub value: u32,
    pub available: bool,
}

impl VarValue {
    /// The variable is not defined in this context.
    pub const UNAVAILABLE: VarValue = VarValue {
        value: u32::MAX,
        available: false,
    };

    pub fn new(value: u32) -> Self {
        Self {
            value,
            available: true,
        }
    }
}

impl From<u32> for VarValue {
    fn from(value: u32) -> Self {
        VarValue::new(value)
    }
}

/// Variable ids every resolver answers before consulting a scope.
pub mod common {
    pub const CALLBACK: u8 = 0x0C;
    pub const PARAM1: u8 = 0x10;
    pub const PARAM2: u8 = 0x18;
    pub const ALL_ONES: u8 = 0x1A;
    pub const LAST_VALUE: u8 = 0x1C;
    pub const RANDOM_AND_TRIGGERS: u8 = 0x5F;
    pub const TEMP_REGISTER: u8 = 0x7D;
}
