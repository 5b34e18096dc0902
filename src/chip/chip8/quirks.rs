use serde::{Deserialize, Serialize};

/// Behavioral variations between historical CHIP-8 interpreters that
/// programs may depend on. The defaults match the interpreters most
/// current programs are written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quirks {
    /// Source operand of `8xy6` and `8xyE`.
    pub shift: ShiftQuirk,

    /// When `Fx0A` considers a key as entered.
    pub key_wait: KeyWaitQuirk,

    /// Whether `Fx55` and `Fx65` advance `I` past the last accessed byte.
    pub load_store_increments_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            shift: ShiftQuirk::VxOnly,
            key_wait: KeyWaitQuirk::Held,
            load_store_increments_index: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftQuirk {
    /// Shift `Vx` in place, `Vy` is ignored.
    VxOnly,
    /// Shift `Vy` and store the result in `Vx` (COSMAC VIP).
    CopyVy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyWaitQuirk {
    /// Complete as soon as any key is held down.
    Held,
    /// Complete once a key that was held while waiting is released.
    Release,
}

impl ShiftQuirk {
    pub(crate) fn to_tag(self) -> u8 {
        match self {
            ShiftQuirk::VxOnly => 0,
            ShiftQuirk::CopyVy => 1,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ShiftQuirk::VxOnly),
            1 => Some(ShiftQuirk::CopyVy),
            _ => None,
        }
    }
}

impl KeyWaitQuirk {
    pub(crate) fn to_tag(self) -> u8 {
        match self {
            KeyWaitQuirk::Held => 0,
            KeyWaitQuirk::Release => 1,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(KeyWaitQuirk::Held),
            1 => Some(KeyWaitQuirk::Release),
            _ => None,
        }
    }
}
