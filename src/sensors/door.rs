//! Logical door state and its mapping from the raw input level.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Debounced logical state of the door contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    /// Interpret a raw GPIO level.  `open_level` is the level the contact
    /// reads while the door is open (HIGH for a reed switch to ground with
    /// the internal pull-up enabled).
    pub const fn from_level(level: bool, open_level: bool) -> Self {
        if level == open_level {
            Self::Open
        } else {
            Self::Closed
        }
    }

    /// Wire label: `"OPEN"` / `"CLOSED"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Numeric wire value: 1 = open, 0 = closed.
    pub const fn as_flag(self) -> u8 {
        match self {
            Self::Open => 1,
            Self::Closed => 0,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
