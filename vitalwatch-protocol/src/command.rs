//! Operator commands
//!
//! Commands arrive one byte at a time on the console. Unknown bytes are
//! ignored.

/// Commands an operator can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Run a blood-pressure cycle now
    ForceBloodPressure,
}

impl Command {
    /// Decode a console byte; matching is case-insensitive
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_uppercase() {
            b'B' => Some(Command::ForceBloodPressure),
            _ => None,
        }
    }

    /// Canonical byte for this command
    pub fn to_byte(self) -> u8 {
        match self {
            Command::ForceBloodPressure => b'B',
        }
    }
}
