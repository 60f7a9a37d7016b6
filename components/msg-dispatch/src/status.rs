
/// Result codes travelling in failure responses, 32 bits little-endian on
/// the wire. The numeric values are fixed protocol constants; host tooling
/// matches on them.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Ok = 0,
    /// No handler owns this message identifier.
    UnknownCommand = 0x1_0007,
    /// Nothing queued for pickup.
    NoResponse = 0x1_000B,
    /// Parameters lacking or given in excess.
    InvalidCommandSize = 0x1_000D,
    /// At least one parameter had an invalid value.
    InvalidParameter = 0x1_000E,
    /// The command is valid, but not in the current device state.
    InvalidPrecondition = 0x1_000F,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        (self as u32).to_le_bytes()
    }
}
