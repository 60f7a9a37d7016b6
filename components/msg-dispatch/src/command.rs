use core::convert::TryFrom;

use crate::status::Status;

/// Message identifiers of the built-in commands.
///
/// Identifiers up to `LAST_RESERVED` belong to the engine; applications
/// register theirs from `APP_FIRST` upwards.
pub mod id {
    pub const GET_VERSION: u8 = 0x02;
    pub const RESET: u8 = 0x03;
    pub const PREPARE_DEBUG: u8 = 0x08;
    pub const GET_UID: u8 = 0x09;
    pub const GET_NFC_UID: u8 = 0x0A;
    pub const ECHO: u8 = 0x10;

    pub const LAST_RESERVED: u8 = 0x3F;
    pub const APP_FIRST: u8 = 0x40;
}

/// Second header byte: who is talking.
///
/// Shared memory holds commands and responses in the same place, so every
/// frame marks its direction. Reading back a frame we wrote ourselves must
/// not dispatch anything.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Incoming = 0x00,
    Outgoing = 0x01,
}

impl TryFrom<u8> for Direction {
    type Error = ();

    fn try_from(byte: u8) -> core::result::Result<Self, ()> {
        match byte {
            0x00 => Ok(Direction::Incoming),
            0x01 => Ok(Direction::Outgoing),
            _ => Err(()),
        }
    }
}

/// Identifier byte plus directionality byte.
pub const HEADER_SIZE: usize = 2;

/// A decoded command frame, borrowed from the receive buffer. Consumed by
/// exactly one dispatch, never stored.
#[derive(Debug, PartialEq)]
pub struct Command<'a> {
    pub id: u8,
    pub direction: Direction,
    pub payload: &'a [u8],
}

impl<'a> Command<'a> {
    /// Split a raw frame into header and payload.
    ///
    /// The status in the error case is what the failure response should
    /// carry; a frame too short to even name its command reports id 0.
    pub fn parse(raw: &'a [u8]) -> core::result::Result<Self, (u8, Status)> {
        if raw.is_empty() {
            return Err((0, Status::InvalidCommandSize));
        }
        if raw.len() < HEADER_SIZE {
            return Err((raw[0], Status::InvalidCommandSize));
        }
        let direction =
            Direction::try_from(raw[1]).map_err(|_| (raw[0], Status::InvalidParameter))?;
        Ok(Command {
            id: raw[0],
            direction,
            payload: &raw[HEADER_SIZE..],
        })
    }
}
