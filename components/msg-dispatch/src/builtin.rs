//! Built-in command handlers.
//!
//! Each is an independent struct; enabling one means registering it in the
//! application's handler table. Handlers needing hardware facts (device
//! id, unique identifiers) capture them at construction, since the
//! provisioning area is read-only anyway.

use crate::command::id;
use crate::dispatch::{Effect, Handler, Reply};
use crate::status::Status;
use crate::HandlerResult;

pub const SW_MAJOR_VERSION: u8 = 1;
pub const SW_MINOR_VERSION: u8 = 2;
pub const API_MAJOR_VERSION: u8 = 4;
pub const API_MINOR_VERSION: u8 = 0;

/// Version/capability payload: reserved byte, device id (LE), software and
/// API versions. Also published as the protocol bootstrap message before
/// the host has written anything.
pub fn version_payload(device_id: u32) -> [u8; 9] {
    let mut payload = [0u8; 9];
    payload[1..5].copy_from_slice(&device_id.to_le_bytes());
    payload[5] = SW_MAJOR_VERSION;
    payload[6] = SW_MINOR_VERSION;
    payload[7] = API_MAJOR_VERSION;
    payload[8] = API_MINOR_VERSION;
    payload
}

pub struct GetVersion {
    pub device_id: u32,
}

impl Handler for GetVersion {
    fn id(&self) -> u8 {
        id::GET_VERSION
    }

    fn call(&mut self, _payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(&version_payload(self.device_id))?;
        Ok(())
    }
}

/// Unique device identifier from the read-only provisioning area.
pub struct GetUid {
    pub uid: [u8; 16],
}

impl Handler for GetUid {
    fn id(&self) -> u8 {
        id::GET_UID
    }

    fn call(&mut self, _payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(&self.uid)?;
        Ok(())
    }
}

/// The UID the NFC frontend presents during anticollision.
pub struct GetNfcUid {
    pub uid: [u8; 8],
}

impl Handler for GetNfcUid {
    fn id(&self) -> u8 {
        id::GET_NFC_UID
    }

    fn call(&mut self, _payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(&self.uid)?;
        Ok(())
    }
}

/// Echoes its payload, for link diagnostics.
pub struct Echo;

impl Handler for Echo {
    fn id(&self) -> u8 {
        id::ECHO
    }

    fn call(&mut self, payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(payload)?;
        Ok(())
    }
}

/// Acknowledges, then requests a hardware reset. The reset only fires once
/// the acknowledgement has been flushed to the channel.
pub struct Reset;

impl Handler for Reset {
    fn id(&self) -> u8 {
        id::RESET
    }

    fn call(&mut self, _payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(&Status::Ok.to_le_bytes())?;
        reply.request(Effect::Reset);
        Ok(())
    }
}

/// Arms the debug/manufacturing hook, effective after the current response
/// cycle completes.
pub struct PrepareDebug;

impl Handler for PrepareDebug {
    fn id(&self) -> u8 {
        id::PREPARE_DEBUG
    }

    fn call(&mut self, _payload: &[u8], reply: &mut Reply) -> HandlerResult {
        reply.add(&Status::Ok.to_le_bytes())?;
        reply.request(Effect::PrepareDebug);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_payload_layout() {
        let payload = version_payload(0x0102_0304);
        assert_eq!(payload[0], 0);
        assert_eq!(&payload[1..5], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(payload[5], SW_MAJOR_VERSION);
        assert_eq!(payload[8], API_MINOR_VERSION);
    }
}
