
/// Hardware services the engine needs but does not own.
///
/// Peripheral access stays behind this seam so the engine itself never
/// touches registers.
pub trait Platform {
    /// Device identification word from the read-only provisioning area.
    fn device_id(&self) -> u32;

    /// Unique device identifier, 16 bytes.
    fn uid(&self) -> [u8; 16];

    /// UID the NFC frontend presents during anticollision.
    fn nfc_uid(&self) -> [u8; 8];

    /// Trigger a system reset. On hardware this call does not return; test
    /// doubles record the request instead.
    fn system_reset(&mut self);

    /// Reconfigure pins for a debug probe and park for attachment.
    fn prepare_debug(&mut self);

    fn delay_ms(&mut self, ms: u32);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyError {
    Storage,
}

/// MAC/signing collaborator deciding over the device's cryptographic
/// identity. The engine only ever asks it to come up, reusing or
/// regenerating key material.
pub trait KeyStore {
    fn load(&mut self) -> Result<(), KeyError>;

    fn regenerate(&mut self) -> Result<(), KeyError>;
}

/// For devices provisioned without message authentication.
pub struct NoKeys;

impl KeyStore for NoKeys {
    fn load(&mut self) -> Result<(), KeyError> {
        Ok(())
    }

    fn regenerate(&mut self) -> Result<(), KeyError> {
        Ok(())
    }
}
