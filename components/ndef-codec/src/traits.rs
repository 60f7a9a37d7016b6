
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// No NDEF message TLV where one was expected.
    NotNdef,
    /// A declared length reaches past the end of the raw data.
    Truncated,
    /// The message parsed, but carried no record we transport commands in.
    NoPayloadRecord,
    /// The record payload does not fit the output buffer.
    Overflow,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// Envelope plus payload do not fit the raw buffer.
    Overflow,
}

/// Wraps raw payloads into NDEF messages for the shared tag memory, and
/// unwraps received messages back into raw payloads.
///
/// The engine treats the wire format as opaque; everything it knows about
/// message contents starts after `decode` and ends before `encode`.
pub trait Transcoder {
    /// Envelope `payload` into `raw`, returning the number of bytes written.
    fn encode(&mut self, payload: &[u8], raw: &mut [u8]) -> Result<usize, EncodeError>;

    /// Extract the command payload from a raw tag image into `payload`,
    /// returning its length.
    fn decode(&mut self, raw: &[u8], payload: &mut [u8]) -> Result<usize, DecodeError>;
}
