use heapless::Vec;

use crate::command::{Command, Direction, HEADER_SIZE};
use crate::status::Status;
use crate::HandlerResult;

pub mod response {
    /// Upper bound for one framed response; leaves room for the NDEF
    /// envelope within the shared memory window.
    pub const SIZE: usize = 480;
    pub type Data = heapless::Vec<u8, SIZE>;
}

/// Side effect a handler may queue for after its response is flushed.
///
/// Effects never run while the response is still in flight; the session
/// executes them once the frame has been committed to the channel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    /// Hardware reset (the reset command acknowledges first).
    Reset,
    /// Arm the debug/manufacturing hook.
    PrepareDebug,
    /// End the communication session cleanly.
    EndSession,
}

/// Response accumulator handed to the one handler a dispatch invokes.
///
/// Handlers add zero or more fragments; they are concatenated in the order
/// added. Returning without adding anything makes a no-response command.
pub struct Reply<'a> {
    data: &'a mut response::Data,
    effect: &'a mut Option<Effect>,
}

impl<'a> Reply<'a> {
    pub fn add(&mut self, fragment: &[u8]) -> core::result::Result<(), Status> {
        self.data
            .extend_from_slice(fragment)
            .map_err(|_| Status::InvalidParameter)
    }

    pub fn request(&mut self, effect: Effect) {
        *self.effect = Some(effect);
    }
}

/// One message identifier's business logic.
pub trait Handler {
    /// The identifier this handler owns; unique within a table.
    fn id(&self) -> u8;

    /// Process a command payload. `Ok` sends whatever was added to
    /// `reply`; `Err` discards it and sends a failure response instead.
    fn call(&mut self, payload: &[u8], reply: &mut Reply) -> HandlerResult;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// Two handlers claim the same identifier; the dispatch would be
    /// ambiguous.
    DuplicateHandler(u8),
    /// More handlers than the configured capacity.
    TableFull,
}

/// Fixed-capacity handler registry, filled once at startup.
///
/// Registration failures are build misconfigurations, not runtime
/// conditions; callers treat them as fatal.
pub struct HandlerTable<'a, const N: usize> {
    entries: Vec<&'a mut dyn Handler, N>,
}

impl<'a, const N: usize> HandlerTable<'a, N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: &'a mut dyn Handler) -> core::result::Result<(), Error> {
        let id = handler.id();
        if self.entries.iter().any(|entry| entry.id() == id) {
            return Err(Error::DuplicateHandler(id));
        }
        self.entries.push(handler).map_err(|_| Error::TableFull)
    }

    // The table stays small, linear search is fine.
    fn find(&mut self, id: u8) -> Option<&mut &'a mut dyn Handler> {
        self.entries.iter_mut().find(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, const N: usize> Default for HandlerTable<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes command frames and runs the matching handler.
pub struct Dispatch {
    response: response::Data,
    effect: Option<Effect>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self {
            response: response::Data::new(),
            effect: None,
        }
    }

    /// Handle one inbound frame.
    ///
    /// Returns the framed response to expose to the host, or `None` when
    /// the cycle produces nothing: the frame was our own response read
    /// back, or the handler chose to reply with silence.
    ///
    /// Not reentrant: the returned slice lives in the single response
    /// buffer, and the next call overwrites it. One call plus response
    /// pickup is atomic as far as callers are concerned.
    pub fn handle<'a, const N: usize>(
        &mut self,
        raw: &[u8],
        handlers: &mut HandlerTable<'a, N>,
    ) -> Option<&[u8]> {
        self.effect = None;

        let command = match Command::parse(raw) {
            Ok(command) => command,
            Err((id, status)) => {
                info!("dropping unparseable frame");
                return Some(self.synthesize(id, status));
            }
        };

        if command.direction == Direction::Outgoing {
            debug!("own response read back, nothing to dispatch");
            return None;
        }

        self.response.clear();
        self.response.push(command.id).ok();
        self.response.push(Direction::Outgoing as u8).ok();

        let result = match handlers.find(command.id) {
            Some(handler) => {
                let mut reply = Reply {
                    data: &mut self.response,
                    effect: &mut self.effect,
                };
                handler.call(command.payload, &mut reply)
            }
            None => {
                info!("no handler for id {}", command.id);
                Err(Status::UnknownCommand)
            }
        };

        match result {
            Ok(()) if self.response.len() == HEADER_SIZE => None,
            Ok(()) => Some(&self.response),
            Err(status) => Some(self.synthesize(command.id, status)),
        }
    }

    /// Side effect queued by the handler of the last dispatched command.
    pub fn take_effect(&mut self) -> Option<Effect> {
        self.effect.take()
    }

    fn synthesize(&mut self, id: u8, status: Status) -> &[u8] {
        self.response.clear();
        self.response.push(id).ok();
        self.response.push(Direction::Outgoing as u8).ok();
        self.response.extend_from_slice(&status.to_le_bytes()).ok();
        &self.response
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new()
    }
}
