use core::sync::atomic::{AtomicU8, Ordering};

use crate::traits::nfc::Event;

bitflags::bitflags! {
    /// Pending notification bits, one per `Event` kind.
    pub struct Flags: u8 {
        const FIELD_ON = 1 << 0;
        const FIELD_OFF = 1 << 1;
        const MESSAGE_WRITTEN = 1 << 2;
        const MESSAGE_READ = 1 << 3;
        const TICK = 1 << 4;
    }
}

/// Event mailbox between interrupt handlers and the communication loop.
///
/// Interrupt context only ever `post`s, the loop only ever `take`s; both
/// sides go through one atomic word, so no read-modify-write race exists
/// between the two execution contexts.
pub struct EventFlags {
    pending: AtomicU8,
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Mark an event pending. Safe to call from interrupt context.
    pub fn post(&self, flags: Flags) {
        self.pending.fetch_or(flags.bits(), Ordering::SeqCst);
    }

    /// Drain the highest-priority pending event, if any.
    ///
    /// Field transitions outrank access notifications, which outrank timer
    /// ticks, mirroring the hardware interrupt priorities.
    pub fn take(&self) -> Option<Event> {
        for &(flag, event) in &[
            (Flags::FIELD_ON, Event::FieldOn),
            (Flags::FIELD_OFF, Event::FieldOff),
            (Flags::MESSAGE_WRITTEN, Event::MessageWritten),
            (Flags::MESSAGE_READ, Event::MessageRead),
            (Flags::TICK, Event::Tick),
        ] {
            let previous = self.pending.fetch_and(!flag.bits(), Ordering::SeqCst);
            if previous & flag.bits() != 0 {
                return Some(event);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}
