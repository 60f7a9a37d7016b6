#![no_std]

//! Bounds how long the engine waits for host activity.
//!
//! The NFC link is host-polled and offers no disconnect notification; a
//! free-running hardware timer is the only way to notice that the reader
//! walked away. Each timer interrupt advances the elapsed counter, any
//! recognized host activity resets it, and once the counter passes the
//! armed threshold the session is over.

#[macro_use]
extern crate delog;
generate_macros!();

use core::sync::atomic::{AtomicU32, Ordering};

/// Elapsed-time oracle with reset-on-activity semantics.
///
/// `tick` runs in interrupt context while `refresh`/`rearm`/`expired` run in
/// the communication loop, hence the atomic counter; no protocol logic
/// lives here.
pub struct Supervisor {
    ticks: AtomicU32,
    threshold: AtomicU32,
}

impl Supervisor {
    pub const fn new(threshold: u32) -> Self {
        Self {
            ticks: AtomicU32::new(0),
            threshold: AtomicU32::new(threshold),
        }
    }

    /// One timer period elapsed. Interrupt-safe.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    /// Host activity seen, start counting from zero again.
    pub fn refresh(&self) {
        self.ticks.store(0, Ordering::SeqCst);
    }

    /// Restart the count against a new threshold.
    pub fn rearm(&self, threshold: u32) {
        self.threshold.store(threshold, Ordering::SeqCst);
        self.ticks.store(0, Ordering::SeqCst);
        debug!("rearmed, threshold {} ticks", threshold);
    }

    /// Whether the armed threshold has been exceeded.
    pub fn expired(&self) -> bool {
        self.ticks.load(Ordering::SeqCst) > self.threshold.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> u32 {
        self.ticks.load(Ordering::SeqCst)
    }
}
