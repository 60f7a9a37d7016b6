
pub mod nfc {

    /// Notification surfaced by a channel driver to the communication loop.
    ///
    /// The shared tag memory is host-polled; there is no disconnect
    /// notification at the physical layer, so `Tick` wake-ups from the
    /// host-timeout timer are delivered through the same funnel and the
    /// caller decides when a silent host means the session is over.
    #[derive(Copy, Clone, Debug, PartialEq)]
    pub enum Event {
        /// A reader entered RF range.
        FieldOn,
        /// The reader left RF range (or powered its field down).
        FieldOff,
        /// The host committed a complete message into shared memory.
        MessageWritten,
        /// The host finished reading the message we exposed.
        MessageRead,
        /// Woken without channel activity, one timer period elapsed.
        ///
        /// Drivers reporting `Tick` must not update the timeout supervisor
        /// themselves; the loop does, exactly once per tick.
        Tick,
    }

    #[derive(Copy, Clone, Debug, PartialEq)]
    pub enum Error {
        /// Access outside the shared memory window.
        Bounds,
        /// A simultaneous RF-side access corrupted the transfer.
        Collision,
    }

    pub type Result<T> = core::result::Result<T, Error>;

    /// Exclusive owner of the memory-mapped buffer shared with the RF side.
    ///
    /// All other components reach the buffer through `read_raw`/`write_raw`
    /// only. The peer can write the same memory at any moment; going through
    /// the driver keeps collision handling in one place.
    pub trait Device {
        fn init(&mut self);

        fn deinit(&mut self);

        /// Block (sleep the core) until the next field/access/timer event.
        fn wait(&mut self) -> Event;

        fn read_raw(&mut self, offset: usize, buf: &mut [u8]) -> Result<()>;

        fn write_raw(&mut self, offset: usize, data: &[u8]) -> Result<()>;

        /// Size of the shared memory window in bytes.
        fn shared_mem_size(&self) -> usize;
    }
}
