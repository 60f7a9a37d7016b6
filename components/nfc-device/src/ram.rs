use heapless::{Deque, Vec};

use crate::events::{EventFlags, Flags};
use crate::traits::nfc::{self, Device, Event};

/// Shared memory window of the simulated tag, sized like the real part.
pub const SHARED_MEM_SIZE: usize = 512;

pub type Message = Vec<u8, SHARED_MEM_SIZE>;

/// One host-side action in a scripted conversation.
pub enum HostOp {
    FieldOn,
    FieldOff,
    /// Deposit a raw tag image and signal the write-access interrupt.
    Write(Message),
    /// Read the exposed tag image (kept for later inspection) and signal
    /// the read-access interrupt.
    Read,
}

struct Step {
    idle_ticks: u32,
    op: HostOp,
}

/// RAM-backed stand-in for the NFC frontend, for desktop runners and tests.
///
/// The scripted host plays the RF side: each step runs after the given
/// number of idle timer ticks, mutates the shared memory and posts its
/// notification exactly like the real driver's interrupt handler would.
/// With no host action due, `wait` reports timer ticks so the caller's
/// timeout bookkeeping works unchanged.
pub struct RamDevice {
    mem: [u8; SHARED_MEM_SIZE],
    notifications: EventFlags,
    script: Deque<Step, 16>,
    reads: Vec<Message, 8>,
    idle: u32,
}

impl RamDevice {
    pub fn new() -> Self {
        Self {
            mem: [0u8; SHARED_MEM_SIZE],
            notifications: EventFlags::new(),
            script: Deque::new(),
            reads: Vec::new(),
            idle: 0,
        }
    }

    /// Append a host action, to run `idle_ticks` ticks after the previous one.
    pub fn script(&mut self, idle_ticks: u32, op: HostOp) -> Result<(), ()> {
        self.script
            .push_back(Step { idle_ticks, op })
            .map_err(|_| ())
    }

    /// Tag images captured by scripted `HostOp::Read` steps, oldest first.
    pub fn reads(&self) -> &[Message] {
        &self.reads
    }

    fn run_host_op(&mut self, op: HostOp) {
        match op {
            HostOp::FieldOn => self.notifications.post(Flags::FIELD_ON),
            HostOp::FieldOff => self.notifications.post(Flags::FIELD_OFF),
            HostOp::Write(message) => {
                debug!("host writes {} bytes", message.len());
                self.mem = [0u8; SHARED_MEM_SIZE];
                self.mem[..message.len()].copy_from_slice(&message);
                self.notifications.post(Flags::MESSAGE_WRITTEN);
            }
            HostOp::Read => {
                debug!("host reads the exposed message");
                if let Ok(snapshot) = Message::from_slice(&self.mem) {
                    self.reads.push(snapshot).ok();
                }
                self.notifications.post(Flags::MESSAGE_READ);
            }
        }
    }
}

impl Default for RamDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for RamDevice {
    fn init(&mut self) {
        self.mem = [0u8; SHARED_MEM_SIZE];
        self.idle = 0;
    }

    fn deinit(&mut self) {}

    fn wait(&mut self) -> Event {
        if let Some(event) = self.notifications.take() {
            return event;
        }

        let due = match self.script.front() {
            Some(step) => self.idle >= step.idle_ticks,
            None => false,
        };
        if due {
            self.idle = 0;
            if let Some(step) = self.script.pop_front() {
                self.run_host_op(step.op);
            }
            if let Some(event) = self.notifications.take() {
                return event;
            }
        }

        self.idle += 1;
        Event::Tick
    }

    fn read_raw(&mut self, offset: usize, buf: &mut [u8]) -> nfc::Result<()> {
        let end = offset + buf.len();
        if end > SHARED_MEM_SIZE {
            return Err(nfc::Error::Bounds);
        }
        buf.copy_from_slice(&self.mem[offset..end]);
        Ok(())
    }

    fn write_raw(&mut self, offset: usize, data: &[u8]) -> nfc::Result<()> {
        let end = offset + data.len();
        if end > SHARED_MEM_SIZE {
            return Err(nfc::Error::Bounds);
        }
        self.mem[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn shared_mem_size(&self) -> usize {
        SHARED_MEM_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_write_surfaces_after_idle_ticks() {
        let mut device = RamDevice::new();
        device.script(0, HostOp::FieldOn).unwrap();
        device
            .script(2, HostOp::Write(Message::from_slice(&[0xAA, 0xBB]).unwrap()))
            .unwrap();

        assert_eq!(device.wait(), Event::FieldOn);
        assert_eq!(device.wait(), Event::Tick);
        assert_eq!(device.wait(), Event::Tick);
        assert_eq!(device.wait(), Event::MessageWritten);

        let mut buf = [0u8; 2];
        device.read_raw(0, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB]);

        // script exhausted, only the timer keeps waking us
        assert_eq!(device.wait(), Event::Tick);
    }

    #[test]
    fn host_read_snapshots_exposed_memory() {
        let mut device = RamDevice::new();
        device.write_raw(0, &[1, 2, 3]).unwrap();
        device.script(0, HostOp::Read).unwrap();

        assert_eq!(device.wait(), Event::MessageRead);
        assert_eq!(device.reads().len(), 1);
        assert_eq!(&device.reads()[0][..3], &[1, 2, 3]);
    }

    #[test]
    fn out_of_window_access_is_rejected() {
        let mut device = RamDevice::new();
        let mut buf = [0u8; 16];
        assert_eq!(
            device.read_raw(SHARED_MEM_SIZE - 8, &mut buf),
            Err(nfc::Error::Bounds)
        );
        assert_eq!(
            device.write_raw(SHARED_MEM_SIZE, &[0]),
            Err(nfc::Error::Bounds)
        );
    }
}
