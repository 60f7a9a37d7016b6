use heapless::Vec;
use host_timeout::Supervisor;
use msg_dispatch::{builtin, id, Direction, Dispatch, Effect, HandlerTable};
use ndef_codec::Transcoder;
use nfc_device::nfc::{Device, Event};

use crate::platform::{KeyError, KeyStore, Platform};

/// Scratch size for raw tag images; matches the largest shared memory
/// window we support.
const RAW_SIZE: usize = 512;

/// Pause between acknowledging a reset command and pulling the plug, so
/// the host can pick the acknowledgement up.
const RESET_SETTLE_MS: u32 = 500;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SessionState {
    Idle,
    FieldPresent,
    AwaitingCommand,
    Processing,
    AwaitingHostRead,
    Ended,
}

/// Why the blocking communication call returned. None of these are
/// errors; a vanished host is the normal end of an NFC conversation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EndReason {
    /// No host activity for longer than the configured threshold.
    HostTimeout,
    /// The reader left RF range and did not come back within the grace
    /// period.
    FieldLost,
    /// A handler requested termination (reset command and friends).
    Terminated,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    Key,
    Encode,
    Channel,
}

impl From<KeyError> for Error {
    fn from(_: KeyError) -> Self {
        Error::Key
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Config {
    /// Host-timeout timer rate, ticks per second.
    pub tick_hz: u32,
    /// Silence tolerated while a host is (presumed) present.
    pub host_timeout_s: u32,
    /// Readers bounce their field during selection; only give up on a
    /// lost field after this much silence.
    pub field_lost_grace_s: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_hz: 4,
            host_timeout_s: 20,
            field_lost_grace_s: 1,
        }
    }
}

/// One blocking command/response conversation with whoever holds a reader
/// against the tag.
///
/// The engine is not reentrant; exactly one session exists at a time. A
/// field-detected event during an active session restarts the exchange
/// (pending response dropped, bootstrap message re-published) without
/// returning control; this matches readers that bounce their field while
/// selecting.
pub struct Session<DEV: Device, T: Transcoder, P: Platform> {
    device: DEV,
    codec: T,
    platform: P,
    dispatch: Dispatch,
    supervisor: Supervisor,
    config: Config,
    state: SessionState,
    response_pending: bool,
    field_lost: bool,
    bootstrap: Vec<u8, 64>,
}

impl<DEV, T, P> Session<DEV, T, P>
where
    DEV: Device,
    T: Transcoder,
    P: Platform,
{
    pub fn new(device: DEV, codec: T, platform: P, config: Config) -> Self {
        let threshold = config.host_timeout_s * config.tick_hz;
        Self {
            device,
            codec,
            platform,
            dispatch: Dispatch::new(),
            supervisor: Supervisor::new(threshold),
            config,
            state: SessionState::Idle,
            response_pending: false,
            field_lost: false,
            bootstrap: Vec::new(),
        }
    }

    /// Bring the channel up and publish the bootstrap message, so the
    /// host's very first read succeeds without a prior write.
    ///
    /// `reuse_keys` decides whether the signing collaborator keeps its
    /// stored identity or mints a fresh one.
    pub fn initialize(&mut self, keys: &mut dyn KeyStore, reuse_keys: bool) -> Result<(), Error> {
        self.device.init();
        if reuse_keys {
            keys.load()?;
        } else {
            keys.regenerate()?;
        }

        self.bootstrap.clear();
        self.bootstrap.push(id::GET_VERSION).ok();
        self.bootstrap.push(Direction::Outgoing as u8).ok();
        self.bootstrap
            .extend_from_slice(&builtin::version_payload(self.platform.device_id()))
            .map_err(|_| Error::Encode)?;

        self.publish_bootstrap()
    }

    /// The blocking communication entry point.
    ///
    /// Loops over channel events until the session is over, then returns;
    /// the caller may immediately call it again for the next host. The
    /// device performs no other work while a reader is engaged, so not
    /// returning per message is deliberate.
    pub fn run<const N: usize>(&mut self, handlers: &mut HandlerTable<N>) -> EndReason {
        self.state = SessionState::Idle;
        self.field_lost = false;
        self.supervisor.rearm(self.host_timeout_ticks());

        loop {
            // Cancellation is cooperative: expiry is flagged under
            // interrupt and observed here.
            if self.supervisor.expired() {
                let reason = if self.field_lost {
                    EndReason::FieldLost
                } else {
                    EndReason::HostTimeout
                };
                info!("host gone, ending session");
                self.response_pending = false;
                self.state = SessionState::Ended;
                return reason;
            }

            match self.device.wait() {
                Event::Tick => self.supervisor.tick(),
                Event::FieldOn => self.field_on(),
                Event::FieldOff => {
                    debug!("field lost, granting grace period");
                    self.field_lost = true;
                    self.supervisor.rearm(self.grace_ticks());
                }
                Event::MessageWritten => {
                    self.supervisor.rearm(self.host_timeout_ticks());
                    if self.state == SessionState::Idle {
                        debug!("write without a field session, ignoring");
                    } else if let Some(reason) = self.process_message(handlers) {
                        return reason;
                    }
                }
                Event::MessageRead => {
                    self.supervisor.rearm(self.host_timeout_ticks());
                    self.message_read();
                }
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a response is waiting for host pickup.
    pub fn response_pending(&self) -> bool {
        self.response_pending
    }

    pub fn device(&self) -> &DEV {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut DEV {
        &mut self.device
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn host_timeout_ticks(&self) -> u32 {
        self.config.host_timeout_s * self.config.tick_hz
    }

    fn grace_ticks(&self) -> u32 {
        self.config.field_lost_grace_s * self.config.tick_hz
    }

    fn field_on(&mut self) {
        match self.state {
            SessionState::Idle => info!("field detected"),
            _ => info!("field re-detected, restarting the exchange"),
        };
        self.field_lost = false;
        self.supervisor.rearm(self.host_timeout_ticks());
        self.state = SessionState::FieldPresent;
        self.response_pending = false;
        if self.publish_bootstrap().is_err() {
            warn!("could not publish the bootstrap message");
        }
        self.state = SessionState::AwaitingCommand;
    }

    fn message_read(&mut self) {
        if self.state == SessionState::AwaitingHostRead {
            debug!("response picked up");
            self.response_pending = false;
            self.state = SessionState::AwaitingCommand;
        }
        // Reads in other states are the host polling the bootstrap
        // message; they only count as activity.
    }

    fn process_message<const N: usize>(
        &mut self,
        handlers: &mut HandlerTable<N>,
    ) -> Option<EndReason> {
        self.state = SessionState::Processing;

        let window = self.window();
        let mut raw = [0u8; RAW_SIZE];
        if self.device.read_raw(0, &mut raw[..window]).is_err() {
            warn!("could not read shared memory");
            self.state = SessionState::AwaitingCommand;
            return None;
        }

        let mut command = [0u8; RAW_SIZE];
        let length = match self.codec.decode(&raw[..window], &mut command) {
            Ok(length) => length,
            Err(_) => {
                // Not necessarily hostile, the host may have deposited an
                // unrelated NDEF note. No response this cycle; the host
                // retries or we time out.
                info!("undecodable message, skipping this cycle");
                self.state = SessionState::AwaitingCommand;
                return None;
            }
        };

        let mut outgoing = [0u8; RAW_SIZE];
        let mut committed = false;
        if let Some(frame) = self.dispatch.handle(&command[..length], handlers) {
            match self.codec.encode(frame, &mut outgoing[..window]) {
                Ok(written) => match self.device.write_raw(0, &outgoing[..written]) {
                    Ok(()) => committed = true,
                    Err(_) => {
                        warn!("could not expose the response");
                    }
                },
                Err(_) => {
                    warn!("response does not fit the shared memory window");
                }
            };
        }

        if committed {
            self.response_pending = true;
            self.state = SessionState::AwaitingHostRead;
        } else {
            self.state = SessionState::AwaitingCommand;
        }

        // Post-flush side effects; never while the response is in flight.
        match self.dispatch.take_effect() {
            Some(Effect::Reset) => {
                self.platform.delay_ms(RESET_SETTLE_MS);
                self.platform.system_reset();
                self.state = SessionState::Ended;
                Some(EndReason::Terminated)
            }
            Some(Effect::PrepareDebug) => {
                self.platform.prepare_debug();
                None
            }
            Some(Effect::EndSession) => {
                self.state = SessionState::Ended;
                Some(EndReason::Terminated)
            }
            None => None,
        }
    }

    fn publish_bootstrap(&mut self) -> Result<(), Error> {
        let window = self.window();
        let mut outgoing = [0u8; RAW_SIZE];
        let written = self
            .codec
            .encode(&self.bootstrap, &mut outgoing[..window])
            .map_err(|_| Error::Encode)?;
        self.device
            .write_raw(0, &outgoing[..written])
            .map_err(|_| Error::Channel)?;
        Ok(())
    }

    fn window(&self) -> usize {
        let size = self.device.shared_mem_size();
        if size < RAW_SIZE {
            size
        } else {
            RAW_SIZE
        }
    }
}
