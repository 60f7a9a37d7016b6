use msg_dispatch::{builtin, id, HandlerTable};
use ndef_codec::{T2tCodec, Transcoder};
use nfc_device::ram::{HostOp, Message, RamDevice};
use tag_session::{Config, EndReason, NoKeys, Platform, Session, SessionState};

#[macro_use]
extern crate serial_test;

#[macro_use]
extern crate delog;
generate_macros!();

#[derive(Debug)]
pub struct StdoutFlusher {}
impl delog::Flusher for StdoutFlusher {
    fn flush(&self, logs: &str) {
        print!("{}", logs);
    }
}

delog!(Delogger, 4 * 1024, 4 * 1024, StdoutFlusher);

static STDOUT_FLUSHER: StdoutFlusher = StdoutFlusher {};

fn init_logs() {
    Delogger::init_default(delog::LevelFilter::Info, &STDOUT_FLUSHER).ok();
}

const DEVICE_ID: u32 = 0x00C0_FFEE;

struct MockPlatform {
    resets: usize,
    debug_prepared: bool,
}

impl MockPlatform {
    fn new() -> Self {
        Self {
            resets: 0,
            debug_prepared: false,
        }
    }
}

impl Platform for MockPlatform {
    fn device_id(&self) -> u32 {
        DEVICE_ID
    }

    fn uid(&self) -> [u8; 16] {
        [0x11; 16]
    }

    fn nfc_uid(&self) -> [u8; 8] {
        [0x22; 8]
    }

    fn system_reset(&mut self) {
        self.resets += 1;
    }

    fn prepare_debug(&mut self) {
        self.debug_prepared = true;
    }

    fn delay_ms(&mut self, _ms: u32) {}
}

fn test_config() -> Config {
    Config {
        tick_hz: 1,
        host_timeout_s: 5,
        field_lost_grace_s: 1,
    }
}

/// Envelope a command frame the way a host application would.
fn wrap(frame: &[u8]) -> Message {
    let mut raw = [0u8; 512];
    let len = T2tCodec::new().encode(frame, &mut raw).unwrap();
    Message::from_slice(&raw[..len]).unwrap()
}

/// Unwrap a tag image a scripted read captured.
fn unwrap(raw: &[u8]) -> Vec<u8> {
    let mut out = [0u8; 512];
    let len = T2tCodec::new().decode(raw, &mut out).unwrap();
    out[..len].to_vec()
}

fn make_session(device: RamDevice) -> Session<RamDevice, T2tCodec, MockPlatform> {
    let mut session = Session::new(device, T2tCodec::new(), MockPlatform::new(), test_config());
    session.initialize(&mut NoKeys, true).unwrap();
    session
}

fn expected_bootstrap() -> Vec<u8> {
    let mut frame = vec![id::GET_VERSION, 0x01];
    frame.extend_from_slice(&builtin::version_payload(DEVICE_ID));
    frame
}

#[test]
#[serial]
fn bootstrap_is_readable_before_any_write() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device.script(1, HostOp::Read).unwrap();
    device.script(1, HostOp::FieldOff).unwrap();

    let mut echo = builtin::Echo;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::FieldLost);
    assert_eq!(session.state(), SessionState::Ended);
    assert!(!session.response_pending());

    let reads = session.device().reads();
    assert_eq!(reads.len(), 1);
    assert_eq!(unwrap(&reads[0]), expected_bootstrap());
}

#[test]
#[serial]
fn echo_command_gets_its_payload_back() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device
        .script(1, HostOp::Write(wrap(&[id::ECHO, 0x00, 0xAB, 0xCD])))
        .unwrap();
    device.script(1, HostOp::Read).unwrap();
    device.script(1, HostOp::FieldOff).unwrap();

    let mut echo = builtin::Echo;
    let mut uid = builtin::GetUid { uid: [0x11; 16] };
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();
    handlers.register(&mut uid).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::FieldLost);
    assert!(!session.response_pending());

    let reads = session.device().reads();
    assert_eq!(reads.len(), 1);
    assert_eq!(unwrap(&reads[0]), vec![id::ECHO, 0x01, 0xAB, 0xCD]);
}

#[test]
#[serial]
fn unknown_command_is_answered_without_a_handler() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device.script(1, HostOp::Write(wrap(&[0x99, 0x00]))).unwrap();
    device.script(1, HostOp::Read).unwrap();
    device.script(1, HostOp::FieldOff).unwrap();

    let mut echo = builtin::Echo;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::FieldLost);
    let reads = session.device().reads();
    // UnknownCommand = 0x10007, little endian
    assert_eq!(unwrap(&reads[0]), vec![0x99, 0x01, 0x07, 0x00, 0x01, 0x00]);
}

#[test]
#[serial]
fn idle_session_ends_with_host_timeout() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    // the host never writes nor reads again

    let mut echo = builtin::Echo;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::HostTimeout);
    assert_eq!(session.state(), SessionState::Ended);
    assert!(!session.response_pending());
}

#[test]
#[serial]
fn new_field_mid_session_restarts_the_exchange() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device
        .script(1, HostOp::Write(wrap(&[id::ECHO, 0x00, 0x55])))
        .unwrap();
    // reader bounces its field instead of picking the response up
    device.script(1, HostOp::FieldOn).unwrap();
    device.script(1, HostOp::Read).unwrap();
    device.script(1, HostOp::FieldOff).unwrap();

    let mut echo = builtin::Echo;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::FieldLost);
    // the restart dropped the pending echo response and re-published the
    // bootstrap message
    assert!(!session.response_pending());
    let reads = session.device().reads();
    assert_eq!(unwrap(&reads[0]), expected_bootstrap());
}

#[test]
#[serial]
fn reset_command_flushes_then_terminates() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device.script(1, HostOp::Write(wrap(&[id::RESET, 0x00]))).unwrap();

    let mut reset = builtin::Reset;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut reset).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    assert_eq!(reason, EndReason::Terminated);
    assert_eq!(session.platform().resets, 1);

    // the acknowledgement was committed before the reset fired
    use nfc_device::nfc::Device;
    let mut exposed = [0u8; 512];
    session.device_mut().read_raw(0, &mut exposed).unwrap();
    assert_eq!(
        unwrap(&exposed),
        vec![id::RESET, 0x01, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
#[serial]
fn undecodable_message_is_skipped_without_response() {
    init_logs();
    let mut device = RamDevice::new();
    device.script(0, HostOp::FieldOn).unwrap();
    device
        .script(
            1,
            HostOp::Write(Message::from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap()),
        )
        .unwrap();

    let mut echo = builtin::Echo;
    let mut handlers = HandlerTable::<4>::new();
    handlers.register(&mut echo).unwrap();

    let mut session = make_session(device);
    let reason = session.run(&mut handlers);
    Delogger::flush();

    // the cycle produced nothing; the session lived on until the timeout
    assert_eq!(reason, EndReason::HostTimeout);
    assert!(!session.response_pending());

    use nfc_device::nfc::Device;
    let mut exposed = [0u8; 4];
    session.device_mut().read_raw(0, &mut exposed).unwrap();
    assert_eq!(exposed, [0xDE, 0xAD, 0xBE, 0xEF]);
}
