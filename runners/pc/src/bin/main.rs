//! Desktop simulation of a full host conversation: a scripted reader
//! approaches the tag, reads the bootstrap message, exchanges a few
//! commands and walks away.

use msg_dispatch::{builtin, id, HandlerTable};
use ndef_codec::{T2tCodec, Transcoder};
use nfc_device::ram::{HostOp, Message, RamDevice};
use tag_session::{Config, NoKeys, Platform, Session};

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

delog!(Delogger, 32 * 1024, 32 * 1024, StdoutFlusher);

static STDOUT_FLUSHER: StdoutFlusher = StdoutFlusher {};

struct PcPlatform;

impl Platform for PcPlatform {
    fn device_id(&self) -> u32 {
        0x4E46_4331
    }

    fn uid(&self) -> [u8; 16] {
        let mut uid = [0u8; 16];
        for (i, byte) in uid.iter_mut().enumerate() {
            *byte = 0xA0 + i as u8;
        }
        uid
    }

    fn nfc_uid(&self) -> [u8; 8] {
        [0x04, 0x6E, 0x66, 0x63, 0x31, 0x00, 0x00, 0x01]
    }

    fn system_reset(&mut self) {
        println!("[pc] hardware reset requested");
    }

    fn prepare_debug(&mut self) {
        println!("[pc] debug hook armed");
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

fn dump_hex(data: &[u8]) {
    for byte in data {
        print!("{:02X} ", byte);
    }
    println!();
}

fn command(frame: &[u8]) -> HostOp {
    let mut raw = [0u8; 512];
    let len = T2tCodec::new()
        .encode(frame, &mut raw)
        .expect("command fits the window");
    HostOp::Write(Message::from_slice(&raw[..len]).expect("command fits a message"))
}

fn main() {
    Delogger::init_default(delog::LevelFilter::Debug, &STDOUT_FLUSHER).ok();

    let platform = PcPlatform;
    let mut device = RamDevice::new();

    // the scripted reader
    device.script(0, HostOp::FieldOn).expect("script fits");
    device.script(1, HostOp::Read).expect("script fits");
    device
        .script(1, command(&[id::GET_UID, 0x00]))
        .expect("script fits");
    device.script(1, HostOp::Read).expect("script fits");
    device
        .script(1, command(&[id::ECHO, 0x00, 0xCA, 0xFE]))
        .expect("script fits");
    device.script(1, HostOp::Read).expect("script fits");
    device
        .script(1, command(&[0x7F, 0x00]))
        .expect("script fits");
    device.script(1, HostOp::Read).expect("script fits");
    device.script(1, HostOp::FieldOff).expect("script fits");

    let mut version = builtin::GetVersion {
        device_id: platform.device_id(),
    };
    let mut uid = builtin::GetUid {
        uid: platform.uid(),
    };
    let mut nfc_uid = builtin::GetNfcUid {
        uid: platform.nfc_uid(),
    };
    let mut echo = builtin::Echo;
    let mut reset = builtin::Reset;

    let mut handlers = HandlerTable::<8>::new();
    handlers.register(&mut version).expect("unique id");
    handlers.register(&mut uid).expect("unique id");
    handlers.register(&mut nfc_uid).expect("unique id");
    handlers.register(&mut echo).expect("unique id");
    handlers.register(&mut reset).expect("unique id");

    let mut session = Session::new(device, T2tCodec::new(), platform, Config::default());
    session
        .initialize(&mut NoKeys, true)
        .expect("channel comes up");

    println!("[pc] session starts");
    let reason = session.run(&mut handlers);
    Delogger::flush();
    println!("[pc] session over: {:?}", reason);

    let mut codec = T2tCodec::new();
    for (n, read) in session.device().reads().iter().enumerate() {
        let mut payload = [0u8; 512];
        match codec.decode(read, &mut payload) {
            Ok(len) => {
                print!("[pc] host read {}: ", n);
                dump_hex(&payload[..len]);
            }
            Err(error) => println!("[pc] host read {}: undecodable ({:?})", n, error),
        }
    }
}
