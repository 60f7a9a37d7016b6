#![no_std]

#[macro_use]
extern crate delog;
generate_macros!();

pub mod events;
pub mod ram;
pub mod traits;

pub use events::EventFlags;
pub use ram::RamDevice;
pub use traits::nfc;
