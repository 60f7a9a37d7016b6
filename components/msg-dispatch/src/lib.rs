#![no_std]

//! Command/response dispatch for the NDEF messaging engine.
//!
//! A command frame is a message identifier byte, a directionality byte and
//! an opaque payload. The dispatcher looks the identifier up in a
//! fixed-capacity handler table, runs the one matching handler, and frames
//! whatever response bytes the handler accumulated. Handlers never touch
//! the wire; everything below the frame level belongs to the NDEF
//! transcoder and the channel driver.

#[macro_use]
extern crate delog;
generate_macros!();

pub mod builtin;
pub mod command;
pub mod dispatch;
pub mod status;

pub use command::{id, Command, Direction, HEADER_SIZE};
pub use dispatch::{response, Dispatch, Effect, Error, Handler, HandlerTable, Reply};
pub use status::Status;

pub type HandlerResult = core::result::Result<(), Status>;
