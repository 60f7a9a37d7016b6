#![no_std]

#[macro_use]
extern crate delog;
generate_macros!();

pub mod t2t;
pub mod traits;

pub use t2t::T2tCodec;
pub use traits::{DecodeError, EncodeError, Transcoder};
