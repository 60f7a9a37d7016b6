#![no_std]

//! The session state machine tying channel, transcoder and dispatcher into
//! one blocking communication loop per host interaction.

#[macro_use]
extern crate delog;
generate_macros!();

pub mod platform;
pub mod session;

pub use platform::{KeyError, KeyStore, NoKeys, Platform};
pub use session::{Config, EndReason, Error, Session, SessionState};
