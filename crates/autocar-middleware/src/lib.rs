//! `autocar-middleware` – the joystick link.
//!
//! Carries joystick samples from the remote relay into the controller
//! without caring what they mean.
//!
//! # Modules
//!
//! - [`wire`] – parser for the line-oriented `KEY:VALUE|KEY:VALUE` record
//!   format and the framer that reassembles records split across reads.
//! - [`link`] – single-session TCP listener and the
//!   [`JoystickLink`][link::JoystickLink] that polls it with a bounded wait.

pub mod link;
pub mod wire;

pub use link::{DEFAULT_PORT, JoystickLink, JoystickListener, LinkEvent, LinkStats};
pub use wire::{RecordFramer, WireError, parse_record};
