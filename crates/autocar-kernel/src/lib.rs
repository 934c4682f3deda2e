//! `autocar-kernel` – decision rules
//!
//! Pure rules the control loop consults every tick.  Nothing here touches
//! hardware or the network; time is passed in by the caller.
//!
//! # Modules
//!
//! - [`mode_arbiter`] – [`ModeArbiter`][mode_arbiter::ModeArbiter]:
//!   owns the manual/autonomous flag and debounces the joystick switch so a
//!   held or bouncing button cannot toggle faster than the debounce interval.
//! - [`drive_translator`] – [`DriveTranslator`][drive_translator::DriveTranslator]:
//!   maps raw joystick axes to one discrete
//!   [`DriveCommand`][autocar_types::DriveCommand] through a deadzone and a
//!   fixed direction priority.

pub mod drive_translator;
pub mod mode_arbiter;

pub use drive_translator::DriveTranslator;
pub use mode_arbiter::ModeArbiter;
