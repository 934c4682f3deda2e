//! `autocar-hal` – Hardware Abstraction Layer
//!
//! The controller never talks to GPIO pins directly.  It talks to the
//! capability traits defined here, and concrete drivers (or the simulated
//! ones in [`sim`]) implement them.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveBase`][drive::DriveBase]: differential drive with
//!   discrete forward/backward/left/right/stop commands and a drive-enable
//!   gate.
//! - [`heading`] – [`HeadingActuator`][heading::HeadingActuator]: the servo
//!   mount that points the rangefinder, commanded in degrees.
//! - [`ranging`] – [`RangeSensor`][ranging::RangeSensor]: ultrasonic
//!   rangefinder returning centimetres.
//! - [`proximity`] – [`ProximitySensor`][proximity::ProximitySensor]:
//!   active-low binary obstacle sensors.
//! - [`rig`] – [`Rig`][rig::Rig]: owns one of each device, routes drive
//!   commands, and guarantees the stop/disable teardown.
//! - [`sim`] – recording, fault-injecting stand-ins for every device.

pub mod drive;
pub mod heading;
pub mod proximity;
pub mod ranging;
pub mod rig;
pub mod sim;

pub use drive::DriveBase;
pub use heading::HeadingActuator;
pub use proximity::ProximitySensor;
pub use ranging::RangeSensor;
pub use rig::{Rig, RigBuilder};
