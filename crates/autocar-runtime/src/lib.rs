//! `autocar-runtime` – the control loop and everything it drives.
//!
//! # Modules
//!
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]:
//!   the single cooperative scheduler.  Polls the joystick link, arbitrates
//!   the mode, and either follows the joystick or drives autonomously,
//!   running sweep and maneuver to completion when an obstacle appears.
//!   Guarantees stop/disable teardown on every exit path.
//! - [`maneuver`] – [`ManeuverExecutor`][maneuver::ManeuverExecutor]:
//!   the timed stop/reverse/turn sequence toward the clearest heading.
//! - [`shutdown`] – [`ShutdownSignal`][shutdown::ShutdownSignal]:
//!   a one-shot stop request that an interrupt handler thread can trigger.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   installs the global `tracing` subscriber, with optional OTLP span
//!   export when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

pub mod control_loop;
pub mod maneuver;
pub mod shutdown;
pub mod telemetry;

pub use control_loop::{ControlLoop, LoopExit, TickOutcome};
pub use maneuver::{ManeuverExecutor, TurnDecision};
pub use shutdown::ShutdownSignal;
pub use telemetry::{TracerProviderGuard, init_tracing};
