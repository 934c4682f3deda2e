//! In-process simulated hardware for headless runs and tests.
//!
//! Every simulated driver records the commands it receives in a shared
//! [`CallLog`] that stays readable after the driver has been moved into a
//! [`Rig`], and every driver supports fault injection through
//! `failing_after(n)`: the first `n` calls succeed, every later call returns
//! [`AutocarError::HardwareFault`].
//!
//! # Example
//!
//! ```rust
//! use autocar_hal::sim::{DriveCall, SimRangeSensor, SimRig};
//! use autocar_types::DriveCommand;
//!
//! let (mut rig, probe) = SimRig::new()
//!     .with_range(SimRangeSensor::constant(120.0))
//!     .build();
//!
//! rig.engage().expect("sim engage must succeed");
//! rig.drive(DriveCommand::Forward(0.5)).expect("sim drive must succeed");
//! assert_eq!(
//!     probe.drive.last(),
//!     Some(DriveCall::Command(DriveCommand::Forward(0.5)))
//! );
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use autocar_types::{AutocarError, DriveCommand, Proximity};
use tracing::debug;

use crate::drive::DriveBase;
use crate::heading::{HEADING_CENTER_DEG, HeadingActuator};
use crate::proximity::ProximitySensor;
use crate::ranging::RangeSensor;
use crate::rig::Rig;

// ────────────────────────────────────────────────────────────────────────────
// Shared call log
// ────────────────────────────────────────────────────────────────────────────

/// Cloneable handle onto the list of calls a simulated driver received.
#[derive(Debug)]
pub struct CallLog<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> CallLog<T> {
    fn record(&self, call: T) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Copy of every call recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent call.
    pub fn last(&self) -> Option<T> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fault injection
// ────────────────────────────────────────────────────────────────────────────

/// Counts down successful calls; once exhausted every call faults.
#[derive(Debug, Default)]
struct FaultPlan {
    remaining: Option<usize>,
}

impl FaultPlan {
    fn after(successes: usize) -> Self {
        Self {
            remaining: Some(successes),
        }
    }

    fn check(&mut self, component: &str, operation: &str) -> Result<(), AutocarError> {
        match self.remaining.as_mut() {
            None => Ok(()),
            Some(0) => Err(AutocarError::hardware(
                component,
                format!("injected fault during {operation}"),
            )),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drive
// ────────────────────────────────────────────────────────────────────────────

/// One call received by a [`SimDrive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCall {
    Enable,
    Disable,
    Command(DriveCommand),
}

/// A simulated drive base.  Records every call, including calls that fail.
pub struct SimDrive {
    id: String,
    log: CallLog<DriveCall>,
    motion_fault: FaultPlan,
    fail_stop: bool,
}

impl SimDrive {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            log: CallLog::default(),
            motion_fault: FaultPlan::default(),
            fail_stop: false,
        }
    }

    /// Let `successes` motion commands through, then fault on every
    /// forward/backward/left/right.  Stop, enable and disable keep working.
    pub fn failing_after(mut self, successes: usize) -> Self {
        self.motion_fault = FaultPlan::after(successes);
        self
    }

    /// Make every Stop fault.
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn log(&self) -> CallLog<DriveCall> {
        self.log.clone()
    }

    fn motion(&mut self, command: DriveCommand) -> Result<(), AutocarError> {
        debug!(drive = %self.id, command = command.label(), speed = command.speed(), "sim drive");
        self.log.record(DriveCall::Command(command));
        self.motion_fault.check(&self.id, command.label())
    }
}

impl DriveBase for SimDrive {
    fn id(&self) -> &str {
        &self.id
    }

    fn forward(&mut self, speed: f32) -> Result<(), AutocarError> {
        self.motion(DriveCommand::Forward(speed))
    }

    fn backward(&mut self, speed: f32) -> Result<(), AutocarError> {
        self.motion(DriveCommand::Backward(speed))
    }

    fn left(&mut self, speed: f32) -> Result<(), AutocarError> {
        self.motion(DriveCommand::Left(speed))
    }

    fn right(&mut self, speed: f32) -> Result<(), AutocarError> {
        self.motion(DriveCommand::Right(speed))
    }

    fn stop(&mut self) -> Result<(), AutocarError> {
        debug!(drive = %self.id, command = "stop", "sim drive");
        self.log.record(DriveCall::Command(DriveCommand::Stop));
        if self.fail_stop {
            return Err(AutocarError::hardware(&self.id, "injected fault during stop"));
        }
        Ok(())
    }

    fn enable(&mut self) -> Result<(), AutocarError> {
        self.log.record(DriveCall::Enable);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), AutocarError> {
        self.log.record(DriveCall::Disable);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heading
// ────────────────────────────────────────────────────────────────────────────

/// A simulated servo mount that records every commanded angle.
pub struct SimHeading {
    id: String,
    angle: u8,
    log: CallLog<u8>,
    fault: FaultPlan,
}

impl SimHeading {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            angle: HEADING_CENTER_DEG,
            log: CallLog::default(),
            fault: FaultPlan::default(),
        }
    }

    pub fn failing_after(mut self, successes: usize) -> Self {
        self.fault = FaultPlan::after(successes);
        self
    }

    pub fn log(&self) -> CallLog<u8> {
        self.log.clone()
    }
}

impl HeadingActuator for SimHeading {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_angle_deg(&mut self, angle_deg: u8) -> Result<(), AutocarError> {
        self.fault.check(&self.id, "set_angle_deg")?;
        self.angle = angle_deg;
        self.log.record(angle_deg);
        Ok(())
    }

    fn angle_deg(&self) -> u8 {
        self.angle
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rangefinder
// ────────────────────────────────────────────────────────────────────────────

enum RangeSource {
    Constant(f32),
    Script { pending: VecDeque<f32>, last: f32 },
    ByHeading {
        heading: CallLog<u8>,
        profile: Box<dyn Fn(u8) -> f32 + Send>,
    },
}

/// A simulated rangefinder.
pub struct SimRangeSensor {
    id: String,
    source: RangeSource,
    fault: FaultPlan,
}

impl SimRangeSensor {
    fn with_source(source: RangeSource) -> Self {
        Self {
            id: "sim_ultrasonic".to_string(),
            source,
            fault: FaultPlan::default(),
        }
    }

    /// Always reads `distance_cm`.
    pub fn constant(distance_cm: f32) -> Self {
        Self::with_source(RangeSource::Constant(distance_cm))
    }

    /// Reads the given values in order, then repeats the final one.  An
    /// empty script reads `0.0`.
    pub fn scripted(readings: impl IntoIterator<Item = f32>) -> Self {
        Self::with_source(RangeSource::Script {
            pending: readings.into_iter().collect(),
            last: 0.0,
        })
    }

    /// Reads `profile(angle)` where `angle` is the heading most recently
    /// recorded in `heading` (straight ahead if none).
    pub fn by_heading(
        heading: CallLog<u8>,
        profile: impl Fn(u8) -> f32 + Send + 'static,
    ) -> Self {
        Self::with_source(RangeSource::ByHeading {
            heading,
            profile: Box::new(profile),
        })
    }

    pub fn failing_after(mut self, successes: usize) -> Self {
        self.fault = FaultPlan::after(successes);
        self
    }
}

impl RangeSensor for SimRangeSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_distance_cm(&mut self) -> Result<f32, AutocarError> {
        self.fault.check(&self.id, "read_distance_cm")?;
        Ok(match &mut self.source {
            RangeSource::Constant(d) => *d,
            RangeSource::Script { pending, last } => {
                if let Some(next) = pending.pop_front() {
                    *last = next;
                }
                *last
            }
            RangeSource::ByHeading { heading, profile } => {
                (**profile)(heading.last().unwrap_or(HEADING_CENTER_DEG))
            }
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Proximity
// ────────────────────────────────────────────────────────────────────────────

/// A simulated binary proximity sensor.
pub struct SimProximity {
    id: String,
    pending: VecDeque<Proximity>,
    last: Proximity,
    fault: FaultPlan,
}

impl SimProximity {
    pub fn constant(reading: Proximity) -> Self {
        Self::scripted([reading])
    }

    /// Reads the given values in order, then repeats the final one.  An
    /// empty script reads [`Proximity::Clear`].
    pub fn scripted(readings: impl IntoIterator<Item = Proximity>) -> Self {
        Self {
            id: "sim_ir".to_string(),
            pending: readings.into_iter().collect(),
            last: Proximity::Clear,
            fault: FaultPlan::default(),
        }
    }

    pub fn failing_after(mut self, successes: usize) -> Self {
        self.fault = FaultPlan::after(successes);
        self
    }
}

impl ProximitySensor for SimProximity {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&mut self) -> Result<Proximity, AutocarError> {
        self.fault.check(&self.id, "read")?;
        if let Some(next) = self.pending.pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// Handles onto the call logs of a simulated rig.
#[derive(Clone)]
pub struct SimProbe {
    pub drive: CallLog<DriveCall>,
    pub heading: CallLog<u8>,
}

/// Builder for a [`Rig`] made entirely of simulated drivers.
///
/// Devices that are not supplied default to: a healthy drive, a healthy
/// servo, a rangefinder reading 200 cm, and two clear proximity sensors.
#[derive(Default)]
pub struct SimRig {
    drive: Option<SimDrive>,
    heading: Option<SimHeading>,
    range: Option<SimRangeSensor>,
    left: Option<SimProximity>,
    right: Option<SimProximity>,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drive(mut self, drive: SimDrive) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_heading(mut self, heading: SimHeading) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_range(mut self, range: SimRangeSensor) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_left(mut self, sensor: SimProximity) -> Self {
        self.left = Some(sensor);
        self
    }

    pub fn with_right(mut self, sensor: SimProximity) -> Self {
        self.right = Some(sensor);
        self
    }

    /// Consume the builder and return the rig plus probes onto its logs.
    pub fn build(self) -> (Rig, SimProbe) {
        let drive = self.drive.unwrap_or_else(|| SimDrive::new("sim_drive"));
        let heading = self.heading.unwrap_or_else(|| SimHeading::new("sim_servo"));
        let probe = SimProbe {
            drive: drive.log(),
            heading: heading.log(),
        };
        let rig = Rig::from_parts(
            Box::new(drive),
            Box::new(heading),
            Box::new(self.range.unwrap_or_else(|| SimRangeSensor::constant(200.0))),
            Box::new(
                self.left
                    .unwrap_or_else(|| SimProximity::constant(Proximity::Clear)),
            ),
            Box::new(
                self.right
                    .unwrap_or_else(|| SimProximity::constant(Proximity::Clear)),
            ),
        );
        (rig, probe)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_drive_records_calls_in_order() {
        let mut drive = SimDrive::new("d");
        let log = drive.log();
        drive.enable().unwrap();
        drive.apply(DriveCommand::Left(0.5)).unwrap();
        drive.stop().unwrap();
        assert_eq!(
            log.snapshot(),
            vec![
                DriveCall::Enable,
                DriveCall::Command(DriveCommand::Left(0.5)),
                DriveCall::Command(DriveCommand::Stop),
            ]
        );
    }

    #[test]
    fn sim_drive_motion_fault_spares_stop() {
        let mut drive = SimDrive::new("d").failing_after(1);
        assert!(drive.forward(0.5).is_ok());
        assert!(drive.forward(0.5).is_err());
        assert!(drive.stop().is_ok());
        assert!(drive.disable().is_ok());
        // The failed call is still recorded.
        assert_eq!(drive.log().len(), 4);
    }

    #[test]
    fn sim_heading_faults_after_budget() {
        let mut servo = SimHeading::new("s").failing_after(2);
        servo.set_angle_deg(10).unwrap();
        servo.set_angle_deg(20).unwrap();
        let err = servo.set_angle_deg(30).unwrap_err();
        assert!(err.to_string().contains("injected fault"));
        assert_eq!(servo.angle_deg(), 20);
        assert_eq!(servo.log().snapshot(), vec![10, 20]);
    }

    #[test]
    fn scripted_range_repeats_last_value() {
        let mut range = SimRangeSensor::scripted([10.0, 20.0]);
        assert_eq!(range.read_distance_cm().unwrap(), 10.0);
        assert_eq!(range.read_distance_cm().unwrap(), 20.0);
        assert_eq!(range.read_distance_cm().unwrap(), 20.0);
    }

    #[test]
    fn range_by_heading_follows_servo() {
        let mut servo = SimHeading::new("s");
        let mut range = SimRangeSensor::by_heading(servo.log(), |angle| f32::from(angle) * 2.0);
        assert_eq!(range.read_distance_cm().unwrap(), 180.0);
        servo.set_angle_deg(30).unwrap();
        assert_eq!(range.read_distance_cm().unwrap(), 60.0);
    }

    #[test]
    fn scripted_proximity_then_steady() {
        let mut ir = SimProximity::scripted([Proximity::Detected, Proximity::Clear]);
        assert_eq!(ir.read().unwrap(), Proximity::Detected);
        assert_eq!(ir.read().unwrap(), Proximity::Clear);
        assert_eq!(ir.read().unwrap(), Proximity::Clear);
    }

    #[test]
    fn call_log_clear_empties_shared_view() {
        let drive = SimDrive::new("d");
        let a = drive.log();
        let b = drive.log();
        a.record(DriveCall::Enable);
        assert_eq!(b.len(), 1);
        b.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn sim_rig_full_stack_no_hardware_required() {
        let (mut rig, probe) = SimRig::new().build();
        rig.engage().expect("engage must succeed");
        let snapshot = rig.read_sensors().expect("sensors must read");
        assert_eq!(snapshot.distance_cm, 200.0);
        rig.drive(DriveCommand::Right(0.3)).expect("drive must succeed");
        rig.shutdown().expect("shutdown must succeed");
        assert_eq!(probe.drive.last(), Some(DriveCall::Disable));
    }
}
